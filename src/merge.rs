//! Joins the motion and position streams on exact timestamp equality.

use crate::dlog;
use crate::error::Result;
use crate::types::{MergedSample, MotionRow, MotionSample, PositionRow, PositionSample};
use crate::utils::{magnitude, parse_timestamp};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Merged samples keyed by instant. Iteration is chronological.
pub type MergedSamples = BTreeMap<NaiveDateTime, MergedSample>;

pub fn parse_motion_rows(rows: &[MotionRow]) -> Result<Vec<MotionSample>> {
    rows.iter()
        .map(|r| {
            Ok(MotionSample {
                t: parse_timestamp(&r.timestamp)?,
                x: r.x,
                y: r.y,
                z: r.z,
            })
        })
        .collect()
}

pub fn parse_position_rows(rows: &[PositionRow]) -> Result<Vec<PositionSample>> {
    rows.iter()
        .map(|r| {
            Ok(PositionSample {
                t: parse_timestamp(&r.timestamp)?,
                lat: r.latitude,
                lon: r.longitude,
            })
        })
        .collect()
}

/// Merge both streams into one entry per distinct timestamp.
///
/// Motion samples are applied first, then positions. A later sample for
/// an instant overwrites only the fields its own stream owns.
pub fn merge(motion: &[MotionSample], positions: &[PositionSample]) -> MergedSamples {
    let mut out = MergedSamples::new();

    for m in motion {
        apply_motion(&mut out, m);
    }
    for p in positions {
        apply_position(&mut out, p);
    }

    dlog!(
        "merged motion={} positions={} instants={}",
        motion.len(),
        positions.len(),
        out.len()
    );
    out
}

fn apply_motion(out: &mut MergedSamples, m: &MotionSample) {
    out.entry(m.t)
        .or_insert_with(|| MergedSample::empty(m.t))
        .magnitude = Some(magnitude(m.x, m.y, m.z));
}

fn apply_position(out: &mut MergedSamples, p: &PositionSample) {
    let entry = out.entry(p.t).or_insert_with(|| MergedSample::empty(p.t));
    entry.lat = Some(p.lat);
    entry.lon = Some(p.lon);
}
