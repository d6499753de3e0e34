//! Training Center XML document model and writer.
//!
//! The tree is `TcxData -> Activity -> Lap -> Track -> Trackpoint`. Each node
//! is built with explicit add/set calls, serialized once, then dropped.
//!
//! Accelerometer magnitude has no slot in the TCX schema, so it travels in
//! the trackpoint's altitude slot and is written as `AltitudeMeters`.

use crate::error::{ExportError, Result};
use crate::merge::MergedSamples;
use crate::types::MergedSample;
use crate::utils::{format_float, format_time};
use chrono::NaiveDateTime;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use uuid::Uuid;

pub const TCX_NS: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Source of activity identifiers.
pub trait IdProvider {
    fn next_id(&mut self) -> Uuid;
}

/// Random v4 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdProvider for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

impl<F: FnMut() -> Uuid> IdProvider for F {
    fn next_id(&mut self) -> Uuid {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trackpoint {
    pub time: NaiveDateTime,
    /// Written as `AltitudeMeters`; carries accelerometer magnitude.
    pub proxy_altitude: Option<f64>,
    pub position: Option<Position>,
}

impl Trackpoint {
    pub const fn new(time: NaiveDateTime) -> Self {
        Self {
            time,
            proxy_altitude: None,
            position: None,
        }
    }

    pub fn set_altitude(&mut self, value: f64) {
        self.proxy_altitude = Some(value);
    }

    pub fn set_position(&mut self, lat: f64, lon: f64) {
        self.position = Some(Position { lat, lon });
    }

    /// A position is only set when both coordinates are known.
    pub fn from_merged(s: &MergedSample) -> Self {
        let mut tp = Self::new(s.t);
        if let Some(m) = s.magnitude {
            tp.set_altitude(m);
        }
        if let (Some(lat), Some(lon)) = (s.lat, s.lon) {
            tp.set_position(lat, lon);
        }
        tp
    }

    fn write_xml<W: Write>(&self, w: &mut Writer<W>) -> Result<()> {
        open(w, "Trackpoint")?;
        text_element(w, "Time", &format_time(self.time))?;

        if let Some(alt) = self.proxy_altitude {
            text_element(w, "AltitudeMeters", &format_float(alt))?;
        }

        if let Some(p) = self.position {
            open(w, "Position")?;
            text_element(w, "LatitudeDegrees", &format_float(p.lat))?;
            text_element(w, "LongitudeDegrees", &format_float(p.lon))?;
            close(w, "Position")?;
        }

        close(w, "Trackpoint")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub trackpoints: Vec<Trackpoint>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_trackpoint(&mut self, tp: Trackpoint) {
        self.trackpoints.push(tp);
    }

    fn write_xml<W: Write>(&self, w: &mut Writer<W>) -> Result<()> {
        if self.trackpoints.is_empty() {
            return empty(w, "Track");
        }
        open(w, "Track")?;
        for tp in &self.trackpoints {
            tp.write_xml(w)?;
        }
        close(w, "Track")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lap {
    pub track: Track,
}

impl Lap {
    pub const fn new(track: Track) -> Self {
        Self { track }
    }

    fn write_xml<W: Write>(&self, w: &mut Writer<W>) -> Result<()> {
        open(w, "Lap")?;
        self.track.write_xml(w)?;
        close(w, "Lap")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: Uuid,
    pub laps: Vec<Lap>,
}

impl Activity {
    pub fn new(ids: &mut impl IdProvider) -> Self {
        Self {
            id: ids.next_id(),
            laps: Vec::new(),
        }
    }

    pub fn add_lap(&mut self, lap: Lap) {
        self.laps.push(lap);
    }

    fn write_xml<W: Write>(&self, w: &mut Writer<W>) -> Result<()> {
        open(w, "Activity")?;
        text_element(w, "Id", &self.id.to_string())?;
        for lap in &self.laps {
            lap.write_xml(w)?;
        }
        close(w, "Activity")
    }
}

/// Root of the document; the only thing that gets written out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TcxData {
    pub activities: Vec<Activity>,
}

impl TcxData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_activity(&mut self, activity: Activity) {
        self.activities.push(activity);
    }

    pub fn trackpoint_count(&self) -> usize {
        self.activities
            .iter()
            .flat_map(|a| &a.laps)
            .map(|l| l.track.trackpoints.len())
            .sum()
    }

    /// Serialize without an XML declaration. `pretty` indents by two spaces.
    pub fn write_to<W: Write>(&self, out: W, pretty: bool) -> Result<()> {
        let mut w = if pretty {
            Writer::new_with_indent(out, b' ', 2)
        } else {
            Writer::new(out)
        };

        let mut root = BytesStart::new("TrainingCenterDatabase");
        root.push_attribute(("xmlns:xsd", XSD_NS));
        root.push_attribute(("xmlns:xsi", XSI_NS));
        root.push_attribute(("xmlns", TCX_NS));
        w.write_event(Event::Start(root))?;

        if self.activities.is_empty() {
            empty(&mut w, "Activities")?;
        } else {
            open(&mut w, "Activities")?;
            for a in &self.activities {
                a.write_xml(&mut w)?;
            }
            close(&mut w, "Activities")?;
        }

        close(&mut w, "TrainingCenterDatabase")?;
        w.into_inner().flush()?;
        Ok(())
    }

    pub fn to_xml_string(&self, pretty: bool) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf, pretty)?;
        String::from_utf8(buf)
            .map_err(|e| ExportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    /// Render in memory, then write `path` in place.
    ///
    /// The file is opened like any other output, so a new file gets the
    /// umask default, an existing one keeps its mode and symlinks are
    /// followed.
    pub fn write_file(&self, path: &Path, pretty: bool) -> Result<()> {
        let mut buf = Vec::new();
        self.write_to(&mut buf, pretty)?;

        let mut out = File::create(path)?;
        out.write_all(&buf)?;
        out.flush()?;
        Ok(())
    }
}

/// One activity, one lap, one track, one trackpoint per merged sample.
pub fn build_document(samples: &MergedSamples, ids: &mut impl IdProvider) -> TcxData {
    let mut track = Track::new();
    for s in samples.values() {
        track.add_trackpoint(Trackpoint::from_merged(s));
    }

    let mut activity = Activity::new(ids);
    activity.add_lap(Lap::new(track));

    let mut doc = TcxData::new();
    doc.add_activity(activity);
    doc
}

fn open<W: Write>(w: &mut Writer<W>, name: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn close<W: Write>(w: &mut Writer<W>, name: &str) -> Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn empty<W: Write>(w: &mut Writer<W>, name: &str) -> Result<()> {
    w.write_event(Event::Empty(BytesStart::new(name)))?;
    Ok(())
}

fn text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    open(w, name)?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    close(w, name)
}
