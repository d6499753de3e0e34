use crate::database::SampleSource;
use crate::error::Result;
use crate::merge::{merge, parse_motion_rows, parse_position_rows};
use crate::tcx::{IdProvider, TcxData, build_document};
use std::path::Path;

/// What a finished run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub motion_rows: usize,
    pub position_rows: usize,
    pub trackpoints: usize,
}

/// Read both streams for `(user, day)` and build the document.
///
/// Timestamps are parsed before anything is written, so a bad row aborts
/// the run with nothing on disk.
pub fn collect_document(
    source: &mut impl SampleSource,
    user: &str,
    day: &str,
    ids: &mut impl IdProvider,
) -> Result<(TcxData, ExportSummary)> {
    tracing::info!(user, day, "fetching motion rows");
    let motion_rows = source.motion_rows(user, day)?;

    tracing::info!(user, day, "fetching position rows");
    let position_rows = source.position_rows(user, day)?;

    let motion = parse_motion_rows(&motion_rows)?;
    let positions = parse_position_rows(&position_rows)?;
    let merged = merge(&motion, &positions);

    let doc = build_document(&merged, ids);
    let summary = ExportSummary {
        motion_rows: motion_rows.len(),
        position_rows: position_rows.len(),
        trackpoints: doc.trackpoint_count(),
    };

    tracing::info!(
        motion_rows = summary.motion_rows,
        position_rows = summary.position_rows,
        trackpoints = summary.trackpoints,
        "document built"
    );
    Ok((doc, summary))
}

/// The whole pipeline: fetch, merge, build, write `out`.
pub fn export_day(
    source: &mut impl SampleSource,
    user: &str,
    day: &str,
    out: &Path,
    pretty: bool,
    ids: &mut impl IdProvider,
) -> Result<ExportSummary> {
    let (doc, summary) = collect_document(source, user, day, ids)?;
    doc.write_file(out, pretty)?;
    tracing::info!(path = %out.display(), "wrote TCX");
    Ok(summary)
}
