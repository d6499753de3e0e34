use chrono::NaiveDateTime;

/// One accelerometer row as it comes out of a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionRow {
    pub timestamp: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One GPS row as it comes out of a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRow {
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub t: NaiveDateTime,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub t: NaiveDateTime,
    pub lat: f64,
    pub lon: f64,
}

/// Everything observed at one exact instant across both streams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedSample {
    pub t: NaiveDateTime,
    pub magnitude: Option<f64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl MergedSample {
    pub const fn empty(t: NaiveDateTime) -> Self {
        Self {
            t,
            magnitude: None,
            lat: None,
            lon: None,
        }
    }
}
