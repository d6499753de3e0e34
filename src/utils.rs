use crate::error::{ExportError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing_subscriber::{EnvFilter, fmt};

#[macro_export]
macro_rules! dlog {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*);
    };
}

/// Initialize colorful logging.
///
/// Default level is INFO.
/// - `-v` => DEBUG
/// - `-vv` => TRACE
/// - `-q` => WARN
/// - `-qq` => ERROR
///
/// `RUST_LOG` overrides everything (e.g. `RUST_LOG=trace`).
pub fn init_logging(verbose: u8, quiet: u8) {
    let net = i16::from(verbose) - i16::from(quiet);
    let level = match net {
        i16::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        2..=i16::MAX => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,tcxexport={level}")));

    let show_src = matches!(level, "debug" | "trace");

    fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_file(show_src)
        .with_line_number(show_src)
        .compact()
        .init();
}

// YYYYMMDDhhmmss followed by 1..=6 fractional digits.
static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{1,6})$")
        .expect("timestamp pattern is valid")
});

/// Parse a source timestamp such as `20190125183405026771`.
///
/// The fraction is read as a decimal fraction of a second, so `...055`
/// means 550 ms, not 55 µs.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let caps = TIMESTAMP_RE
        .captures(s)
        .ok_or_else(|| ExportError::parse(s, "expected YYYYMMDDhhmmss plus 1 to 6 fraction digits"))?;

    let num = |i: usize| -> Result<u32> {
        caps[i]
            .parse::<u32>()
            .map_err(|e| ExportError::parse(s, e.to_string()))
    };

    let year = i32::try_from(num(1)?).map_err(|e| ExportError::parse(s, e.to_string()))?;
    let micros: u32 = format!("{:0<6}", &caps[7])
        .parse()
        .map_err(|e: std::num::ParseIntError| ExportError::parse(s, e.to_string()))?;

    NaiveDate::from_ymd_opt(year, num(2)?, num(3)?)
        .and_then(|d| d.and_hms_micro_opt(num(4).ok()?, num(5).ok()?, num(6).ok()?, micros))
        .ok_or_else(|| ExportError::parse(s, "not a valid calendar date and time"))
}

/// `YYYY-MM-DD HH:MM:SS.mmm`, truncated to the millisecond.
pub fn format_time(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Shortest round-trip text for a float, always carrying a fraction or an
/// exponent (`5.0`, `51.026771`, `1e+16`, `1e-05`).
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{v:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if (-4..16).contains(&exp) {
        let plain = v.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
    }
}

/// Euclidean norm of a 3-axis reading.
pub fn magnitude(x: f64, y: f64, z: f64) -> f64 {
    (x * x + y * y + z * z).sqrt()
}
