//! PostgreSQL data source.
//!
//! Every user owns a schema named after them, holding
//! `accelerometerevent(day, timestamp, x, y, z)` and
//! `locationeventpertime(day, timestamp, latitude, longitude)`.

use crate::database::{MOTION_TABLE, POSITION_ROW_CAP, POSITION_TABLE, SampleSource};
use crate::dlog;
use crate::error::{ExportError, Result};
use crate::types::{MotionRow, PositionRow};
use postgres::{Client, Config, NoTls};

/// How to reach the sensor database.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub dbname: String,
}

pub struct PgSource {
    client: Client,
}

impl PgSource {
    pub fn connect(opts: &ConnectOptions) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.host(&opts.host)
            .port(opts.port)
            .user(&opts.user)
            .dbname(&opts.dbname);
        if let Some(pw) = &opts.password {
            cfg.password(pw);
        }

        tracing::info!(
            host = %opts.host,
            port = opts.port,
            db = %opts.dbname,
            "connecting to PostgreSQL"
        );
        let client = cfg.connect(NoTls).map_err(|e| {
            ExportError::Connection(format!("{}:{}: {e}", opts.host, opts.port))
        })?;

        Ok(Self { client })
    }
}

impl SampleSource for PgSource {
    fn motion_rows(&mut self, user: &str, day: &str) -> Result<Vec<MotionRow>> {
        let table = qualified_table(user, MOTION_TABLE)?;
        let sql = format!(
            "SELECT timestamp, x, y, z FROM {table} WHERE day = $1 ORDER BY timestamp"
        );

        let rows = self.client.query(&sql, &[&day])?;
        dlog!("pg motion_rows table={table} day={day} rows={}", rows.len());

        rows.iter()
            .map(|r| {
                Ok(MotionRow {
                    timestamp: r.try_get(0)?,
                    x: r.try_get(1)?,
                    y: r.try_get(2)?,
                    z: r.try_get(3)?,
                })
            })
            .collect()
    }

    fn position_rows(&mut self, user: &str, day: &str) -> Result<Vec<PositionRow>> {
        let table = qualified_table(user, POSITION_TABLE)?;
        let sql = format!(
            "SELECT timestamp, latitude, longitude FROM {table} \
             WHERE day = $1 ORDER BY timestamp LIMIT $2"
        );

        let rows = self.client.query(&sql, &[&day, &POSITION_ROW_CAP])?;
        dlog!("pg position_rows table={table} day={day} rows={}", rows.len());

        rows.iter()
            .map(|r| {
                Ok(PositionRow {
                    timestamp: r.try_get(0)?,
                    latitude: r.try_get(1)?,
                    longitude: r.try_get(2)?,
                })
            })
            .collect()
    }
}

/// `"user".table`, refusing anything that is not a plain identifier.
///
/// Schema names cannot be bound as parameters, so they are checked here.
/// The name is folded to lowercase first, the way an unquoted identifier
/// resolves, so `Alice` and `alice` name the same schema.
fn qualified_table(user: &str, table: &str) -> Result<String> {
    if user.is_empty()
        || user.len() > 63
        || !user.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
    {
        return Err(ExportError::Query(format!(
            "refusing to query schema with unsafe name: {user:?}"
        )));
    }
    let schema = user.to_ascii_lowercase();
    Ok(format!("\"{schema}\".{table}"))
}
