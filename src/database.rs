use crate::dlog;
use crate::error::{ExportError, Result};
use crate::types::{MotionRow, PositionRow};
use rusqlite::{Connection, OpenFlags, params};
use std::path::Path;

/// Table holding accelerometer rows.
pub const MOTION_TABLE: &str = "accelerometerevent";
/// Table holding GPS rows.
pub const POSITION_TABLE: &str = "locationeventpertime";

/// Position queries never return more rows than this.
///
/// There is no pagination; for a busy day only the earliest rows make it
/// into the export.
pub const POSITION_ROW_CAP: i64 = 100;

/// Somewhere per-user, per-day sensor rows can be read from.
///
/// `day` is passed through to the store as-is and always bound as a
/// statement parameter.
pub trait SampleSource {
    fn motion_rows(&mut self, user: &str, day: &str) -> Result<Vec<MotionRow>>;
    fn position_rows(&mut self, user: &str, day: &str) -> Result<Vec<PositionRow>>;
}

/// A SQLite snapshot with both tables carrying an extra `user` column.
pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    /// Open an existing snapshot read-only.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| ExportError::Connection(format!("{}: {e}", path.display())))?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        for table in [MOTION_TABLE, POSITION_TABLE] {
            if !table_exists(&conn, table)? {
                return Err(ExportError::Query(format!(
                    "SQLite DB does not contain {table}"
                )));
            }
        }
        Ok(Self { conn })
    }

    /// Create both tables in `conn` if missing.
    pub fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS accelerometerevent (
              user       TEXT NOT NULL,
              day        TEXT NOT NULL,
              timestamp  TEXT NOT NULL,
              x          REAL NOT NULL,
              y          REAL NOT NULL,
              z          REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS locationeventpertime (
              user       TEXT NOT NULL,
              day        TEXT NOT NULL,
              timestamp  TEXT NOT NULL,
              latitude   REAL NOT NULL,
              longitude  REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS accelerometerevent_user_day_idx
              ON accelerometerevent (user, day, timestamp);
            CREATE INDEX IF NOT EXISTS locationeventpertime_user_day_idx
              ON locationeventpertime (user, day, timestamp);
            ",
        )?;
        Ok(())
    }
}

impl SampleSource for SqliteSource {
    fn motion_rows(&mut self, user: &str, day: &str) -> Result<Vec<MotionRow>> {
        let sql = r"
            SELECT timestamp, x, y, z
            FROM accelerometerevent
            WHERE user = ?1 AND day = ?2
            ORDER BY timestamp
        ";

        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params![user, day])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(MotionRow {
                timestamp: row.get(0)?,
                x: row.get(1)?,
                y: row.get(2)?,
                z: row.get(3)?,
            });
        }

        dlog!("sqlite motion_rows user={user} day={day} rows={}", out.len());
        Ok(out)
    }

    fn position_rows(&mut self, user: &str, day: &str) -> Result<Vec<PositionRow>> {
        let sql = r"
            SELECT timestamp, latitude, longitude
            FROM locationeventpertime
            WHERE user = ?1 AND day = ?2
            ORDER BY timestamp
            LIMIT ?3
        ";

        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params![user, day, POSITION_ROW_CAP])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(PositionRow {
                timestamp: row.get(0)?,
                latitude: row.get(1)?,
                longitude: row.get(2)?,
            });
        }

        dlog!("sqlite position_rows user={user} day={day} rows={}", out.len());
        Ok(out)
    }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SqliteSource {
        let conn = Connection::open_in_memory().unwrap();
        SqliteSource::create_schema(&conn).unwrap();
        conn.execute_batch(
            r"
            INSERT INTO accelerometerevent VALUES
              ('alice', '2019-01-25', '20190125183406000000', 1.0, 2.0, 2.0),
              ('alice', '2019-01-25', '20190125183405000000', 3.0, 4.0, 0.0),
              ('alice', '2019-01-26', '20190126000000000000', 9.0, 9.0, 9.0),
              ('bob',   '2019-01-25', '20190125183405000000', 7.0, 7.0, 7.0);
            INSERT INTO locationeventpertime VALUES
              ('alice', '2019-01-25', '20190125183405000000', 51.026771, 13.819436),
              ('bob',   '2019-01-25', '20190125183405000000', 1.0, 1.0);
            ",
        )
        .unwrap();
        SqliteSource::from_connection(conn).unwrap()
    }

    #[test]
    fn motion_rows_are_filtered_and_ordered() {
        let rows = source().motion_rows("alice", "2019-01-25").unwrap();
        let stamps: Vec<_> = rows.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(stamps, ["20190125183405000000", "20190125183406000000"]);
        assert_eq!((rows[0].x, rows[0].y, rows[0].z), (3.0, 4.0, 0.0));
    }

    #[test]
    fn position_rows_are_filtered_by_user() {
        let rows = source().position_rows("alice", "2019-01-25").unwrap();
        assert_eq!(
            rows,
            vec![PositionRow {
                timestamp: "20190125183405000000".into(),
                latitude: 51.026771,
                longitude: 13.819436,
            }]
        );
    }

    #[test]
    fn hostile_user_value_is_just_data() {
        let mut src = source();
        let rows = src
            .motion_rows("alice' OR '1'='1", "2019-01-25")
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn position_rows_respect_cap() {
        let conn = Connection::open_in_memory().unwrap();
        SqliteSource::create_schema(&conn).unwrap();
        for i in 0..150 {
            conn.execute(
                "INSERT INTO locationeventpertime VALUES ('alice', 'd', ?1, 1.0, 2.0)",
                [format!("20190125100000{i:06}")],
            )
            .unwrap();
        }
        let mut src = SqliteSource::from_connection(conn).unwrap();
        let rows = src.position_rows("alice", "d").unwrap();
        assert_eq!(rows.len(), 100);
        assert_eq!(rows.last().unwrap().timestamp, "20190125100000000099");
    }

    #[test]
    fn missing_tables_are_a_query_error() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteSource::from_connection(conn).err().unwrap();
        assert!(matches!(err, ExportError::Query(_)));
    }

    #[test]
    fn missing_file_is_a_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SqliteSource::open(&dir.path().join("nope.db")).err().unwrap();
        assert!(matches!(err, ExportError::Connection(_)));
    }
}
