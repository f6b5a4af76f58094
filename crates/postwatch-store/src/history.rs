//! Append-only history table and latest-per-device aggregation

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use postwatch_api::{ReportFilter, ReportRecord};
use rusqlite::{Connection, Row, params};
use tracing::{debug, instrument};

use crate::error::StoreError;

/// A validated report ready for insertion
///
/// Produced by the collector's ingestion step; carries no timestamp or id —
/// both are assigned here at insertion time.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub device_id: String,
    pub disk_encryption: String,
    pub os_update: String,
    pub antivirus: String,
    pub sleep_settings: String,
}

/// Report history persistence
///
/// The table is append-only: rows are never updated or deleted, so readers
/// need no coordination with writers beyond the connection lock, and the
/// autoincrement row id doubles as the insertion-order tie-breaker.
pub struct HistoryStore {
    conn: Mutex<Connection>,
}

const REPORT_COLUMNS: &str =
    "id, device_id, observed_at, disk_encryption, os_update, antivirus, sleep_settings";

impl HistoryStore {
    /// Open (creating if necessary) the history database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store for tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id       TEXT NOT NULL,
                observed_at     TEXT NOT NULL,
                disk_encryption TEXT NOT NULL,
                os_update       TEXT NOT NULL,
                antivirus       TEXT NOT NULL,
                sleep_settings  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reports_device
                ON reports(device_id, observed_at DESC, id DESC);
        "#,
        )?;
        Ok(())
    }

    /// Append one immutable report row, assigning the observation timestamp
    /// and row id
    #[instrument(skip(self, new), fields(device_id = %new.device_id))]
    pub fn append(&self, new: &NewReport) -> Result<ReportRecord, StoreError> {
        self.append_at(new, Utc::now())
    }

    /// Insertion with an explicit timestamp; lets tests force collisions
    fn append_at(
        &self,
        new: &NewReport,
        observed_at: DateTime<Utc>,
    ) -> Result<ReportRecord, StoreError> {
        let conn = self.conn.lock().unwrap();
        // Fixed-width UTC encoding so lexicographic string order matches
        // chronological order
        let observed = observed_at.to_rfc3339_opts(SecondsFormat::Micros, true);
        conn.execute(
            "INSERT INTO reports (device_id, observed_at, disk_encryption, os_update, antivirus, sleep_settings)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.device_id,
                observed,
                new.disk_encryption,
                new.os_update,
                new.antivirus,
                new.sleep_settings
            ],
        )?;
        let id = conn.last_insert_rowid();

        debug!(id, "report appended");

        Ok(ReportRecord {
            id,
            device_id: new.device_id.clone(),
            observed_at,
            disk_encryption: new.disk_encryption.clone(),
            os_update: new.os_update.clone(),
            antivirus: new.antivirus.clone(),
            sleep_settings: new.sleep_settings.clone(),
        })
    }

    /// Most recent report for one device, or `None` if it has never reported
    ///
    /// "Most recent" is max `observed_at`, ties broken by highest row id.
    #[instrument(skip(self))]
    pub fn latest_for_device(&self, device_id: &str) -> Result<Option<ReportRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports
             WHERE device_id = ?1
             ORDER BY observed_at DESC, id DESC
             LIMIT 1"
        ))?;
        let mut rows = stmt.query_map(params![device_id], row_to_record)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Latest report for every known device, one row per device
    pub fn latest_for_all(&self) -> Result<Vec<ReportRecord>, StoreError> {
        self.latest_filtered(&ReportFilter::default())
    }

    /// Latest-per-device restricted by exact-match predicates
    ///
    /// Predicates apply to each device's latest row only: a device is never
    /// excluded because an older report fails the filter. Empty result sets
    /// are a normal outcome, not an error.
    #[instrument(skip(self))]
    pub fn latest_filtered(&self, filter: &ReportFilter) -> Result<Vec<ReportRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports r
             WHERE r.id = (SELECT r2.id FROM reports r2
                           WHERE r2.device_id = r.device_id
                           ORDER BY r2.observed_at DESC, r2.id DESC
                           LIMIT 1)"
        );
        let mut args: Vec<&dyn rusqlite::ToSql> = Vec::new();
        if let Some(os_update) = &filter.os_update {
            sql.push_str(" AND r.os_update = ?");
            args.push(os_update);
        }
        if let Some(disk_encryption) = &filter.disk_encryption {
            sql.push_str(" AND r.disk_encryption = ?");
            args.push(disk_encryption);
        }
        sql.push_str(" ORDER BY r.device_id");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(args.as_slice(), row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ReportRecord> {
    let observed: String = row.get(2)?;
    let observed_at = DateTime::parse_from_rfc3339(&observed)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(ReportRecord {
        id: row.get(0)?,
        device_id: row.get(1)?,
        observed_at,
        disk_encryption: row.get(3)?,
        os_update: row.get(4)?,
        antivirus: row.get(5)?,
        sleep_settings: row.get(6)?,
    })
}
