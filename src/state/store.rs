use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::data::{Report, ReportId, Status};
use crate::error::{ReporterError, Result};

/// Key under which the whole report collection is stored
pub const STORAGE_KEY: &str = "facility-reports";

/// What `load` found in storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing persisted yet
    Empty,
    /// This many reports were read
    Loaded(usize),
    /// The blob was unreadable; the store starts empty
    Recovered(String),
}

/// The ReportStore owns the canonical report collection.
/// It keeps an in-memory copy and mirrors it to a single JSON blob
/// in a SQLite key-value table.
pub struct ReportStore {
    conn: Connection,
    db_path: Option<PathBuf>,
    reports: Vec<Report>,
}

impl ReportStore {
    /// Open (or create) the store at `path`.
    /// The parent directory is created when missing.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        info!("📁 Report store opened at: {}", path.display());

        let store = ReportStore {
            conn,
            db_path: Some(path.to_path_buf()),
            reports: Vec::new(),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Store backed by a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let store = ReportStore {
            conn: Connection::open_in_memory()?,
            db_path: None,
            reports: Vec::new(),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// The in-memory collection, in insertion order
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn get(&self, id: ReportId) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == id)
    }

    /// Read the persisted collection into memory.
    /// Malformed data is discarded and reported as `Recovered`.
    pub fn load(&mut self) -> Result<LoadOutcome> {
        let Some(blob) = self.read_blob()? else {
            self.reports.clear();
            debug!("No persisted reports, starting empty");
            return Ok(LoadOutcome::Empty);
        };

        match decode_collection(&blob) {
            Ok(reports) => {
                let count = reports.len();
                self.reports = reports;
                info!("📦 Loaded {} reports", count);
                Ok(LoadOutcome::Loaded(count))
            }
            Err(e) => {
                warn!("⚠️  Stored reports are unreadable, starting empty: {}", e);
                self.reports.clear();
                Ok(LoadOutcome::Recovered(e.to_string()))
            }
        }
    }

    /// Append one report and return it as saved.
    /// Re-reads the persisted blob first so reports written by another
    /// process since our last load are kept. The incoming id is a request
    /// (usually a millisecond timestamp); the final id is allocated against
    /// the re-read collection so it never collides with another writer's.
    pub fn append(&mut self, mut report: Report) -> Result<Report> {
        report.validate()?;

        let mut collection = match self.read_blob()? {
            Some(blob) => decode_collection(&blob).unwrap_or_else(|e| {
                warn!("⚠️  Stored reports are unreadable, appending to memory copy: {}", e);
                self.reports.clone()
            }),
            None => Vec::new(),
        };

        report.id = allocate_id(&collection, report.id);
        collection.push(report.clone());
        self.write_blob(&serde_json::to_string(&collection)?)?;
        self.reports = collection;

        info!("✅ Report {} saved ({} total)", report.id, self.reports.len());
        Ok(report)
    }

    /// Replace the collection and persist it verbatim
    pub fn replace_all(&mut self, reports: Vec<Report>) -> Result<()> {
        self.write_blob(&serde_json::to_string(&reports)?)?;
        self.reports = reports;
        debug!("Persisted {} reports", self.reports.len());
        Ok(())
    }

    /// Change one report's status and persist the whole collection.
    /// Memory is left untouched when the write fails.
    pub fn set_status(&mut self, id: ReportId, status: Status) -> Result<()> {
        let mut updated = self.reports.clone();
        let report = updated
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ReporterError::NotFound(id))?;
        report.status = status;

        self.replace_all(updated)?;
        info!("🔁 Report {} is now {}", id, status.as_str());
        Ok(())
    }

    fn read_blob(&self) -> Result<Option<String>> {
        let blob = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![STORAGE_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(blob)
    }

    fn write_blob(&self, json: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![STORAGE_KEY, json],
        )?;
        Ok(())
    }
}

/// `requested`, or one past the highest id already stored.
/// Ids stay strictly increasing even when two submits land in the same millisecond.
fn allocate_id(reports: &[Report], requested: ReportId) -> ReportId {
    let last = reports.iter().map(|r| r.id).max().unwrap_or(i64::MIN);
    requested.max(last.saturating_add(1))
}

/// Parse and validate a stored collection
fn decode_collection(blob: &str) -> Result<Vec<Report>> {
    let reports: Vec<Report> = serde_json::from_str(blob)?;
    for report in &reports {
        report.validate()?;
    }
    Ok(reports)
}

impl std::fmt::Debug for ReportStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportStore")
            .field("db_path", &self.db_path)
            .field("reports", &self.reports.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::fixtures::report;

    #[test]
    fn test_load_empty_store() {
        let mut store = ReportStore::open_in_memory().unwrap();
        assert_eq!(store.load().unwrap(), LoadOutcome::Empty);
        assert!(store.reports().is_empty());
    }

    #[test]
    fn test_append_counts_match_persisted_length() {
        let mut store = ReportStore::open_in_memory().unwrap();
        for id in 1..=4 {
            store.append(report(id, Status::Submitted, 1)).unwrap();
        }
        assert_eq!(store.load().unwrap(), LoadOutcome::Loaded(4));
        assert_eq!(store.reports().len(), 4);
    }

    #[test]
    fn test_append_rejects_invalid_report() {
        let mut store = ReportStore::open_in_memory().unwrap();
        let err = store.append(report(1, Status::Submitted, 0)).unwrap_err();
        assert!(matches!(err, ReporterError::InvalidReport(_)));
        assert_eq!(store.load().unwrap(), LoadOutcome::Empty);
    }

    #[test]
    fn test_replace_all_then_load_is_lossless() {
        let mut store = ReportStore::open_in_memory().unwrap();
        let mut reports = vec![
            report(10, Status::Submitted, 1),
            report(11, Status::InProgress, 3),
            report(12, Status::Resolved, 5),
        ];
        reports[1].description = "Leaking under the basin".to_string();

        store.replace_all(reports.clone()).unwrap();
        store.load().unwrap();
        assert_eq!(store.reports(), reports.as_slice());
    }

    #[test]
    fn test_set_status_persists() {
        let mut store = ReportStore::open_in_memory().unwrap();
        store.append(report(1, Status::Submitted, 1)).unwrap();
        store.set_status(1, Status::Resolved).unwrap();

        store.load().unwrap();
        assert_eq!(store.get(1).map(|r| r.status), Some(Status::Resolved));
    }

    #[test]
    fn test_set_status_unknown_id() {
        let mut store = ReportStore::open_in_memory().unwrap();
        assert!(matches!(
            store.set_status(99, Status::Resolved),
            Err(ReporterError::NotFound(99))
        ));
    }

    #[test]
    fn test_malformed_blob_recovers_to_empty() {
        let mut store = ReportStore::open_in_memory().unwrap();
        store.write_blob("{not json").unwrap();
        assert!(matches!(store.load().unwrap(), LoadOutcome::Recovered(_)));
        assert!(store.reports().is_empty());
    }

    #[test]
    fn test_invariant_violation_recovers_to_empty() {
        let mut store = ReportStore::open_in_memory().unwrap();
        let mut bad = report(1, Status::Submitted, 2);
        bad.thumbnails.clear();
        store
            .write_blob(&serde_json::to_string(&vec![bad]).unwrap())
            .unwrap();
        assert!(matches!(store.load().unwrap(), LoadOutcome::Recovered(_)));
    }

    #[test]
    fn test_append_keeps_reports_from_another_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reports.db");

        let mut first = ReportStore::open(&path).unwrap();
        let mut second = ReportStore::open(&path).unwrap();
        first.load().unwrap();
        second.load().unwrap();

        first.append(report(1, Status::Submitted, 1)).unwrap();
        second.append(report(2, Status::Submitted, 1)).unwrap();

        assert_eq!(second.reports().len(), 2);
        first.load().unwrap();
        let ids: Vec<ReportId> = first.reports().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_allocated_ids_are_monotonic() {
        let mut store = ReportStore::open_in_memory().unwrap();
        assert_eq!(store.append(report(1_000, Status::Submitted, 1)).unwrap().id, 1_000);
        assert_eq!(store.append(report(1_000, Status::Submitted, 1)).unwrap().id, 1_001);
        assert_eq!(store.append(report(5_000, Status::Submitted, 1)).unwrap().id, 5_000);
    }

    #[test]
    fn test_same_millisecond_writers_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.db");

        let mut first = ReportStore::open(&path).unwrap();
        let mut second = ReportStore::open(&path).unwrap();
        first.load().unwrap();
        second.load().unwrap();

        // Neither writer has seen the other's report when it picks a timestamp
        let a = first.append(report(7_000, Status::Submitted, 1)).unwrap();
        let b = second.append(report(7_000, Status::Submitted, 1)).unwrap();
        assert_eq!(a.id, 7_000);
        assert_eq!(b.id, 7_001);

        second.set_status(b.id, Status::Resolved).unwrap();
        first.load().unwrap();
        assert_eq!(first.get(a.id).map(|r| r.status), Some(Status::Submitted));
        assert_eq!(first.get(b.id).map(|r| r.status), Some(Status::Resolved));
    }
}
