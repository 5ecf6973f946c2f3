use super::models::{NewRecord, Record};
use super::schema::INVENTORY_VERSIONED_SCHEMAS;
use super::{InsertOutcome, InventoryStore, RebinOutcome, RebinRequest};
use crate::binning::{next_master_key, rebin_and_diff, MasterKeyAllocator};
use crate::change_log::{
    AuditLogger, ChangeLogEntry, ChangeLogFilter, ChangeLogSink, ChangeType, RebinRun,
};
use crate::error::InventoryError;
use crate::sqlite_persistence::validate_and_migrate;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Transaction, TransactionBehavior,
};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

const RECORD_COLUMNS: &str =
    "id, artist, title, genre_code, media_type_code, year, special, sort_bucket, bin_number, bin_code";

const CHANGE_LOG_COLUMNS: &str = "id, timestamp, change_type, record_id, artist, title, year, \
     triggered_by, old_bin, old_bin_code, new_bin, new_bin_code, notes, reviewed, run_id";

const REBIN_RUN_COLUMNS: &str = "id, started_at, triggered_by, records_total, added, moved, notes";

/// SQLite-backed [`InventoryStore`].
///
/// The connection mutex plus an immediate transaction make up the exclusive
/// section every mutation runs in.
#[derive(Clone)]
pub struct SqliteInventoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteInventoryStore {
    /// Opens the database at `db_path`, creating it at the latest schema
    /// version if it does not exist, or validating and migrating it if it does.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let mut conn = Connection::open(path)
            .with_context(|| format!("Failed to open inventory database {:?}", path))?;

        if is_new_db {
            info!("Creating new inventory database at {:?}", path);
            Self::create_latest_schema(&conn)?;
        } else {
            validate_and_migrate(&mut conn, INVENTORY_VERSIONED_SCHEMAS, "inventory")?;
        }

        Ok(Self::from_connection(conn))
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::create_latest_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn create_latest_schema(conn: &Connection) -> Result<()> {
        INVENTORY_VERSIONED_SCHEMAS
            .last()
            .context("No inventory schema declared")?
            .create(conn)
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

// =============================================================================
// Row mapping
// =============================================================================

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    // Fixed width, so text order is chronological order
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Record> {
    let sort_bucket: Option<String> = row.get("sort_bucket")?;
    Ok(Record {
        id: row.get("id")?,
        artist: row.get("artist")?,
        title: row.get("title")?,
        genre_code: row.get("genre_code")?,
        media_type_code: row.get("media_type_code")?,
        year: row.get("year")?,
        special: row.get("special")?,
        sort_bucket: sort_bucket.and_then(|s| s.chars().next()),
        bin_number: row.get("bin_number")?,
        bin_code: row.get("bin_code")?,
    })
}

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<ChangeLogEntry> {
    let timestamp: String = row.get("timestamp")?;
    let change_type: String = row.get("change_type")?;
    Ok(ChangeLogEntry {
        id: row.get("id")?,
        timestamp: parse_timestamp(1, &timestamp)?,
        change_type: ChangeType::parse(&change_type).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                format!("Unknown change type '{}'", change_type).into(),
            )
        })?,
        record_id: row.get("record_id")?,
        artist: row.get("artist")?,
        title: row.get("title")?,
        year: row.get("year")?,
        trigger: row.get("triggered_by")?,
        old_bin: row.get("old_bin")?,
        old_bin_code: row.get("old_bin_code")?,
        new_bin: row.get("new_bin")?,
        new_bin_code: row.get("new_bin_code")?,
        notes: row.get("notes")?,
        reviewed: row.get("reviewed")?,
        run_id: row.get("run_id")?,
    })
}

fn row_to_run(row: &rusqlite::Row) -> rusqlite::Result<RebinRun> {
    let started_at: String = row.get("started_at")?;
    Ok(RebinRun {
        id: row.get("id")?,
        started_at: parse_timestamp(1, &started_at)?,
        trigger: row.get("triggered_by")?,
        records_total: row.get::<_, i64>("records_total")? as usize,
        added: row.get::<_, i64>("added")? as usize,
        moved: row.get::<_, i64>("moved")? as usize,
        notes: row.get("notes")?,
    })
}

// =============================================================================
// Statements run inside the caller's transaction
// =============================================================================

fn select_max_id(conn: &Connection) -> Result<Option<String>> {
    Ok(conn.query_row("SELECT MAX(id) FROM records", [], |row| row.get(0))?)
}

fn select_record(conn: &Connection, id: &str) -> Result<Option<Record>> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM records WHERE id = ?1", RECORD_COLUMNS),
            params![id],
            row_to_record,
        )
        .optional()?)
}

fn load_records(conn: &Connection) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM records ORDER BY id",
        RECORD_COLUMNS
    ))?;
    let records = stmt
        .query_map([], row_to_record)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

fn insert_record(conn: &Connection, record: &Record) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO records ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            RECORD_COLUMNS
        ),
        params![
            record.id,
            record.artist,
            record.title,
            record.genre_code,
            record.media_type_code,
            record.year,
            record.special,
            record.sort_bucket.map(String::from),
            record.bin_number,
            record.bin_code,
        ],
    )
    .with_context(|| format!("Failed to insert record {}", record.id))?;
    Ok(())
}

/// Writes the derived fields back. A record that vanished since it was read
/// is an error, never a silent skip.
fn write_placement(conn: &Connection, record: &Record) -> Result<()> {
    let updated = conn.execute(
        "UPDATE records SET sort_bucket = ?1, bin_number = ?2, bin_code = ?3 WHERE id = ?4",
        params![
            record.sort_bucket.map(String::from),
            record.bin_number,
            record.bin_code,
            record.id,
        ],
    )?;
    if updated == 0 {
        return Err(InventoryError::RecordNotFound(record.id.clone()).into());
    }
    Ok(())
}

fn insert_run(conn: &Connection, run: &RebinRun) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO rebin_runs ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            REBIN_RUN_COLUMNS
        ),
        params![
            run.id,
            format_timestamp(&run.started_at),
            run.trigger,
            run.records_total as i64,
            run.added as i64,
            run.moved as i64,
            run.notes,
        ],
    )?;
    Ok(())
}

impl ChangeLogSink for Connection {
    fn append_change(&self, entry: &ChangeLogEntry) -> Result<i64> {
        self.execute(
            "INSERT INTO change_log (timestamp, change_type, record_id, artist, title, year, \
             triggered_by, old_bin, old_bin_code, new_bin, new_bin_code, notes, reviewed, run_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                format_timestamp(&entry.timestamp),
                entry.change_type.as_str(),
                entry.record_id,
                entry.artist,
                entry.title,
                entry.year,
                entry.trigger,
                entry.old_bin,
                entry.old_bin_code,
                entry.new_bin,
                entry.new_bin_code,
                entry.notes,
                entry.reviewed,
                entry.run_id,
            ],
        )
        .with_context(|| format!("Failed to log change for record {}", entry.record_id))?;
        Ok(self.last_insert_rowid())
    }
}

/// Snapshot, rebin, write back and log, all on `conn`. Returns the outcome
/// and every record as placed.
fn rebin_within(conn: &Connection, request: &RebinRequest) -> Result<(RebinOutcome, Vec<Record>)> {
    let mut records = load_records(conn)?;
    let original = records.clone();
    let changes = rebin_and_diff(&mut records, request.capacity);

    for (before, after) in original.iter().zip(records.iter()) {
        if before != after {
            write_placement(conn, after)?;
        }
    }

    let records_total = records.len();
    let logger = AuditLogger::new(conn, &request.trigger);
    let (run, entries) = if request.dry_run {
        let entries = changes
            .iter()
            .map(|change| logger.entry_for_change(change, None))
            .collect::<Vec<_>>();
        (None, entries)
    } else {
        let count = |change_type: ChangeType| changes.iter().filter(|c| c.change_type == change_type).count();
        let run = RebinRun {
            id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            trigger: request.trigger.clone(),
            records_total,
            added: count(ChangeType::Add),
            moved: count(ChangeType::Move),
            notes: request.notes.clone(),
        };
        insert_run(conn, &run)?;
        let entries = logger.log_changes(&changes, Some(&run.id))?;
        (Some(run), entries)
    };

    let outcome = RebinOutcome {
        run,
        records_total,
        entries,
        dry_run: request.dry_run,
    };
    info!(
        "Rebin by '{}'{}: {} records, {} added, {} moved",
        request.trigger,
        if request.dry_run { " (dry run)" } else { "" },
        outcome.records_total,
        outcome.added(),
        outcome.moved()
    );
    Ok((outcome, records))
}

fn finish(tx: Transaction, dry_run: bool) -> Result<()> {
    if dry_run {
        tx.rollback()?;
        debug!("Dry run rolled back");
    } else {
        tx.commit()?;
    }
    Ok(())
}

impl InventoryStore for SqliteInventoryStore {
    fn peek_next_master_key(&self) -> Result<String> {
        let conn = self.conn.lock().unwrap();
        let max_id = select_max_id(&conn)?;
        Ok(next_master_key(max_id.as_deref())?)
    }

    fn get_record(&self, id: &str) -> Result<Option<Record>> {
        let conn = self.conn.lock().unwrap();
        select_record(&conn, id)
    }

    fn list_records(&self) -> Result<Vec<Record>> {
        let conn = self.conn.lock().unwrap();
        load_records(&conn)
    }

    fn count_records(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn insert_and_rebin(
        &self,
        new_records: Vec<NewRecord>,
        request: &RebinRequest,
    ) -> Result<InsertOutcome> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut allocator = MasterKeyAllocator::starting_after(select_max_id(&tx)?);
        let mut inserted_ids = HashSet::with_capacity(new_records.len());
        for new_record in new_records {
            let record = new_record.into_record(allocator.allocate()?);
            insert_record(&tx, &record)?;
            debug!("Inserted record {} ({} - {})", record.id, record.artist, record.title);
            inserted_ids.insert(record.id);
        }

        let (rebin, records) = rebin_within(&tx, request)?;
        let records = records
            .into_iter()
            .filter(|record| inserted_ids.contains(&record.id))
            .collect();

        finish(tx, request.dry_run)?;
        Ok(InsertOutcome { records, rebin })
    }

    fn update_details(&self, id: &str, details: &NewRecord) -> Result<Record> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE records SET artist = ?1, title = ?2, genre_code = ?3, media_type_code = ?4, \
             year = ?5, special = ?6 WHERE id = ?7",
            params![
                details.artist,
                details.title,
                details.genre_code,
                details.media_type_code,
                details.year,
                details.special,
                id,
            ],
        )?;
        if updated == 0 {
            return Err(InventoryError::RecordNotFound(id.to_string()).into());
        }
        select_record(&conn, id)?.ok_or_else(|| InventoryError::RecordNotFound(id.to_string()).into())
    }

    fn rebin_and_log(&self, request: &RebinRequest) -> Result<RebinOutcome> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let (outcome, _) = rebin_within(&tx, request)?;
        finish(tx, request.dry_run)?;
        Ok(outcome)
    }

    fn delete_record(&self, id: &str, trigger: &str) -> Result<ChangeLogEntry> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let record = select_record(&tx, id)?
            .ok_or_else(|| InventoryError::RecordNotFound(id.to_string()))?;
        tx.execute("DELETE FROM records WHERE id = ?1", params![id])?;
        let entry = AuditLogger::new(&*tx, trigger).log_record_deleted(&record)?;

        tx.commit()?;
        info!(
            "Deleted record {} from bin {} ({}) by '{}'",
            record.id,
            record.bin_or_zero(),
            record.bin_code,
            trigger
        );
        Ok(entry)
    }

    fn list_change_log(&self, filter: &ChangeLogFilter) -> Result<Vec<ChangeLogEntry>> {
        let conn = self.conn.lock().unwrap();

        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if filter.unreviewed_only {
            conditions.push("reviewed = 0".to_string());
        }
        if let Some(change_type) = filter.change_type {
            values.push(Value::Text(change_type.as_str().to_string()));
            conditions.push(format!("change_type = ?{}", values.len()));
        }
        if let Some(record_id) = &filter.record_id {
            values.push(Value::Text(record_id.clone()));
            conditions.push(format!("record_id = ?{}", values.len()));
        }

        let mut sql = format!("SELECT {} FROM change_log", CHANGE_LOG_COLUMNS);
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY id DESC");
        if let Some(limit) = filter.limit {
            values.push(Value::Integer(limit as i64));
            sql.push_str(&format!(" LIMIT ?{}", values.len()));
        }

        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params_from_iter(values), row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn mark_reviewed(&self, ids: &[i64]) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let mut updated = 0;
        {
            let mut stmt =
                tx.prepare("UPDATE change_log SET reviewed = 1 WHERE id = ?1 AND reviewed = 0")?;
            for id in ids {
                updated += stmt.execute(params![id])?;
            }
        }
        tx.commit()?;
        Ok(updated)
    }

    fn mark_all_reviewed(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.execute("UPDATE change_log SET reviewed = 1 WHERE reviewed = 0", [])?)
    }

    fn list_rebin_runs(&self, limit: usize) -> Result<Vec<RebinRun>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM rebin_runs ORDER BY started_at DESC, rowid DESC LIMIT ?1",
            REBIN_RUN_COLUMNS
        ))?;
        let runs = stmt
            .query_map(params![limit as i64], row_to_run)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::DEFAULT_BIN_CAPACITY;
    use crate::sqlite_persistence::read_schema_version;
    use tempfile::TempDir;

    fn request(trigger: &str) -> RebinRequest {
        RebinRequest::new(trigger, DEFAULT_BIN_CAPACITY)
    }

    fn who_and_queen() -> Vec<NewRecord> {
        vec![
            NewRecord::new("The Who", "Quadrophenia").with_genre(5),
            NewRecord::new("Queen", "A Night at the Opera").with_genre(5),
        ]
    }

    fn insert_raw(store: &SqliteInventoryStore, id: &str) {
        let conn = store.conn.lock().unwrap();
        insert_record(&conn, &NewRecord::new("Seed", "Seed").into_record(id.to_string())).unwrap();
    }

    #[test]
    fn next_key_on_empty_store() {
        let store = SqliteInventoryStore::in_memory().unwrap();
        assert_eq!(store.peek_next_master_key().unwrap(), "A1111");
    }

    #[test]
    fn next_key_follows_current_max() {
        let store = SqliteInventoryStore::in_memory().unwrap();
        insert_raw(&store, "A1347");
        assert_eq!(store.peek_next_master_key().unwrap(), "A1348");
        insert_raw(&store, "A9999");
        assert_eq!(store.peek_next_master_key().unwrap(), "B1111");
    }

    #[test]
    fn insert_assigns_keys_places_and_logs_adds() {
        let store = SqliteInventoryStore::in_memory().unwrap();

        let outcome = store
            .insert_and_rebin(who_and_queen(), &request("importer"))
            .unwrap();

        let ids: Vec<&str> = outcome.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["A1111", "A1112"]);
        assert!(outcome.records.iter().all(|r| r.bin_number == Some(1)));
        assert_eq!(outcome.records[0].bin_code, "05-01-W");
        assert_eq!(outcome.records[1].bin_code, "05-01-Q");

        assert_eq!(outcome.rebin.added(), 2);
        assert_eq!(outcome.rebin.moved(), 0);
        let run = outcome.rebin.run.as_ref().unwrap();
        assert_eq!(run.added, 2);
        assert_eq!(run.records_total, 2);

        let logged = store.list_change_log(&ChangeLogFilter::default()).unwrap();
        assert_eq!(logged.len(), 2);
        for entry in &logged {
            assert_eq!(entry.change_type, ChangeType::Add);
            assert_eq!(entry.trigger, "importer");
            assert!(entry.new_bin_code.starts_with("05-"));
            assert!(!entry.reviewed);
            assert_eq!(entry.run_id.as_deref(), Some(run.id.as_str()));
        }
        // newest first, and identical to what the pass returned
        let mut returned = outcome.rebin.entries.clone();
        returned.reverse();
        assert_eq!(logged, returned);
    }

    #[test]
    fn second_rebin_changes_nothing() {
        let store = SqliteInventoryStore::in_memory().unwrap();
        store
            .insert_and_rebin(who_and_queen(), &request("importer"))
            .unwrap();
        let before = store.list_records().unwrap();

        let outcome = store.rebin_and_log(&request("nightly")).unwrap();

        assert!(outcome.entries.is_empty());
        assert_eq!(outcome.run.unwrap().records_total, 2);
        assert_eq!(store.list_records().unwrap(), before);
        assert_eq!(store.list_change_log(&ChangeLogFilter::default()).unwrap().len(), 2);
        assert_eq!(store.list_rebin_runs(10).unwrap().len(), 2);
    }

    #[test]
    fn edited_record_is_logged_as_move() {
        let store = SqliteInventoryStore::in_memory().unwrap();
        store
            .insert_and_rebin(who_and_queen(), &request("importer"))
            .unwrap();

        let details = NewRecord::new("Queen", "A Night at the Opera").with_genre(3);
        store.update_details("A1112", &details).unwrap();
        let outcome = store.rebin_and_log(&request("editor")).unwrap();

        // Queen now leads genre 3 in bin 1, The Who follows in bin 2
        assert_eq!(outcome.moved(), 2);
        let queen = store.get_record("A1112").unwrap().unwrap();
        assert_eq!(queen.bin_code, "03-01-Q");
        let moves = store
            .list_change_log(&ChangeLogFilter {
                record_id: Some("A1111".to_string()),
                change_type: Some(ChangeType::Move),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].notes, "Move from Bin 1 (05-01-W) to Bin 2 (05-02-W).");
    }

    #[test]
    fn override_records_are_stored_without_bin_number() {
        let store = SqliteInventoryStore::in_memory().unwrap();
        let outcome = store
            .insert_and_rebin(
                vec![NewRecord::new("Prince", "Purple Rain").with_genre(5).with_media_type(17)],
                &request("importer"),
            )
            .unwrap();

        let record = store.get_record(&outcome.records[0].id).unwrap().unwrap();
        assert_eq!(record.bin_number, None);
        assert_eq!(record.bin_code, "SS");
        assert_eq!(record.sort_bucket, Some('P'));
        assert_eq!(outcome.rebin.entries[0].notes, "Add to Bin 0 (SS).");
    }

    #[test]
    fn dry_run_leaves_store_untouched() {
        let store = SqliteInventoryStore::in_memory().unwrap();

        let outcome = store
            .insert_and_rebin(who_and_queen(), &request("importer").dry_run(true))
            .unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.rebin.added(), 2);
        assert!(outcome.rebin.run.is_none());
        assert!(outcome.rebin.entries.iter().all(|e| e.id == 0));
        assert_eq!(store.count_records().unwrap(), 0);
        assert!(store.list_change_log(&ChangeLogFilter::default()).unwrap().is_empty());
        assert!(store.list_rebin_runs(10).unwrap().is_empty());
    }

    #[test]
    fn delete_logs_former_placement() {
        let store = SqliteInventoryStore::in_memory().unwrap();
        store
            .insert_and_rebin(who_and_queen(), &request("importer"))
            .unwrap();

        let entry = store.delete_record("A1112", "admin").unwrap();

        assert_eq!(entry.change_type, ChangeType::Delete);
        assert_eq!(entry.artist, "Queen");
        assert_eq!(entry.old_bin, 1);
        assert_eq!(entry.old_bin_code, "05-01-Q");
        assert_eq!(entry.notes, "Remove from Bin 1 (05-01-Q).");
        assert!(entry.run_id.is_none());
        assert!(store.get_record("A1112").unwrap().is_none());
        assert_eq!(store.count_records().unwrap(), 1);
    }

    #[test]
    fn missing_records_surface_not_found() {
        let store = SqliteInventoryStore::in_memory().unwrap();

        let err = store.delete_record("Z0001", "admin").unwrap_err();
        assert_eq!(
            err.downcast_ref::<InventoryError>(),
            Some(&InventoryError::RecordNotFound("Z0001".to_string()))
        );

        let err = store
            .update_details("Z0001", &NewRecord::new("a", "b"))
            .unwrap_err();
        assert!(err.downcast_ref::<InventoryError>().is_some());

        let conn = store.conn.lock().unwrap();
        let ghost = NewRecord::new("Ghost", "Gone").into_record("A1111".to_string());
        let err = write_placement(&conn, &ghost).unwrap_err();
        assert_eq!(
            err.downcast_ref::<InventoryError>(),
            Some(&InventoryError::RecordNotFound("A1111".to_string()))
        );
    }

    #[test]
    fn review_workflow_marks_entries() {
        let store = SqliteInventoryStore::in_memory().unwrap();
        let outcome = store
            .insert_and_rebin(who_and_queen(), &request("importer"))
            .unwrap();
        let first_id = outcome.rebin.entries[0].id;

        assert_eq!(store.mark_reviewed(&[first_id, first_id]).unwrap(), 1);
        let unreviewed = store
            .list_change_log(&ChangeLogFilter {
                unreviewed_only: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(unreviewed.len(), 1);
        assert_ne!(unreviewed[0].id, first_id);

        assert_eq!(store.mark_all_reviewed().unwrap(), 1);
        assert_eq!(store.mark_all_reviewed().unwrap(), 0);
    }

    #[test]
    fn change_log_limit() {
        let store = SqliteInventoryStore::in_memory().unwrap();
        store
            .insert_and_rebin(who_and_queen(), &request("importer"))
            .unwrap();
        let limited = store
            .list_change_log(&ChangeLogFilter {
                limit: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].record_id, "A1112");
    }

    #[test]
    fn file_database_is_reopened() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.db");

        {
            let store = SqliteInventoryStore::new(&path).unwrap();
            store
                .insert_and_rebin(who_and_queen(), &request("importer"))
                .unwrap();
        }

        let store = SqliteInventoryStore::new(&path).unwrap();
        assert_eq!(store.count_records().unwrap(), 2);
        assert_eq!(store.peek_next_master_key().unwrap(), "A1113");
    }

    #[test]
    fn migrates_version_one_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.db");
        {
            let conn = Connection::open(&path).unwrap();
            INVENTORY_VERSIONED_SCHEMAS[0].create(&conn).unwrap();
            conn.execute(
                "INSERT INTO change_log (timestamp, change_type, record_id, triggered_by, notes) \
                 VALUES ('2024-03-01T10:00:00.000000000Z', 'DELETE', 'A1111', 'legacy', 'Remove from Bin 2 (05-02-Q).')",
                [],
            )
            .unwrap();
        }

        let store = SqliteInventoryStore::new(&path).unwrap();

        {
            let conn = store.conn.lock().unwrap();
            assert_eq!(read_schema_version(&conn).unwrap(), 2);
            INVENTORY_VERSIONED_SCHEMAS[1].validate(&conn).unwrap();
        }
        let entries = store.list_change_log(&ChangeLogFilter::default()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].run_id, None);
        assert_eq!(entries[0].trigger, "legacy");
    }
}
