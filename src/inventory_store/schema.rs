//! SQLite schema for the inventory database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

// =============================================================================
// Version 1 - Records and change log
// =============================================================================

const RECORDS_TABLE_V1: Table = Table {
    name: "records",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true), // master key, e.g. A1111
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("genre_code", &SqlType::Integer),
        sqlite_column!("media_type_code", &SqlType::Integer, default_value = Some("10")),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!(
            "special",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("sort_bucket", &SqlType::Text),
        sqlite_column!("bin_number", &SqlType::Integer),
        sqlite_column!(
            "bin_code",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
    ],
    indices: &[("idx_records_bin_number", "bin_number")],
};

const CHANGE_LOG_TABLE_V1: Table = Table {
    name: "change_log",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("timestamp", &SqlType::Text, non_null = true),
        sqlite_column!("change_type", &SqlType::Text, non_null = true), // ADD, MOVE, DELETE
        sqlite_column!("record_id", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("title", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("triggered_by", &SqlType::Text, non_null = true),
        sqlite_column!("old_bin", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("old_bin_code", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("new_bin", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("new_bin_code", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("notes", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("reviewed", &SqlType::Integer, non_null = true, default_value = Some("0")),
    ],
    indices: &[
        ("idx_change_log_record", "record_id"),
        ("idx_change_log_reviewed", "reviewed"),
    ],
};

// =============================================================================
// Version 2 - Rebin runs
// =============================================================================

const CHANGE_LOG_TABLE_V2: Table = Table {
    name: "change_log",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("timestamp", &SqlType::Text, non_null = true),
        sqlite_column!("change_type", &SqlType::Text, non_null = true),
        sqlite_column!("record_id", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("title", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("triggered_by", &SqlType::Text, non_null = true),
        sqlite_column!("old_bin", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("old_bin_code", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("new_bin", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("new_bin_code", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("notes", &SqlType::Text, non_null = true, default_value = Some("''")),
        sqlite_column!("reviewed", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("run_id", &SqlType::Text), // NULL for deletions
    ],
    indices: &[
        ("idx_change_log_record", "record_id"),
        ("idx_change_log_reviewed", "reviewed"),
        ("idx_change_log_run", "run_id"),
    ],
};

const REBIN_RUNS_TABLE_V2: Table = Table {
    name: "rebin_runs",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true), // UUID
        sqlite_column!("started_at", &SqlType::Text, non_null = true),
        sqlite_column!("triggered_by", &SqlType::Text, non_null = true),
        sqlite_column!("records_total", &SqlType::Integer, non_null = true),
        sqlite_column!("added", &SqlType::Integer, non_null = true),
        sqlite_column!("moved", &SqlType::Integer, non_null = true),
        sqlite_column!("notes", &SqlType::Text, non_null = true, default_value = Some("''")),
    ],
    indices: &[],
};

fn migrate_v1_to_v2(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    conn.execute("ALTER TABLE change_log ADD COLUMN run_id TEXT", [])?;
    conn.execute("CREATE INDEX idx_change_log_run ON change_log(run_id)", [])?;
    REBIN_RUNS_TABLE_V2.create(conn)?;
    Ok(())
}

pub const INVENTORY_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        tables: &[RECORDS_TABLE_V1, CHANGE_LOG_TABLE_V1],
        migration: None,
    },
    VersionedSchema {
        version: 2,
        tables: &[RECORDS_TABLE_V1, CHANGE_LOG_TABLE_V2, REBIN_RUNS_TABLE_V2],
        migration: Some(migrate_v1_to_v2),
    },
];
