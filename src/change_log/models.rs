use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of bin change recorded in the change log.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Add,
    Move,
    Delete,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Add => "ADD",
            ChangeType::Move => "MOVE",
            ChangeType::Delete => "DELETE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADD" => Some(ChangeType::Add),
            "MOVE" => Some(ChangeType::Move),
            "DELETE" => Some(ChangeType::Delete),
            _ => None,
        }
    }
}

/// One immutable line of the audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    /// Row id, assigned by the store on insert (0 until then).
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub change_type: ChangeType,
    pub record_id: String,
    pub artist: String,
    pub title: String,
    pub year: Option<i32>,
    /// Opaque identifier of whoever caused the change.
    pub trigger: String,
    pub old_bin: i64,
    pub old_bin_code: String,
    pub new_bin: i64,
    pub new_bin_code: String,
    pub notes: String,
    /// Owned by the review workflow; always false on creation.
    pub reviewed: bool,
    /// The rebin pass that produced this entry (none for deletions).
    pub run_id: Option<String>,
}

impl ChangeLogEntry {
    pub fn new(change_type: ChangeType, record_id: impl Into<String>, trigger: &str) -> Self {
        Self {
            id: 0,
            timestamp: Utc::now(),
            change_type,
            record_id: record_id.into(),
            artist: String::new(),
            title: String::new(),
            year: None,
            trigger: trigger.to_string(),
            old_bin: 0,
            old_bin_code: String::new(),
            new_bin: 0,
            new_bin_code: String::new(),
            notes: String::new(),
            reviewed: false,
            run_id: None,
        }
    }

    pub fn with_record_details(mut self, artist: &str, title: &str, year: Option<i32>) -> Self {
        self.artist = artist.to_string();
        self.title = title.to_string();
        self.year = year;
        self
    }

    pub fn with_old_bin(mut self, bin: i64, bin_code: &str) -> Self {
        self.old_bin = bin;
        self.old_bin_code = bin_code.to_string();
        self
    }

    pub fn with_new_bin(mut self, bin: i64, bin_code: &str) -> Self {
        self.new_bin = bin;
        self.new_bin_code = bin_code.to_string();
        self
    }

    pub fn with_notes(mut self, notes: String) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_run(mut self, run_id: &str) -> Self {
        self.run_id = Some(run_id.to_string());
        self
    }
}

/// A single rebin pass and the totals it produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebinRun {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub trigger: String,
    pub records_total: usize,
    pub added: usize,
    pub moved: usize,
    pub notes: String,
}

/// Query over the change log, as used by the review workflow.
#[derive(Clone, Debug, Default)]
pub struct ChangeLogFilter {
    pub unreviewed_only: bool,
    pub change_type: Option<ChangeType>,
    pub record_id: Option<String>,
    pub limit: Option<usize>,
}
