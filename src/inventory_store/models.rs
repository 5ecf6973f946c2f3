use serde::{Deserialize, Serialize};

/// Media type code of a standard LP, the default for new records.
pub const STANDARD_MEDIA_TYPE: i64 = 10;

/// A catalogued record and its current bin placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Master key, one uppercase letter followed by 4 digits (e.g. `A1111`).
    pub id: String,
    pub artist: String,
    pub title: String,
    pub genre_code: Option<i64>,
    pub media_type_code: Option<i64>,
    pub year: Option<i32>,
    pub special: bool,
    /// First letter of the article-stripped artist name.
    pub sort_bucket: Option<char>,
    /// `None` for override-routed records and records never placed.
    pub bin_number: Option<i64>,
    /// Override code or `"{genre:02}-{bin:02}-{bucket}"`; empty when unplaced.
    pub bin_code: String,
}

impl Record {
    /// The bin number as the change log stores it (0 when absent).
    pub fn bin_or_zero(&self) -> i64 {
        self.bin_number.unwrap_or(0)
    }
}

/// Fields of a record about to be created, before a master key is assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRecord {
    pub artist: String,
    pub title: String,
    pub genre_code: Option<i64>,
    pub media_type_code: i64,
    pub year: Option<i32>,
    pub special: bool,
}

impl NewRecord {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            genre_code: None,
            media_type_code: STANDARD_MEDIA_TYPE,
            year: None,
            special: false,
        }
    }

    pub fn with_genre(mut self, genre_code: i64) -> Self {
        self.genre_code = Some(genre_code);
        self
    }

    pub fn with_media_type(mut self, media_type_code: i64) -> Self {
        self.media_type_code = media_type_code;
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_special(mut self, special: bool) -> Self {
        self.special = special;
        self
    }

    /// Builds an unplaced record; bin fields are filled in by the next rebin.
    pub fn into_record(self, id: String) -> Record {
        Record {
            id,
            artist: self.artist,
            title: self.title,
            genre_code: self.genre_code,
            media_type_code: Some(self.media_type_code),
            year: self.year,
            special: self.special,
            sort_bucket: None,
            bin_number: None,
            bin_code: String::new(),
        }
    }
}

/// A partial edit of a record's descriptive fields; `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordEdit {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub genre_code: Option<i64>,
    /// 0 resets the record to the standard media type.
    pub media_type_code: Option<i64>,
    pub year: Option<i32>,
    pub special: Option<bool>,
}

impl RecordEdit {
    /// Merges the edit over `record`, producing the full set of new details.
    pub fn apply(&self, record: &Record) -> NewRecord {
        let media_type_code = match self.media_type_code.or(record.media_type_code) {
            None | Some(0) => STANDARD_MEDIA_TYPE,
            Some(code) => code,
        };
        NewRecord {
            artist: self.artist.clone().unwrap_or_else(|| record.artist.clone()),
            title: self.title.clone().unwrap_or_else(|| record.title.clone()),
            genre_code: self.genre_code.or(record.genre_code),
            media_type_code,
            year: self.year.or(record.year),
            special: self.special.unwrap_or(record.special),
        }
    }
}
