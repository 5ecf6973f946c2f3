//! Turning raw import cells into new records.

use serde::Serialize;
use tracing::debug;

use crate::inventory_store::{NewRecord, STANDARD_MEDIA_TYPE};

/// One data row as read from the input, cells trimmed, absent columns `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportRow {
    /// 1-based data row number, for diagnostics.
    pub line: usize,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub media_type: Option<String>,
    pub year: Option<String>,
    pub special: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub rows_seen: usize,
    pub imported: usize,
    pub skipped: usize,
}

/// Integer cell, accepting integers stored as floats (`"5.0"`). Anything
/// else is absent.
pub fn parse_int(cell: Option<&str>) -> Option<i64> {
    let cell = cell?.trim();
    if cell.is_empty() {
        return None;
    }
    if let Ok(value) = cell.parse::<i64>() {
        return Some(value);
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() < i64::MAX as f64 => Some(value.trunc() as i64),
        _ => None,
    }
}

pub fn parse_special(cell: Option<&str>) -> bool {
    matches!(
        cell.map(|c| c.trim().to_ascii_lowercase()).as_deref(),
        Some("yes" | "y" | "true" | "-1" | "1")
    )
}

/// Media type code, with absent, unparsable and zero all meaning standard.
pub fn media_type_or_standard(cell: Option<&str>) -> i64 {
    match parse_int(cell) {
        None | Some(0) => STANDARD_MEDIA_TYPE,
        Some(code) => code,
    }
}

fn non_blank(cell: &Option<String>) -> Option<&str> {
    cell.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ImportRow {
    /// The record this row describes, or `None` when artist or title is blank.
    pub fn prepare(&self) -> Option<NewRecord> {
        let (artist, title) = match (non_blank(&self.artist), non_blank(&self.title)) {
            (Some(artist), Some(title)) => (artist, title),
            _ => {
                debug!("Skipping row {}: blank artist or title", self.line);
                return None;
            }
        };

        let mut record = NewRecord::new(artist, title)
            .with_media_type(media_type_or_standard(self.media_type.as_deref()))
            .with_special(parse_special(self.special.as_deref()));
        if let Some(genre) = parse_int(self.genre.as_deref()) {
            record = record.with_genre(genre);
        }
        if let Some(year) = parse_int(self.year.as_deref()).and_then(|y| i32::try_from(y).ok()) {
            record = record.with_year(year);
        }
        Some(record)
    }
}

/// Prepares every row, counting what was kept and what was skipped.
pub fn prepare_rows(rows: &[ImportRow]) -> (Vec<NewRecord>, ImportStats) {
    let mut stats = ImportStats::default();
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        stats.rows_seen += 1;
        match row.prepare() {
            Some(record) => {
                records.push(record);
                stats.imported += 1;
            }
            None => stats.skipped += 1,
        }
    }
    (records, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(artist: &str, title: &str) -> ImportRow {
        ImportRow {
            line: 1,
            artist: Some(artist.to_string()),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn parses_integers_and_float_stored_integers() {
        assert_eq!(parse_int(Some("5")), Some(5));
        assert_eq!(parse_int(Some(" 12 ")), Some(12));
        assert_eq!(parse_int(Some("5.0")), Some(5));
        assert_eq!(parse_int(Some("1977.0")), Some(1977));
        assert_eq!(parse_int(Some("")), None);
        assert_eq!(parse_int(Some("n/a")), None);
        assert_eq!(parse_int(Some("NaN")), None);
        assert_eq!(parse_int(None), None);
    }

    #[test]
    fn special_accepts_truthy_spellings() {
        for truthy in ["yes", "Y", "TRUE", "-1", "1", " yes "] {
            assert!(parse_special(Some(truthy)), "{truthy}");
        }
        for falsy in ["no", "0", "", "maybe", "2"] {
            assert!(!parse_special(Some(falsy)), "{falsy}");
        }
        assert!(!parse_special(None));
    }

    #[test]
    fn media_type_defaults_to_standard() {
        assert_eq!(media_type_or_standard(None), STANDARD_MEDIA_TYPE);
        assert_eq!(media_type_or_standard(Some("")), STANDARD_MEDIA_TYPE);
        assert_eq!(media_type_or_standard(Some("0")), STANDARD_MEDIA_TYPE);
        assert_eq!(media_type_or_standard(Some("x")), STANDARD_MEDIA_TYPE);
        assert_eq!(media_type_or_standard(Some("17")), 17);
        assert_eq!(media_type_or_standard(Some("11.0")), 11);
    }

    #[test]
    fn prepares_full_row() {
        let full = ImportRow {
            genre: Some("5".to_string()),
            media_type: Some("10".to_string()),
            year: Some("1973.0".to_string()),
            special: Some("y".to_string()),
            ..row(" The Who ", "Quadrophenia")
        };

        let record = full.prepare().unwrap();

        assert_eq!(record.artist, "The Who");
        assert_eq!(record.title, "Quadrophenia");
        assert_eq!(record.genre_code, Some(5));
        assert_eq!(record.media_type_code, 10);
        assert_eq!(record.year, Some(1973));
        assert!(record.special);
    }

    #[test]
    fn missing_optional_cells_use_defaults() {
        let record = row("Queen", "Jazz").prepare().unwrap();

        assert_eq!(record.genre_code, None);
        assert_eq!(record.media_type_code, STANDARD_MEDIA_TYPE);
        assert_eq!(record.year, None);
        assert!(!record.special);
    }

    #[test]
    fn blank_artist_or_title_is_skipped() {
        assert!(row("", "Jazz").prepare().is_none());
        assert!(row("Queen", "   ").prepare().is_none());
        assert!(ImportRow::default().prepare().is_none());
    }

    #[test]
    fn prepare_rows_counts() {
        let rows = vec![row("Queen", "Jazz"), row("", "Nothing"), row("The Who", "Tommy")];

        let (records, stats) = prepare_rows(&rows);

        assert_eq!(records.len(), 2);
        assert_eq!(
            stats,
            ImportStats {
                rows_seen: 3,
                imported: 2,
                skipped: 1
            }
        );
        assert_eq!(records[1].artist, "The Who");
    }
}
