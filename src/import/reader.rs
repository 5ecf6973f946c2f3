//! Header-driven CSV reading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ByteRecord, ReaderBuilder, Trim};

use super::row::ImportRow;
use crate::error::InventoryError;

const ARTIST_HEADERS: &[&str] = &["Artist", "artist", "ArtistName"];
const TITLE_HEADERS: &[&str] = &["AlbumTitle", "Title", "album_title"];
const GENRE_HEADERS: &[&str] = &["SortKey2", "sortkey2", "Genre", "genre"];
const MEDIA_TYPE_HEADERS: &[&str] = &["SortKey3", "sortkey3", "MediaType", "media_type"];
const YEAR_HEADERS: &[&str] = &["Year", "ReleaseYear", "release_year"];
const SPECIAL_HEADERS: &[&str] = &["Special", "special"];

/// Column positions resolved from the header row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    artist: usize,
    title: usize,
    genre: Option<usize>,
    media_type: Option<usize>,
    year: Option<usize>,
    special: Option<usize>,
}

/// Cells are decoded leniently: bytes that are not UTF-8 (Latin-1 exports)
/// become U+FFFD instead of failing the whole import.
fn decode_cell(cell: &[u8]) -> String {
    String::from_utf8_lossy(cell).into_owned()
}

fn first_present(headers: &[String], names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|header| header == name))
}

impl ColumnMap {
    /// Fails with [`InventoryError::MissingColumns`] unless both an artist
    /// and a title column are present.
    pub fn from_headers(headers: &ByteRecord) -> Result<Self, InventoryError> {
        let headers: Vec<String> = headers
            .iter()
            .map(|h| decode_cell(h).trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let artist = first_present(&headers, ARTIST_HEADERS);
        let title = first_present(&headers, TITLE_HEADERS);
        match (artist, title) {
            (Some(artist), Some(title)) => Ok(Self {
                artist,
                title,
                genre: first_present(&headers, GENRE_HEADERS),
                media_type: first_present(&headers, MEDIA_TYPE_HEADERS),
                year: first_present(&headers, YEAR_HEADERS),
                special: first_present(&headers, SPECIAL_HEADERS),
            }),
            _ => {
                let mut missing = Vec::new();
                if artist.is_none() {
                    missing.push(ARTIST_HEADERS[0].to_string());
                }
                if title.is_none() {
                    missing.push(TITLE_HEADERS[0].to_string());
                }
                Err(InventoryError::MissingColumns {
                    missing,
                    found: headers.into_iter().filter(|h| !h.is_empty()).collect(),
                })
            }
        }
    }

    fn row(&self, line: usize, record: &ByteRecord) -> ImportRow {
        let cell = |index: Option<usize>| index.and_then(|i| record.get(i)).map(decode_cell);
        ImportRow {
            line,
            artist: cell(Some(self.artist)),
            title: cell(Some(self.title)),
            genre: cell(self.genre),
            media_type: cell(self.media_type),
            year: cell(self.year),
            special: cell(self.special),
        }
    }
}

/// Reads up to `limit` data rows (all when `None`) from CSV input with a
/// header row.
pub fn read_rows<R: Read>(input: R, limit: Option<usize>) -> Result<Vec<ImportRow>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let columns =
        ColumnMap::from_headers(reader.byte_headers().context("Failed to read CSV header")?)?;

    let mut rows = Vec::new();
    for (index, record) in reader
        .byte_records()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
    {
        let line = index + 1;
        let record = record.with_context(|| format!("Failed to read CSV row {}", line))?;
        rows.push(columns.row(line, &record));
    }
    Ok(rows)
}

pub fn read_rows_from_path(path: &Path, limit: Option<usize>) -> Result<Vec<ImportRow>> {
    let file = File::open(path).with_context(|| format!("Failed to open import file {:?}", path))?;
    read_rows(file, limit).with_context(|| format!("Failed to import {:?}", path))
}
