//! Letterboxd export decoder.
//!
//! A Letterboxd export is a zip archive; only `watched.csv` is imported.
//! Every watched film becomes an import movie with status `WATCHED`.

use std::io::Cursor;

use serde_json::json;

use super::{
    parse_export_date, read_capped, DecodedImport, ImportMovieDraft, MAX_DECOMPRESSED_BYTES,
};
use crate::enums::{ImportProvider, UserItemStatus};
use crate::error::CoreError;

/// Archive entry holding the watched films.
pub const WATCHED_FILE: &str = "watched.csv";

/// Columns every `watched.csv` record must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Date", "Name", "Year", "Letterboxd URI"];

fn invalid_archive() -> CoreError {
    CoreError::Validation("Invalid Letterboxd archive".into())
}

fn invalid_structure() -> CoreError {
    CoreError::Validation("Invalid CSV structure in watched.csv".into())
}

/// Decode a Letterboxd zip export.
pub fn decode(bytes: &[u8]) -> Result<DecodedImport, CoreError> {
    decode_capped(bytes, MAX_DECOMPRESSED_BYTES)
}

fn decode_capped(bytes: &[u8], limit: u64) -> Result<DecodedImport, CoreError> {
    let content = read_watched_csv(bytes, limit)?;
    let movies = match content {
        Some(csv) => parse_watched(&csv)?,
        None => Vec::new(),
    };

    Ok(DecodedImport {
        provider: ImportProvider::Letterboxd,
        movies,
        series: Vec::new(),
    })
}

/// Extract `watched.csv` from the archive, wherever it sits in the tree.
fn read_watched_csv(bytes: &[u8], limit: u64) -> Result<Option<String>, CoreError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|_| invalid_archive())?;

    let entry_name = archive
        .file_names()
        .find(|name| name.rsplit('/').next() == Some(WATCHED_FILE))
        .map(str::to_owned);

    let Some(entry_name) = entry_name else {
        return Ok(None);
    };

    let file = archive.by_name(&entry_name).map_err(|_| invalid_archive())?;
    if file.size() > limit {
        return Err(invalid_archive());
    }
    let content = read_capped(file, limit)
        .map_err(|_| invalid_archive())?
        .ok_or_else(invalid_archive)?;
    Ok(Some(content))
}

/// Parse `watched.csv` content into import movies.
pub fn parse_watched(content: &str) -> Result<Vec<ImportMovieDraft>, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(|_| invalid_structure())?.clone();
    let positions: Vec<Option<usize>> = REQUIRED_COLUMNS
        .iter()
        .map(|col| headers.iter().position(|h| h == *col))
        .collect();

    let mut movies = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|_| invalid_structure())?;

        let mut values = [""; 4];
        for (slot, position) in values.iter_mut().zip(&positions) {
            *slot = position
                .and_then(|idx| record.get(idx))
                .ok_or_else(invalid_structure)?;
        }
        let [date, name, year, uri] = values;

        movies.push(ImportMovieDraft {
            name: name.to_string(),
            end_date: parse_export_date(date),
            item_status: UserItemStatus::Watched,
            metadata: json!({
                "Date": date,
                "Name": name,
                "Year": year,
                "Letterboxd URI": uri,
            }),
        });
    }

    Ok(movies)
}
