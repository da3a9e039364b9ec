//! MyAnimeList export decoder.
//!
//! MAL exports are gzip-compressed XML documents with one `<anime>` element
//! per entry. `TV` entries become series, `Movie` entries become movies, and
//! every other type (OVA, ONA, Special, Music) is skipped.

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use super::{
    parse_export_date, read_capped, DecodedImport, ImportMovieDraft, ImportSeriesDraft,
    MAX_DECOMPRESSED_BYTES,
};
use crate::enums::{ImportProvider, UserItemStatus};
use crate::error::CoreError;

/// `series_type` value for episodic entries.
pub const SERIES_TYPE_TV: &str = "TV";

/// `series_type` value for feature films.
pub const SERIES_TYPE_MOVIE: &str = "Movie";

/// One `<anime>` element of a MAL export. Numeric fields are kept as text
/// because exports occasionally leave them blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MalAnime {
    pub series_animedb_id: String,
    pub series_title: String,
    pub series_type: String,
    #[serde(default)]
    pub series_episodes: Option<String>,
    #[serde(default)]
    pub my_watched_episodes: Option<String>,
    #[serde(default)]
    pub my_start_date: Option<String>,
    #[serde(default)]
    pub my_finish_date: Option<String>,
    #[serde(default)]
    pub my_status: String,
}

#[derive(Debug, Deserialize)]
struct MalExport {
    #[serde(rename = "anime", default)]
    anime: Vec<MalAnime>,
}

/// Map a MAL list status onto a collection status.
pub fn map_status(mal_status: &str) -> UserItemStatus {
    match mal_status.trim() {
        "Watching" | "On-Hold" => UserItemStatus::Watching,
        "Completed" => UserItemStatus::Watched,
        "Dropped" => UserItemStatus::Dropped,
        _ => UserItemStatus::Watchlist,
    }
}

fn invalid_export() -> CoreError {
    CoreError::Validation("Invalid MyAnimeList export".into())
}

fn parse_count(value: &Option<String>) -> Option<i32> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

fn parse_date(value: &Option<String>) -> Option<chrono::NaiveDate> {
    value.as_deref().and_then(parse_export_date)
}

/// Decode a gzip-compressed MAL export.
pub fn decode(bytes: &[u8]) -> Result<DecodedImport, CoreError> {
    decode_capped(bytes, MAX_DECOMPRESSED_BYTES)
}

fn decode_capped(bytes: &[u8], limit: u64) -> Result<DecodedImport, CoreError> {
    let xml = read_capped(GzDecoder::new(bytes), limit)
        .map_err(|_| invalid_export())?
        .ok_or_else(invalid_export)?;
    parse_xml(&xml)
}

/// Decode the XML document of a MAL export.
pub fn parse_xml(xml: &str) -> Result<DecodedImport, CoreError> {
    let export: MalExport = quick_xml::de::from_str(xml).map_err(|_| invalid_export())?;

    let mut movies = Vec::new();
    let mut series = Vec::new();

    for anime in export.anime {
        let metadata = serde_json::to_value(&anime)
            .map_err(|e| CoreError::Internal(format!("MAL metadata serialization: {e}")))?;
        let item_status = map_status(&anime.my_status);

        match anime.series_type.trim() {
            SERIES_TYPE_TV => series.push(ImportSeriesDraft {
                name: anime.series_title.trim().to_string(),
                start_date: parse_date(&anime.my_start_date),
                end_date: parse_date(&anime.my_finish_date),
                watched_episodes: parse_count(&anime.my_watched_episodes),
                series_episodes: parse_count(&anime.series_episodes),
                item_status,
                metadata,
            }),
            SERIES_TYPE_MOVIE => movies.push(ImportMovieDraft {
                name: anime.series_title.trim().to_string(),
                end_date: parse_date(&anime.my_finish_date),
                item_status,
                metadata,
            }),
            _ => {}
        }
    }

    Ok(DecodedImport {
        provider: ImportProvider::MyAnimeList,
        movies,
        series,
    })
}

/// Read the MAL anime id back out of a stored import row's metadata.
pub fn anime_id_from_metadata(metadata: &serde_json::Value) -> Option<i64> {
    match metadata.get("series_animedb_id")? {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::*;

    const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<myanimelist>
  <myinfo>
    <user_name>spike</user_name>
    <user_export_type>1</user_export_type>
  </myinfo>
  <anime>
    <series_animedb_id>1</series_animedb_id>
    <series_title><![CDATA[Cowboy Bebop]]></series_title>
    <series_type>TV</series_type>
    <series_episodes>26</series_episodes>
    <my_watched_episodes>26</my_watched_episodes>
    <my_start_date>2023-02-01</my_start_date>
    <my_finish_date>2023-03-15</my_finish_date>
    <my_status>Completed</my_status>
  </anime>
  <anime>
    <series_animedb_id>5</series_animedb_id>
    <series_title><![CDATA[Cowboy Bebop: Tengoku no Tobira]]></series_title>
    <series_type>Movie</series_type>
    <series_episodes>1</series_episodes>
    <my_watched_episodes>0</my_watched_episodes>
    <my_start_date>0000-00-00</my_start_date>
    <my_finish_date>0000-00-00</my_finish_date>
    <my_status>Plan to Watch</my_status>
  </anime>
  <anime>
    <series_animedb_id>4037</series_animedb_id>
    <series_title><![CDATA[Some OVA]]></series_title>
    <series_type>OVA</series_type>
    <series_episodes>2</series_episodes>
    <my_watched_episodes>1</my_watched_episodes>
    <my_start_date>0000-00-00</my_start_date>
    <my_finish_date>0000-00-00</my_finish_date>
    <my_status>Watching</my_status>
  </anime>
</myanimelist>"#;

    fn gzip(data: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn splits_series_and_movies() {
        let import = decode(&gzip(EXPORT)).unwrap();
        assert_eq!(import.provider, ImportProvider::MyAnimeList);
        assert_eq!(import.series.len(), 1);
        assert_eq!(import.movies.len(), 1);
        assert_eq!(import.items_count(), 2);

        let bebop = &import.series[0];
        assert_eq!(bebop.name, "Cowboy Bebop");
        assert_eq!(bebop.item_status, UserItemStatus::Watched);
        assert_eq!(bebop.start_date, NaiveDate::from_ymd_opt(2023, 2, 1));
        assert_eq!(bebop.end_date, NaiveDate::from_ymd_opt(2023, 3, 15));
        assert_eq!(bebop.watched_episodes, Some(26));
        assert_eq!(bebop.series_episodes, Some(26));
        assert_eq!(anime_id_from_metadata(&bebop.metadata), Some(1));

        let movie = &import.movies[0];
        assert_eq!(movie.item_status, UserItemStatus::Watchlist);
        assert_eq!(movie.end_date, None);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(map_status("Watching"), UserItemStatus::Watching);
        assert_eq!(map_status("On-Hold"), UserItemStatus::Watching);
        assert_eq!(map_status("Completed"), UserItemStatus::Watched);
        assert_eq!(map_status("Dropped"), UserItemStatus::Dropped);
        assert_eq!(map_status("Plan to Watch"), UserItemStatus::Watchlist);
        assert_eq!(map_status(""), UserItemStatus::Watchlist);
    }

    #[test]
    fn empty_list_decodes() {
        let import = parse_xml("<myanimelist><myinfo></myinfo></myanimelist>").unwrap();
        assert_eq!(import.items_count(), 0);
    }

    #[test]
    fn non_gzip_input_is_rejected() {
        assert_matches!(
            decode(EXPORT.as_bytes()),
            Err(CoreError::Validation(msg)) if msg == "Invalid MyAnimeList export"
        );
    }

    #[test]
    fn oversized_export_is_rejected() {
        let bytes = gzip(EXPORT);
        assert!(decode_capped(&bytes, EXPORT.len() as u64).is_ok());
        assert_matches!(
            decode_capped(&bytes, 64),
            Err(CoreError::Validation(msg)) if msg == "Invalid MyAnimeList export"
        );
    }

    #[test]
    fn export_without_titles_decodes_empty() {
        let import = decode(&gzip("<myanimelist></myanimelist>")).unwrap();
        assert_eq!(import.items_count(), 0);
    }
}
