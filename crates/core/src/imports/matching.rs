//! Choosing a TMDB title for an imported entry.
//!
//! The worker searches TMDB by name and narrows the results here. A single
//! result is taken as is; otherwise a provider hint must single out exactly
//! one candidate or the item fails.

use chrono::NaiveDate;

use crate::types::TmdbId;

/// A TMDB search result reduced to what matching needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TmdbCandidate {
    pub id: TmdbId,
    /// `release_date` for movies, `first_air_date` for TV, as `YYYY-MM-DD`.
    pub release_date: Option<String>,
}

/// Provider-specific evidence used to disambiguate several candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchHint {
    /// Release year from a Letterboxd record.
    ReleaseYear(i32),
    /// Exact start date of an anime, from the MyAnimeList API.
    ReleaseDate(NaiveDate),
    None,
}

impl TmdbCandidate {
    fn year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }

    fn date(&self) -> Option<NaiveDate> {
        self.release_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }
}

/// Pick the TMDB id for an imported entry, or `None` when the evidence is
/// missing or ambiguous.
pub fn select_tmdb_match(candidates: &[TmdbCandidate], hint: &MatchHint) -> Option<TmdbId> {
    match candidates {
        [] => return None,
        [only] => return Some(only.id),
        _ => {}
    }

    let mut matched = candidates.iter().filter(|c| match hint {
        MatchHint::ReleaseYear(year) => c.year() == Some(*year),
        MatchHint::ReleaseDate(date) => c.date() == Some(*date),
        MatchHint::None => false,
    });

    match (matched.next(), matched.next()) {
        (Some(candidate), None) => Some(candidate.id),
        _ => None,
    }
}

/// Build the hint for a Letterboxd record from its stored metadata.
pub fn letterboxd_hint(metadata: &serde_json::Value) -> MatchHint {
    metadata
        .get("Year")
        .and_then(|y| match y {
            serde_json::Value::String(s) => s.trim().parse().ok(),
            serde_json::Value::Number(n) => n.as_i64().map(|n| n as i32),
            _ => None,
        })
        .map(MatchHint::ReleaseYear)
        .unwrap_or(MatchHint::None)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn candidate(id: TmdbId, date: &str) -> TmdbCandidate {
        TmdbCandidate {
            id,
            release_date: (!date.is_empty()).then(|| date.to_string()),
        }
    }

    #[test]
    fn no_candidates_is_no_match() {
        assert_eq!(select_tmdb_match(&[], &MatchHint::ReleaseYear(1995)), None);
    }

    #[test]
    fn single_candidate_wins_without_evidence() {
        let only = [candidate(949, "")];
        assert_eq!(select_tmdb_match(&only, &MatchHint::None), Some(949));
    }

    #[test]
    fn year_disambiguates() {
        let results = [
            candidate(949, "1995-12-15"),
            candidate(11_111, "1972-01-01"),
            candidate(22_222, ""),
        ];
        assert_eq!(
            select_tmdb_match(&results, &MatchHint::ReleaseYear(1995)),
            Some(949)
        );
    }

    #[test]
    fn ambiguous_year_fails() {
        let results = [candidate(1, "2001-01-01"), candidate(2, "2001-06-01")];
        assert_eq!(select_tmdb_match(&results, &MatchHint::ReleaseYear(2001)), None);
    }

    #[test]
    fn exact_date_disambiguates() {
        let results = [candidate(30_991, "1998-04-03"), candidate(42, "1998-10-24")];
        let hint = MatchHint::ReleaseDate(NaiveDate::from_ymd_opt(1998, 4, 3).unwrap());
        assert_eq!(select_tmdb_match(&results, &hint), Some(30_991));
    }

    #[test]
    fn several_candidates_without_hint_fail() {
        let results = [candidate(1, "2001-01-01"), candidate(2, "2002-01-01")];
        assert_eq!(select_tmdb_match(&results, &MatchHint::None), None);
    }

    #[test]
    fn letterboxd_year_hint() {
        assert_eq!(
            letterboxd_hint(&json!({ "Year": "1984" })),
            MatchHint::ReleaseYear(1984)
        );
        assert_eq!(letterboxd_hint(&json!({ "Year": "" })), MatchHint::None);
        assert_eq!(letterboxd_hint(&json!({})), MatchHint::None);
    }
}
