//! Pure aggregations behind the statistics endpoints.

use std::collections::HashMap;

use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};

use super::period::{StatsPeriod, YearMonth};
use crate::types::Timestamp;

/// Number of actors reported by [`cast_breakdown`].
pub const TOP_CAST_LIMIT: usize = 5;

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `count / total * 100`, or 0 when there is nothing to divide by.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Something watched at a point in time, with its runtime in minutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchPoint {
    pub at: Timestamp,
    pub runtime_minutes: f64,
}

/// Hours watched in one bucket. `month` is `YYYY-MM` for monthly buckets and
/// `YYYY-MM-DD` for daily buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoursBucket {
    pub month: String,
    pub hours: f64,
}

/// Sum runtimes (minutes) into hours.
pub fn total_hours(runtimes_minutes: impl IntoIterator<Item = f64>) -> f64 {
    runtimes_minutes.into_iter().sum::<f64>() / 60.0
}

/// Bucket watch points into hours for the chart shown next to a period.
///
/// `month`/`last_month` produce one bucket per day of that month, `year`
/// the twelve months of the current year, and everything else the twelve
/// months ending with the current one.
pub fn monthly_breakdown(
    period: &StatsPeriod,
    now: &Timestamp,
    points: &[WatchPoint],
) -> Vec<HoursBucket> {
    let current = YearMonth::of(now);

    let keys: Vec<String> = match period {
        StatsPeriod::Month | StatsPeriod::LastMonth => {
            let month = if *period == StatsPeriod::Month {
                current
            } else {
                current.previous()
            };
            (0..month.days())
                .map(|offset| {
                    (month.first_day() + Duration::days(offset as i64))
                        .format("%Y-%m-%d")
                        .to_string()
                })
                .collect()
        }
        StatsPeriod::Year => (1..=12)
            .filter_map(|m| YearMonth::new(now.year(), m))
            .map(|ym| ym.to_string())
            .collect(),
        _ => {
            let mut months = Vec::with_capacity(12);
            let mut ym = current;
            for _ in 0..12 {
                months.push(ym.to_string());
                ym = ym.previous();
            }
            months.reverse();
            months
        }
    };

    let daily = matches!(period, StatsPeriod::Month | StatsPeriod::LastMonth);
    let mut buckets: HashMap<&str, f64> = keys.iter().map(|k| (k.as_str(), 0.0)).collect();

    for point in points {
        let key = if daily {
            point.at.format("%Y-%m-%d").to_string()
        } else {
            YearMonth::of(&point.at).to_string()
        };
        if let Some(hours) = buckets.get_mut(key.as_str()) {
            *hours += point.runtime_minutes / 60.0;
        }
    }

    keys.iter()
        .map(|key| HoursBucket {
            month: key.clone(),
            hours: round1(buckets.get(key.as_str()).copied().unwrap_or(0.0)),
        })
        .collect()
}

/// Genres of one watched title.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleGenres {
    pub genres: Vec<String>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreShare {
    pub name: String,
    pub count: usize,
    pub percentage: f64,
    /// Poster of the first title seen with this genre.
    pub poster_path: Option<String>,
}

/// Count genres across titles, most frequent first. Ties keep first-seen
/// order.
pub fn genre_breakdown(titles: &[TitleGenres]) -> Vec<GenreShare> {
    let mut shares: Vec<GenreShare> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for title in titles {
        for genre in &title.genres {
            match index.get(genre.as_str()) {
                Some(&i) => {
                    shares[i].count += 1;
                    if shares[i].poster_path.is_none() {
                        shares[i].poster_path = title.poster_path.clone();
                    }
                }
                None => {
                    index.insert(genre.as_str(), shares.len());
                    shares.push(GenreShare {
                        name: genre.clone(),
                        count: 1,
                        percentage: 0.0,
                        poster_path: title.poster_path.clone(),
                    });
                }
            }
        }
    }

    for share in &mut shares {
        share.percentage = percentage(share.count, titles.len());
    }
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

/// A cast credit of one watched title.
#[derive(Debug, Clone, PartialEq)]
pub struct CastCredit {
    pub id: i64,
    pub name: String,
    pub character: String,
    pub known_for_department: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorShare {
    pub id: i64,
    pub name: String,
    pub count: usize,
    pub percentage: f64,
    pub profile_path: Option<String>,
}

/// Top actors across the watched titles.
///
/// Only acting credits count, and credits whose character contains
/// parentheses (voice, uncredited, archive footage) are skipped.
pub fn cast_breakdown(credits_per_title: &[Vec<CastCredit>]) -> Vec<ActorShare> {
    let total_titles = credits_per_title.len();
    let mut shares: Vec<ActorShare> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    let credits = credits_per_title.iter().flatten().filter(|c| {
        c.known_for_department == "Acting" && !c.character.contains(['(', ')'])
    });

    for credit in credits {
        match index.get(&credit.id) {
            Some(&i) => shares[i].count += 1,
            None => {
                index.insert(credit.id, shares.len());
                shares.push(ActorShare {
                    id: credit.id,
                    name: credit.name.clone(),
                    count: 1,
                    percentage: 0.0,
                    profile_path: credit.profile_path.clone(),
                });
            }
        }
    }

    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares.truncate(TOP_CAST_LIMIT);
    for share in &mut shares {
        share.percentage = percentage(share.count, total_titles);
    }
    shares
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 20, 0, 0).unwrap()
    }

    fn point(y: i32, m: u32, d: u32, minutes: f64) -> WatchPoint {
        WatchPoint {
            at: at(y, m, d),
            runtime_minutes: minutes,
        }
    }

    #[test]
    fn total_hours_sums_minutes() {
        assert_eq!(total_hours([120.0, 45.0, 15.0]), 3.0);
        assert_eq!(total_hours(Vec::<f64>::new()), 0.0);
    }

    #[test]
    fn rounding_and_percentages() {
        assert_eq!(round1(1.25), 1.3);
        assert_eq!(round1(2.0 / 3.0), 0.7);
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(3, 0), 0.0);
    }

    #[test]
    fn trailing_twelve_months_for_all() {
        let now = at(2025, 4, 7);
        let points = [
            point(2025, 4, 1, 90.0),
            point(2025, 4, 2, 30.0),
            point(2024, 5, 10, 60.0),
            point(2024, 4, 30, 600.0),
        ];
        let buckets = monthly_breakdown(&StatsPeriod::All, &now, &points);
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets.first().unwrap().month, "2024-05");
        assert_eq!(buckets.first().unwrap().hours, 1.0);
        assert_eq!(buckets.last().unwrap().month, "2025-04");
        assert_eq!(buckets.last().unwrap().hours, 2.0);
        let total: f64 = buckets.iter().map(|b| b.hours).sum();
        assert_eq!(total, 3.0, "April 2024 is outside the window");
    }

    #[test]
    fn calendar_months_for_year() {
        let buckets = monthly_breakdown(&StatsPeriod::Year, &at(2025, 4, 7), &[point(2025, 2, 3, 45.0)]);
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].month, "2025-01");
        assert_eq!(buckets[1].hours, 0.8);
        assert_eq!(buckets[11].month, "2025-12");
    }

    #[test]
    fn daily_buckets_for_last_month() {
        let buckets = monthly_breakdown(
            &StatsPeriod::LastMonth,
            &at(2025, 3, 15),
            &[point(2025, 2, 28, 120.0), point(2025, 3, 1, 60.0)],
        );
        assert_eq!(buckets.len(), 28);
        assert_eq!(buckets[0].month, "2025-02-01");
        assert_eq!(buckets[27].month, "2025-02-28");
        assert_eq!(buckets[27].hours, 2.0);
    }

    #[test]
    fn genres_sorted_with_first_poster() {
        let titles = vec![
            TitleGenres {
                genres: vec!["Drama".into(), "Crime".into()],
                poster_path: Some("/heat.jpg".into()),
            },
            TitleGenres {
                genres: vec!["Crime".into()],
                poster_path: Some("/zodiac.jpg".into()),
            },
            TitleGenres {
                genres: vec!["Comedy".into()],
                poster_path: None,
            },
            TitleGenres {
                genres: vec![],
                poster_path: None,
            },
        ];
        let genres = genre_breakdown(&titles);
        assert_eq!(genres[0].name, "Crime");
        assert_eq!(genres[0].count, 2);
        assert_eq!(genres[0].percentage, 50.0);
        assert_eq!(genres[0].poster_path.as_deref(), Some("/heat.jpg"));
        assert_eq!(genres[1].name, "Drama");
        assert_eq!(genres[2].name, "Comedy");
        assert_eq!(genres[2].poster_path, None);
    }

    fn credit(id: i64, character: &str, department: &str) -> CastCredit {
        CastCredit {
            id,
            name: format!("Actor {id}"),
            character: character.into(),
            known_for_department: department.into(),
            profile_path: None,
        }
    }

    #[test]
    fn cast_filters_and_ranks() {
        let titles = vec![
            vec![
                credit(1, "Neil McCauley", "Acting"),
                credit(2, "Vincent Hanna", "Acting"),
                credit(9, "Himself (archive footage)", "Acting"),
            ],
            vec![credit(1, "Travis", "Acting"), credit(3, "Director", "Directing")],
        ];
        let cast = cast_breakdown(&titles);
        assert_eq!(cast.len(), 2);
        assert_eq!(cast[0].id, 1);
        assert_eq!(cast[0].count, 2);
        assert_eq!(cast[0].percentage, 100.0);
        assert_eq!(cast[1].id, 2);
        assert_eq!(cast[1].percentage, 50.0);
    }

    #[test]
    fn cast_keeps_top_five() {
        let titles = vec![(1..=8).map(|id| credit(id, "Someone", "Acting")).collect()];
        assert_eq!(cast_breakdown(&titles).len(), TOP_CAST_LIMIT);
    }
}
