//! Reporting periods for user statistics.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// A calendar month, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing `ts`.
    pub fn of(ts: &Timestamp) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// Parse `YYYY-MM` (month `01`..`12`).
    pub fn parse(value: &str) -> Option<Self> {
        let (year, month) = value.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days(&self) -> u32 {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.map(|n| (n - self.first_day()).num_days() as u32)
            .unwrap_or(31)
    }

    /// First instant of the month, UTC.
    pub fn start(&self) -> Timestamp {
        Utc.from_utc_datetime(&self.first_day().and_hms_opt(0, 0, 0).unwrap_or_default())
    }

    /// Last millisecond of the month, UTC.
    pub fn end(&self) -> Timestamp {
        self.start() + Duration::days(self.days() as i64) - Duration::milliseconds(1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Window a statistic is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsPeriod {
    #[default]
    All,
    /// Current month to date.
    Month,
    /// The whole previous month.
    LastMonth,
    /// Current year to date.
    Year,
    /// One specific month.
    Specific(YearMonth),
}

/// Inclusive date bounds; `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl DateRange {
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn contains(&self, ts: &Timestamp) -> bool {
        self.start.map_or(true, |s| *ts >= s) && self.end.map_or(true, |e| *ts <= e)
    }
}

impl StatsPeriod {
    /// Parse `all`, `month`, `last_month`, `year`, or `YYYY-MM`.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "all" => Ok(Self::All),
            "month" => Ok(Self::Month),
            "last_month" => Ok(Self::LastMonth),
            "year" => Ok(Self::Year),
            other => YearMonth::parse(other).map(Self::Specific).ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid period '{other}'. Must be one of: all, month, last_month, year, YYYY-MM"
                ))
            }),
        }
    }

    /// Resolve the period into concrete bounds relative to `now`.
    pub fn date_range(&self, now: &Timestamp) -> DateRange {
        let current = YearMonth::of(now);
        match self {
            Self::All => DateRange::default(),
            Self::Month => DateRange {
                start: Some(current.start()),
                end: None,
            },
            Self::LastMonth => {
                let last = current.previous();
                DateRange {
                    start: Some(last.start()),
                    end: Some(last.end()),
                }
            }
            Self::Year => DateRange {
                start: YearMonth::new(now.year(), 1).map(|ym| ym.start()),
                end: None,
            },
            Self::Specific(ym) => DateRange {
                start: Some(ym.start()),
                end: Some(ym.end()),
            },
        }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Month => f.write_str("month"),
            Self::LastMonth => f.write_str("last_month"),
            Self::Year => f.write_str("year"),
            Self::Specific(ym) => write!(f, "{ym}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 15, 30, 0).unwrap()
    }

    #[test]
    fn parses_every_form() {
        assert_eq!(StatsPeriod::parse("all").unwrap(), StatsPeriod::All);
        assert_eq!(StatsPeriod::parse("last_month").unwrap(), StatsPeriod::LastMonth);
        assert_eq!(
            StatsPeriod::parse("2024-02").unwrap(),
            StatsPeriod::Specific(YearMonth { year: 2024, month: 2 })
        );
        assert!(StatsPeriod::parse("2024-13").is_err());
        assert!(StatsPeriod::parse("2024-2").is_err());
        assert!(StatsPeriod::parse("weekly").is_err());
    }

    #[test]
    fn display_matches_input() {
        for input in ["all", "month", "last_month", "year", "2023-11"] {
            assert_eq!(StatsPeriod::parse(input).unwrap().to_string(), input);
        }
    }

    #[test]
    fn specific_month_covers_whole_month() {
        let range = StatsPeriod::parse("2024-02").unwrap().date_range(&at(2025, 4, 7));
        assert_eq!(range.start, Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
        assert_eq!(
            range.end,
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap() + Duration::milliseconds(999))
        );
    }

    #[test]
    fn last_month_wraps_year() {
        let range = StatsPeriod::LastMonth.date_range(&at(2025, 1, 20));
        assert_eq!(range.start, Some(Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()));
        assert!(range.contains(&at(2024, 12, 31)));
        assert!(!range.contains(&at(2025, 1, 1)));
    }

    #[test]
    fn open_ended_periods() {
        let now = at(2025, 4, 7);
        let month = StatsPeriod::Month.date_range(&now);
        assert_eq!(month.start, Some(Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()));
        assert_eq!(month.end, None);

        let year = StatsPeriod::Year.date_range(&now);
        assert_eq!(year.start, Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
        assert!(!StatsPeriod::All.date_range(&now).is_bounded());
    }

    #[test]
    fn year_month_navigation() {
        let jan = YearMonth::parse("2025-01").unwrap();
        assert_eq!(jan.previous().to_string(), "2024-12");
        assert_eq!(YearMonth::parse("2024-02").unwrap().days(), 29);
        assert_eq!(YearMonth::of(&at(2025, 4, 7)).to_string(), "2025-04");
    }
}
