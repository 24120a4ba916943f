//! Session statistics.
//!
//! The pure functions here compute aggregates over a slice of records; they
//! back the default [`SessionLog`] query methods. [`Aggregator`] is the
//! read-side component the presentation layer talks to: it resolves "today"
//! from a [`Clock`] and re-reads the log on every call, so results always
//! reflect the latest persisted state.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::clock::Clock;
use crate::store::SessionLog;
use crate::types::{Category, SessionRecord, UserId};

/// Number of days covered by the trend view, today included.
pub const TREND_DAYS: usize = 7;

/// Focus time summed over one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_seconds: u64,
}

/// Focus time summed over one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total_seconds: u64,
}

impl CategoryTotal {
    /// Percentage of `grand_total` this category accounts for.
    #[allow(clippy::cast_precision_loss)]
    pub fn share_percent(&self, grand_total: u64) -> f64 {
        if grand_total == 0 {
            return 0.0;
        }
        self.total_seconds as f64 * 100.0 / grand_total as f64
    }
}

/// All five statistics for one owner, computed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub today: NaiveDate,
    pub today_total_seconds: u64,
    pub all_time_total_seconds: u64,
    pub total_distractions: u64,
    pub last_7_days: Vec<DailyTotal>,
    pub category_totals: Vec<CategoryTotal>,
}

pub fn total_seconds_on(records: &[SessionRecord], date: NaiveDate) -> u64 {
    records
        .iter()
        .filter(|record| record.date == date)
        .map(|record| u64::from(record.duration_seconds))
        .sum()
}

pub fn total_seconds(records: &[SessionRecord]) -> u64 {
    records
        .iter()
        .map(|record| u64::from(record.duration_seconds))
        .sum()
}

pub fn total_distractions(records: &[SessionRecord]) -> u64 {
    records
        .iter()
        .map(|record| u64::from(record.distraction_count))
        .sum()
}

pub fn daily_totals(records: &[SessionRecord], from: NaiveDate, to: NaiveDate) -> Vec<DailyTotal> {
    let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in records {
        if record.date >= from && record.date <= to {
            *by_date.entry(record.date).or_default() += u64::from(record.duration_seconds);
        }
    }
    by_date
        .into_iter()
        .map(|(date, total_seconds)| DailyTotal {
            date,
            total_seconds,
        })
        .collect()
}

pub fn category_totals(records: &[SessionRecord]) -> Vec<CategoryTotal> {
    let mut by_category: BTreeMap<Category, u64> = BTreeMap::new();
    for record in records {
        *by_category.entry(record.category).or_default() += u64::from(record.duration_seconds);
    }
    by_category
        .into_iter()
        .map(|(category, total_seconds)| CategoryTotal {
            category,
            total_seconds,
        })
        .collect()
}

/// First day of the trend window ending at `today`.
pub fn trend_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(6)
}

/// Expands sparse per-day totals into one entry per day of the trend window.
///
/// Days without records become zero.
pub fn fill_week(days: &[DailyTotal], today: NaiveDate) -> [DailyTotal; TREND_DAYS] {
    let start = trend_start(today);
    std::array::from_fn(|offset| {
        // offset < 7, the cast cannot truncate
        #[allow(clippy::cast_possible_wrap)]
        let date = start + Duration::days(offset as i64);
        let total_seconds = days
            .iter()
            .find(|day| day.date == date)
            .map_or(0, |day| day.total_seconds);
        DailyTotal {
            date,
            total_seconds,
        }
    })
}

/// Read-only statistics over a [`SessionLog`].
pub struct Aggregator<'a, L: ?Sized, C> {
    log: &'a L,
    clock: C,
}

impl<'a, L: SessionLog + ?Sized, C: Clock> Aggregator<'a, L, C> {
    pub const fn new(log: &'a L, clock: C) -> Self {
        Self { log, clock }
    }

    pub fn today_total(&self, owner: &UserId) -> Result<u64, L::Error> {
        self.log.total_seconds_on(owner, self.clock.today())
    }

    pub fn all_time_total(&self, owner: &UserId) -> Result<u64, L::Error> {
        self.log.total_seconds(owner)
    }

    pub fn total_distractions(&self, owner: &UserId) -> Result<u64, L::Error> {
        self.log.total_distractions(owner)
    }

    /// Dates with records in `[today - 6 days, today]`, ascending.
    ///
    /// Dates without records are not emitted; see [`fill_week`].
    pub fn last_7_days(&self, owner: &UserId) -> Result<Vec<DailyTotal>, L::Error> {
        let today = self.clock.today();
        self.log.daily_totals(owner, trend_start(today), today)
    }

    pub fn category_totals(&self, owner: &UserId) -> Result<Vec<CategoryTotal>, L::Error> {
        self.log.category_totals(owner)
    }

    /// Computes every statistic against a single reading of the clock.
    pub fn snapshot(&self, owner: &UserId) -> Result<StatsSnapshot, L::Error> {
        let today = self.clock.today();
        Ok(StatsSnapshot {
            today,
            today_total_seconds: self.log.total_seconds_on(owner, today)?,
            all_time_total_seconds: self.log.total_seconds(owner)?,
            total_distractions: self.log.total_distractions(owner)?,
            last_7_days: self.log.daily_totals(owner, trend_start(today), today)?,
            category_totals: self.log.category_totals(owner)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryLog;
    use crate::types::{NewSessionRecord, SessionSummary};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const TODAY: (i32, u32, u32) = (2025, 3, 10);

    fn today() -> NaiveDate {
        date(TODAY.0, TODAY.1, TODAY.2)
    }

    fn add(
        log: &mut MemoryLog,
        owner: &UserId,
        on: NaiveDate,
        category: Category,
        seconds: u32,
        distractions: u32,
    ) {
        log.insert_session_record(&NewSessionRecord {
            owner_id: owner.clone(),
            date: on,
            summary: SessionSummary {
                category,
                duration_seconds: seconds,
                distraction_count: distractions,
            },
        })
        .unwrap();
    }

    #[test]
    fn empty_owner_yields_zero_and_empty() {
        let log = MemoryLog::new();
        let owner = UserId::new("u").unwrap();
        let stats = Aggregator::new(&log, FixedClock(today()));

        assert_eq!(stats.today_total(&owner).unwrap(), 0);
        assert_eq!(stats.all_time_total(&owner).unwrap(), 0);
        assert_eq!(stats.total_distractions(&owner).unwrap(), 0);
        assert!(stats.last_7_days(&owner).unwrap().is_empty());
        assert!(stats.category_totals(&owner).unwrap().is_empty());
    }

    #[test]
    fn single_session_roundtrips_into_totals() {
        let mut log = MemoryLog::new();
        let owner = UserId::new("u").unwrap();
        add(&mut log, &owner, today(), Category::Coding, 1500, 2);
        let stats = Aggregator::new(&log, FixedClock(today()));

        assert_eq!(stats.all_time_total(&owner).unwrap(), 1500);
        assert_eq!(stats.total_distractions(&owner).unwrap(), 2);
        assert!(
            stats
                .category_totals(&owner)
                .unwrap()
                .contains(&CategoryTotal {
                    category: Category::Coding,
                    total_seconds: 1500,
                })
        );
    }

    #[test]
    fn same_day_sessions_sum_per_category_and_day() {
        let mut log = MemoryLog::new();
        let owner = UserId::new("u").unwrap();
        add(&mut log, &owner, today(), Category::Coding, 600, 0);
        add(&mut log, &owner, today(), Category::Reading, 300, 1);
        let stats = Aggregator::new(&log, FixedClock(today()));

        assert_eq!(stats.today_total(&owner).unwrap(), 900);
        assert_eq!(
            stats.category_totals(&owner).unwrap(),
            vec![
                CategoryTotal {
                    category: Category::Coding,
                    total_seconds: 600,
                },
                CategoryTotal {
                    category: Category::Reading,
                    total_seconds: 300,
                },
            ]
        );
    }

    #[test]
    fn last_7_days_is_inclusive_sparse_and_ascending() {
        let mut log = MemoryLog::new();
        let owner = UserId::new("u").unwrap();
        add(&mut log, &owner, date(2025, 3, 3), Category::Study, 100, 0); // 7 days ago: excluded
        add(&mut log, &owner, date(2025, 3, 4), Category::Study, 200, 0); // window start
        add(&mut log, &owner, date(2025, 3, 8), Category::Study, 50, 0);
        add(&mut log, &owner, date(2025, 3, 8), Category::Coding, 25, 0);
        add(&mut log, &owner, today(), Category::Study, 400, 0);
        add(&mut log, &owner, date(2025, 3, 11), Category::Study, 999, 0); // future: excluded
        let stats = Aggregator::new(&log, FixedClock(today()));

        assert_eq!(
            stats.last_7_days(&owner).unwrap(),
            vec![
                DailyTotal {
                    date: date(2025, 3, 4),
                    total_seconds: 200,
                },
                DailyTotal {
                    date: date(2025, 3, 8),
                    total_seconds: 75,
                },
                DailyTotal {
                    date: today(),
                    total_seconds: 400,
                },
            ]
        );
    }

    #[test]
    fn today_total_ignores_other_days() {
        let mut log = MemoryLog::new();
        let owner = UserId::new("u").unwrap();
        add(&mut log, &owner, date(2025, 3, 9), Category::Study, 300, 0);
        add(&mut log, &owner, today(), Category::Study, 120, 0);
        let stats = Aggregator::new(&log, FixedClock(today()));

        assert_eq!(stats.today_total(&owner).unwrap(), 120);
        assert_eq!(stats.all_time_total(&owner).unwrap(), 420);
    }

    #[test]
    fn owners_are_isolated() {
        let mut log = MemoryLog::new();
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();
        add(&mut log, &alice, today(), Category::Project, 900, 3);
        let stats = Aggregator::new(&log, FixedClock(today()));

        let snapshot = stats.snapshot(&bob).unwrap();
        assert_eq!(snapshot.today_total_seconds, 0);
        assert_eq!(snapshot.all_time_total_seconds, 0);
        assert_eq!(snapshot.total_distractions, 0);
        assert!(snapshot.last_7_days.is_empty());
        assert!(snapshot.category_totals.is_empty());
    }

    #[test]
    fn repeated_queries_are_identical() {
        let mut log = MemoryLog::new();
        let owner = UserId::new("u").unwrap();
        add(&mut log, &owner, today(), Category::Study, 300, 1);
        add(&mut log, &owner, date(2025, 3, 6), Category::Reading, 600, 0);
        let stats = Aggregator::new(&log, FixedClock(today()));

        assert_eq!(stats.snapshot(&owner).unwrap(), stats.snapshot(&owner).unwrap());
    }

    #[test]
    fn fill_week_interpolates_missing_days() {
        let days = [
            DailyTotal {
                date: date(2025, 3, 5),
                total_seconds: 60,
            },
            DailyTotal {
                date: today(),
                total_seconds: 120,
            },
        ];
        let week = fill_week(&days, today());

        assert_eq!(week[0].date, date(2025, 3, 4));
        assert_eq!(week[6].date, today());
        let totals: Vec<_> = week.iter().map(|d| d.total_seconds).collect();
        assert_eq!(totals, vec![0, 60, 0, 0, 0, 0, 120]);
    }

    #[test]
    fn share_percent_handles_zero_total() {
        let total = CategoryTotal {
            category: Category::Study,
            total_seconds: 30,
        };
        assert!((total.share_percent(120) - 25.0).abs() < f64::EPSILON);
        assert!(total.share_percent(0).abs() < f64::EPSILON);
    }
}
