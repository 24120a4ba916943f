//! The session log store contract.
//!
//! [`SessionLog`] is the seam between the timer/statistics logic and storage.
//! Only the three record operations are required; the aggregate queries have
//! default implementations that scan [`SessionLog::list_records_for_owner`],
//! so a backend only overrides them when it can answer more cheaply (the
//! SQLite store pushes them down to `SUM`/`GROUP BY`).

use std::convert::Infallible;

use chrono::NaiveDate;

use crate::stats::{self, CategoryTotal, DailyTotal};
use crate::types::{NewSessionRecord, SessionId, SessionRecord, UserId};

/// Append/query access to persisted session records.
pub trait SessionLog {
    /// Store failure. Distinct from "no data", which is always `Ok`.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Appends one record and returns its stored form.
    fn insert_session_record(
        &mut self,
        record: &NewSessionRecord,
    ) -> Result<SessionRecord, Self::Error>;

    /// Lists all records of one owner, newest date first.
    fn list_records_for_owner(&self, owner: &UserId) -> Result<Vec<SessionRecord>, Self::Error>;

    /// Deletes every record of one owner, returning how many were removed.
    fn delete_all_records_for_owner(&mut self, owner: &UserId) -> Result<usize, Self::Error>;

    /// Sum of durations on `date`.
    fn total_seconds_on(&self, owner: &UserId, date: NaiveDate) -> Result<u64, Self::Error> {
        Ok(stats::total_seconds_on(
            &self.list_records_for_owner(owner)?,
            date,
        ))
    }

    /// Sum of all durations.
    fn total_seconds(&self, owner: &UserId) -> Result<u64, Self::Error> {
        Ok(stats::total_seconds(&self.list_records_for_owner(owner)?))
    }

    /// Sum of all distraction counts.
    fn total_distractions(&self, owner: &UserId) -> Result<u64, Self::Error> {
        Ok(stats::total_distractions(
            &self.list_records_for_owner(owner)?,
        ))
    }

    /// Per-date totals within the inclusive range, ascending, empty dates omitted.
    fn daily_totals(
        &self,
        owner: &UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyTotal>, Self::Error> {
        Ok(stats::daily_totals(
            &self.list_records_for_owner(owner)?,
            from,
            to,
        ))
    }

    /// Per-category totals, sorted by category.
    fn category_totals(&self, owner: &UserId) -> Result<Vec<CategoryTotal>, Self::Error> {
        Ok(stats::category_totals(&self.list_records_for_owner(owner)?))
    }
}

/// A session log held in memory.
///
/// Used for tests and as a scratch store; it never fails.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    records: Vec<SessionRecord>,
}

impl MemoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all owners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SessionLog for MemoryLog {
    type Error = Infallible;

    fn insert_session_record(
        &mut self,
        record: &NewSessionRecord,
    ) -> Result<SessionRecord, Self::Error> {
        let stored = SessionRecord::from_new(SessionId::generate(), record);
        self.records.push(stored.clone());
        Ok(stored)
    }

    fn list_records_for_owner(&self, owner: &UserId) -> Result<Vec<SessionRecord>, Self::Error> {
        let mut records: Vec<_> = self
            .records
            .iter()
            .filter(|record| &record.owner_id == owner)
            .cloned()
            .collect();
        // Stable sort keeps insertion order within a date.
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    fn delete_all_records_for_owner(&mut self, owner: &UserId) -> Result<usize, Self::Error> {
        let before = self.records.len();
        self.records.retain(|record| &record.owner_id != owner);
        Ok(before - self.records.len())
    }
}
