// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Deduplication ledger derived from existing sheet rows.
//!
//! The sheet itself is the durable record of what has been synced: the
//! first column of every row holds the activity date. A run snapshots
//! those dates once, then marks its own successful writes in memory so
//! a second same-day activity later in the fetched window is skipped.
//!
//! Keying on the date (not the activity ID) means at most one activity
//! per calendar day is representable. That granularity is deliberate
//! and matches the sheet layout; upgrading the key is a product
//! decision, not a refactor.

use std::collections::HashSet;

use chrono::NaiveDate;

/// Set of activity dates already present in the sink.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    dates: HashSet<String>,
}

impl Ledger {
    /// Snapshot the ledger from the sheet's current rows.
    ///
    /// Takes the first cell of every non-empty row. Header or stray
    /// cells are harmless: they just never match a real date key.
    pub fn from_rows(rows: &[Vec<String>]) -> Self {
        let dates = rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| row[0].trim().to_string())
            .filter(|cell| !cell.is_empty())
            .collect();
        Self { dates }
    }

    /// Whether an activity on this date has not been synced yet.
    pub fn is_new(&self, date: NaiveDate) -> bool {
        !self.dates.contains(&date_key(date))
    }

    /// Record a successful write so the same date is skipped later in
    /// this run.
    pub fn mark_synced(&mut self, date: NaiveDate) {
        self.dates.insert(date_key(date));
    }

    /// Number of distinct keys currently tracked.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Serialize a date the way it appears in the sheet's first column.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_rows_takes_first_column() {
        let rows = vec![
            vec!["2026-03-01".to_string(), "Morning Run".to_string()],
            vec!["2026-03-03".to_string()],
        ];
        let ledger = Ledger::from_rows(&rows);

        assert!(!ledger.is_new(date("2026-03-01")));
        assert!(!ledger.is_new(date("2026-03-03")));
        assert!(ledger.is_new(date("2026-03-02")));
    }

    #[test]
    fn test_empty_rows_skipped() {
        let rows = vec![
            vec![],
            vec!["".to_string(), "no date".to_string()],
            vec!["2026-03-01".to_string()],
        ];
        let ledger = Ledger::from_rows(&rows);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_header_row_does_not_collide() {
        let rows = vec![vec!["Date".to_string(), "Name".to_string()]];
        let ledger = Ledger::from_rows(&rows);
        assert!(ledger.is_new(date("2026-03-01")));
    }

    #[test]
    fn test_mark_synced() {
        let mut ledger = Ledger::from_rows(&[]);
        assert!(ledger.is_empty());

        let d = date("2026-03-05");
        assert!(ledger.is_new(d));
        ledger.mark_synced(d);
        assert!(!ledger.is_new(d));
        assert_eq!(ledger.len(), 1);
    }
}
