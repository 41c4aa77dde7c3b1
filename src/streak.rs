//! Continuous-day streak and calendar lookups over a record collection.
//!
//! Every function here works on local calendar days as reported by the
//! [`Clock`], never on raw UTC dates.

use chrono::{Datelike, NaiveDate};

use crate::clock::Clock;
use crate::happiness_model::HappinessRecord;

/// Counts consecutive local days, ending today, that have an entry.
///
/// Records are sorted newest-first on every call. If the newest one is not
/// from today the streak is 0. Otherwise the walk starts at 1 and steps back
/// through the sorted records, expecting each next one to fall exactly on the
/// day before the last matched day; the first record that does not stops it.
///
/// A second record on an already-matched day is not skipped: it fails the
/// "previous day" test and ends the walk. Entries `[today, today, yesterday]`
/// give a streak of 1.
pub fn continuous_streak<C: Clock>(records: &[HappinessRecord], clock: &C) -> u32 {
    if records.is_empty() {
        return 0;
    }

    let mut sorted: Vec<&HappinessRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut current = clock.local_date(&sorted[0].created_at);
    if current != clock.today() {
        return 0;
    }

    let mut streak = 1;
    for record in &sorted[1..] {
        let Some(expected) = current.pred_opt() else {
            break;
        };
        let day = clock.local_date(&record.created_at);
        if day != expected {
            break;
        }
        streak += 1;
        current = day;
    }

    streak
}

/// Records whose local day is `date`, in collection order.
pub fn records_on<'a, C: Clock>(
    records: &'a [HappinessRecord],
    date: NaiveDate,
    clock: &C,
) -> Vec<&'a HappinessRecord> {
    records
        .iter()
        .filter(|r| clock.local_date(&r.created_at) == date)
        .collect()
}

/// Records created in the given local month (`month` is 1-based).
pub fn records_in_month<'a, C: Clock>(
    records: &'a [HappinessRecord],
    year: i32,
    month: u32,
    clock: &C,
) -> Vec<&'a HappinessRecord> {
    records
        .iter()
        .filter(|r| {
            let day = clock.local_date(&r.created_at);
            day.year() == year && day.month() == month
        })
        .collect()
}
