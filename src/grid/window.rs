use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Days shown on each side of "today" in a fresh window.
pub const DEFAULT_RADIUS: u64 = 3;

/// A contiguous, ascending span of calendar days, `first..=last`.
///
/// Storing only the two ends keeps the window contiguous by construction;
/// it can only grow, one day at a time, at either end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    first: NaiveDate,
    last: NaiveDate,
}

impl DateWindow {
    /// `today - 3 ..= today + 3`. `None` only at the edges of the calendar.
    pub fn centered_on(today: NaiveDate) -> Option<Self> {
        Some(Self {
            first: today.checked_sub_days(Days::new(DEFAULT_RADIUS))?,
            last: today.checked_add_days(Days::new(DEFAULT_RADIUS))?,
        })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            first: date,
            last: date,
        }
    }

    pub fn first(&self) -> NaiveDate {
        self.first
    }

    pub fn last(&self) -> NaiveDate {
        self.last
    }

    pub fn len(&self) -> usize {
        (self.last - self.first).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.first.iter_days().take(self.len()).collect()
    }

    /// Appends the day after `last` and returns it.
    pub fn extend_forward(&mut self) -> Option<NaiveDate> {
        let next = self.last.succ_opt()?;
        self.last = next;
        Some(next)
    }

    /// Prepends the day before `first` and returns it.
    pub fn extend_backward(&mut self) -> Option<NaiveDate> {
        let prev = self.first.pred_opt()?;
        self.first = prev;
        Some(prev)
    }
}
