use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use utoipa::ToSchema;

/// Calendar-day key format used on the wire and in storage.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub student_id: String,

    #[schema(example = "2024-09-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    pub present: bool,
}

impl AttendanceRecord {
    pub fn new(student_id: impl Into<String>, date: NaiveDate, mark: Mark) -> Self {
        Self {
            student_id: student_id.into(),
            date,
            present: mark.is_present(),
        }
    }

    pub fn mark(&self) -> Mark {
        Mark::from(self.present)
    }
}

/// A persisted mark. Only these two values are ever written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mark {
    Present,
    Absent,
}

impl Mark {
    pub fn is_present(self) -> bool {
        self == Mark::Present
    }
}

impl From<bool> for Mark {
    fn from(present: bool) -> Self {
        if present { Mark::Present } else { Mark::Absent }
    }
}

/// What a grid cell shows. `Unmarked` is only ever the value before the
/// first toggle: toggling yields a [`Mark`], never `Unmarked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, AsRefStr, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CellState {
    #[default]
    Unmarked,
    Present,
    Absent,
}

impl CellState {
    /// `Unmarked -> Present -> Absent -> Present -> ...`
    pub fn next_mark(self) -> Mark {
        match self {
            CellState::Unmarked | CellState::Absent => Mark::Present,
            CellState::Present => Mark::Absent,
        }
    }
}

impl From<Mark> for CellState {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::Present => CellState::Present,
            Mark::Absent => CellState::Absent,
        }
    }
}

impl From<Option<Mark>> for CellState {
    fn from(mark: Option<Mark>) -> Self {
        mark.map(CellState::from).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_cycle_never_returns_to_unmarked() {
        let mut cell = CellState::Unmarked;
        let mut seen = Vec::new();
        for _ in 0..3 {
            let mark = cell.next_mark();
            seen.push(mark);
            cell = mark.into();
        }
        assert_eq!(seen, vec![Mark::Present, Mark::Absent, Mark::Present]);
        assert_ne!(cell, CellState::Unmarked);
    }

    #[test]
    fn record_mark_follows_present_flag() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let record = AttendanceRecord::new("s1", date, Mark::Absent);
        assert!(!record.present);
        assert_eq!(record.mark(), Mark::Absent);
        assert_eq!(Mark::Present.to_string(), "present");
        assert_eq!(CellState::Unmarked.as_ref(), "unmarked");
    }
}
