use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::model::attendance::{AttendanceRecord, CellState, DATE_FORMAT, Mark};

/// Student id -> day -> mark. A missing entry is an unmarked cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceMatrix {
    cells: HashMap<String, HashMap<NaiveDate, Mark>>,
}

impl AttendanceMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, student_id: &str, date: NaiveDate) -> CellState {
        self.cells
            .get(student_id)
            .and_then(|days| days.get(&date))
            .copied()
            .into()
    }

    pub fn set(&mut self, student_id: &str, date: NaiveDate, mark: Mark) {
        self.cells
            .entry(student_id.to_string())
            .or_default()
            .insert(date, mark);
    }

    pub fn clear(&mut self, student_id: &str, date: NaiveDate) {
        if let Some(days) = self.cells.get_mut(student_id) {
            days.remove(&date);
            if days.is_empty() {
                self.cells.remove(student_id);
            }
        }
    }

    /// Overwrites every (student, day) pair in `student_ids` x `dates` with
    /// what `records` says, leaving pairs without a record unmarked.
    pub fn replace_span(
        &mut self,
        student_ids: &[String],
        dates: &[NaiveDate],
        records: &[AttendanceRecord],
    ) {
        for student_id in student_ids {
            for date in dates {
                self.clear(student_id, *date);
            }
        }
        for record in records {
            self.set(&record.student_id, record.date, record.mark());
        }
    }

    /// Number of marked cells.
    pub fn marked(&self) -> usize {
        self.cells.values().map(HashMap::len).sum()
    }

    /// Marked cells keyed by ISO day, for responses.
    pub fn to_wire(&self) -> BTreeMap<String, BTreeMap<String, Mark>> {
        self.cells
            .iter()
            .map(|(student, days)| {
                let days = days
                    .iter()
                    .map(|(date, mark)| (date.format(DATE_FORMAT).to_string(), *mark))
                    .collect();
                (student.clone(), days)
            })
            .collect()
    }
}
