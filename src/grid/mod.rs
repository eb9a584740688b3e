//! Attendance grid for one subject view.
//!
//! An [`AttendanceGrid`] owns a fixed list of students, a [`DateWindow`] and
//! an [`AttendanceMatrix`]. Toggles are applied to the matrix first and then
//! written as a two-step replace: delete the cell's record(s), insert the new
//! one. The replace is not atomic. When either step fails the whole window
//! is reloaded so the matrix matches storage again; at worst the latest
//! toggle is lost, never an unrelated cell.

pub mod matrix;
pub mod window;

use chrono::NaiveDate;
use derive_more::Display;
use tracing::{debug, error, warn};

use crate::model::attendance::{AttendanceRecord, CellState, Mark};
use crate::store::{AttendanceStore, StoreError};

pub use matrix::AttendanceMatrix;
pub use window::DateWindow;

#[derive(Debug, Display)]
pub enum GridError {
    #[display(fmt = "Failed to load attendance")]
    Load(StoreError),
    #[display(fmt = "Failed to save attendance")]
    Save(StoreError),
    #[display(fmt = "Student {} is not part of this grid", _0)]
    UnknownStudent(String),
    #[display(fmt = "{} is outside the visible dates", _0)]
    OutsideWindow(NaiveDate),
    #[display(fmt = "Date window cannot grow past the calendar limits")]
    WindowBounds,
}

impl std::error::Error for GridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridError::Load(e) | GridError::Save(e) => Some(e),
            _ => None,
        }
    }
}

pub type GridResult<T> = Result<T, GridError>;

pub struct AttendanceGrid<'a, S> {
    store: &'a S,
    students: Vec<String>,
    window: DateWindow,
    matrix: AttendanceMatrix,
}

impl<'a, S: AttendanceStore> AttendanceGrid<'a, S> {
    /// A grid over `window` with nothing loaded yet.
    pub fn new(store: &'a S, students: Vec<String>, window: DateWindow) -> Self {
        Self {
            store,
            students,
            window,
            matrix: AttendanceMatrix::new(),
        }
    }

    /// A grid centred on `today`, loaded.
    pub async fn open(store: &'a S, students: Vec<String>, today: NaiveDate) -> GridResult<Self> {
        let mut grid = Self::new(store, students, DateWindow::single(today));
        grid.initialize_window(today).await?;
        Ok(grid)
    }

    pub fn students(&self) -> &[String] {
        &self.students
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    pub fn matrix(&self) -> &AttendanceMatrix {
        &self.matrix
    }

    pub fn cell(&self, student_id: &str, date: NaiveDate) -> CellState {
        self.matrix.get(student_id, date)
    }

    /// Starts a new context: the default window around `today`, an empty
    /// matrix, and a load of every visible day.
    pub async fn initialize_window(&mut self, today: NaiveDate) -> GridResult<()> {
        self.window = DateWindow::centered_on(today).ok_or(GridError::WindowBounds)?;
        self.matrix = AttendanceMatrix::new();
        let dates = self.window.dates();
        self.load_window(&dates).await
    }

    /// Refreshes the cells for `dates` from storage. Cells without a stored
    /// record come back unmarked. On a read error the matrix is left as is.
    pub async fn load_window(&mut self, dates: &[NaiveDate]) -> GridResult<()> {
        if self.students.is_empty() || dates.is_empty() {
            return Ok(());
        }

        let records = self
            .store
            .select_attendance(&self.students, dates)
            .await
            .map_err(|e| {
                error!(error = %e, days = dates.len(), "Failed to load attendance");
                GridError::Load(e)
            })?;

        debug!(days = dates.len(), records = records.len(), "Attendance loaded");
        self.matrix.replace_span(&self.students, dates, &records);
        Ok(())
    }

    async fn reload(&mut self) -> GridResult<()> {
        let dates = self.window.dates();
        self.load_window(&dates).await
    }

    /// Flips one cell and persists it. Returns the mark that was written.
    pub async fn toggle(&mut self, student_id: &str, date: NaiveDate) -> GridResult<Mark> {
        if !self.students.iter().any(|s| s == student_id) {
            return Err(GridError::UnknownStudent(student_id.to_string()));
        }
        if !self.window.contains(date) {
            return Err(GridError::OutsideWindow(date));
        }

        let mark = self.matrix.get(student_id, date).next_mark();
        self.matrix.set(student_id, date, mark);

        let written = self.replace(student_id, date, mark).await;
        if let Err(e) = written {
            error!(error = %e, student_id, %date, mark = %mark, "Failed to save attendance");
            if let Err(reload) = self.reload().await {
                warn!(error = %reload, "Resync after failed save did not complete");
            }
            return Err(GridError::Save(e));
        }

        debug!(student_id, %date, mark = %mark, "Attendance saved");
        Ok(mark)
    }

    async fn replace(&self, student_id: &str, date: NaiveDate, mark: Mark) -> Result<(), StoreError> {
        self.store.delete_attendance(student_id, date).await?;
        self.store
            .insert_attendance(&[AttendanceRecord::new(student_id, date, mark)])
            .await
    }

    /// Shows one more day after the window and loads it.
    pub async fn extend_window_forward(&mut self) -> GridResult<NaiveDate> {
        let date = self.window.extend_forward().ok_or(GridError::WindowBounds)?;
        self.load_window(&[date]).await?;
        Ok(date)
    }

    /// Shows one more day before the window and loads it.
    pub async fn extend_window_backward(&mut self) -> GridResult<NaiveDate> {
        let date = self.window.extend_backward().ok_or(GridError::WindowBounds)?;
        self.load_window(&[date]).await?;
        Ok(date)
    }
}
