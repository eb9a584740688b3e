//! Storage contract for subjects, students and attendance.
//!
//! Every method is a single request/response round trip. Nothing here
//! retries or groups calls into transactions: the attendance replace is two
//! separate calls (`delete_attendance`, then `insert_attendance`) so callers
//! and tests can observe a failure between them.

pub mod memory;
pub mod mysql;

use chrono::NaiveDate;
use derive_more::Display;
use strum::{AsRefStr, Display as StrumDisplay};

use crate::model::{
    attendance::AttendanceRecord,
    student::{NewStudent, Student},
    subject::{NewSubject, Subject},
};

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Operation names, used for failure injection and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum StoreOp {
    CreateSubject,
    ListSubjects,
    GetSubject,
    DeleteSubject,
    InsertStudents,
    ListStudents,
    GetStudent,
    DeleteStudent,
    SelectAttendance,
    DeleteAttendance,
    InsertAttendance,
}

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
    #[display(fmt = "injected failure in {}", _0)]
    Injected(StoreOp),
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            StoreError::Injected(_) => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[allow(async_fn_in_trait)]
pub trait SubjectStore {
    async fn create_subject(&self, owner_id: &str, subject: &NewSubject) -> StoreResult<Subject>;

    /// Newest first.
    async fn list_subjects(&self, owner_id: &str) -> StoreResult<Vec<Subject>>;

    async fn get_subject(&self, subject_id: &str) -> StoreResult<Option<Subject>>;

    /// Removes the subject with its students and their attendance.
    async fn delete_subject(&self, subject_id: &str) -> StoreResult<bool>;
}

#[allow(async_fn_in_trait)]
pub trait StudentStore {
    /// One statement regardless of batch size.
    async fn insert_students(
        &self,
        subject_id: &str,
        students: &[NewStudent],
    ) -> StoreResult<Vec<Student>>;

    /// Ordered by roll number, students without one last.
    async fn list_students(&self, subject_id: &str) -> StoreResult<Vec<Student>>;

    async fn get_student(&self, student_id: &str) -> StoreResult<Option<Student>>;

    async fn delete_student(&self, student_id: &str) -> StoreResult<bool>;
}

#[allow(async_fn_in_trait)]
pub trait AttendanceStore {
    /// All records where `student_id` is in `student_ids` and `date` is in `dates`.
    async fn select_attendance(
        &self,
        student_ids: &[String],
        dates: &[NaiveDate],
    ) -> StoreResult<Vec<AttendanceRecord>>;

    async fn delete_attendance(&self, student_id: &str, date: NaiveDate) -> StoreResult<u64>;

    async fn delete_attendance_on(&self, student_ids: &[String], date: NaiveDate)
    -> StoreResult<u64>;

    async fn insert_attendance(&self, records: &[AttendanceRecord]) -> StoreResult<()>;
}

/// The backend the HTTP layer runs against.
pub enum Store {
    MySql(MySqlStore),
    Memory(MemoryStore),
}

impl Store {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::MySql(_) => "mysql",
            Store::Memory(_) => "memory",
        }
    }
}

impl SubjectStore for Store {
    async fn create_subject(&self, owner_id: &str, subject: &NewSubject) -> StoreResult<Subject> {
        match self {
            Store::MySql(s) => s.create_subject(owner_id, subject).await,
            Store::Memory(s) => s.create_subject(owner_id, subject).await,
        }
    }

    async fn list_subjects(&self, owner_id: &str) -> StoreResult<Vec<Subject>> {
        match self {
            Store::MySql(s) => s.list_subjects(owner_id).await,
            Store::Memory(s) => s.list_subjects(owner_id).await,
        }
    }

    async fn get_subject(&self, subject_id: &str) -> StoreResult<Option<Subject>> {
        match self {
            Store::MySql(s) => s.get_subject(subject_id).await,
            Store::Memory(s) => s.get_subject(subject_id).await,
        }
    }

    async fn delete_subject(&self, subject_id: &str) -> StoreResult<bool> {
        match self {
            Store::MySql(s) => s.delete_subject(subject_id).await,
            Store::Memory(s) => s.delete_subject(subject_id).await,
        }
    }
}

impl StudentStore for Store {
    async fn insert_students(
        &self,
        subject_id: &str,
        students: &[NewStudent],
    ) -> StoreResult<Vec<Student>> {
        match self {
            Store::MySql(s) => s.insert_students(subject_id, students).await,
            Store::Memory(s) => s.insert_students(subject_id, students).await,
        }
    }

    async fn list_students(&self, subject_id: &str) -> StoreResult<Vec<Student>> {
        match self {
            Store::MySql(s) => s.list_students(subject_id).await,
            Store::Memory(s) => s.list_students(subject_id).await,
        }
    }

    async fn get_student(&self, student_id: &str) -> StoreResult<Option<Student>> {
        match self {
            Store::MySql(s) => s.get_student(student_id).await,
            Store::Memory(s) => s.get_student(student_id).await,
        }
    }

    async fn delete_student(&self, student_id: &str) -> StoreResult<bool> {
        match self {
            Store::MySql(s) => s.delete_student(student_id).await,
            Store::Memory(s) => s.delete_student(student_id).await,
        }
    }
}

impl AttendanceStore for Store {
    async fn select_attendance(
        &self,
        student_ids: &[String],
        dates: &[NaiveDate],
    ) -> StoreResult<Vec<AttendanceRecord>> {
        match self {
            Store::MySql(s) => s.select_attendance(student_ids, dates).await,
            Store::Memory(s) => s.select_attendance(student_ids, dates).await,
        }
    }

    async fn delete_attendance(&self, student_id: &str, date: NaiveDate) -> StoreResult<u64> {
        match self {
            Store::MySql(s) => s.delete_attendance(student_id, date).await,
            Store::Memory(s) => s.delete_attendance(student_id, date).await,
        }
    }

    async fn delete_attendance_on(
        &self,
        student_ids: &[String],
        date: NaiveDate,
    ) -> StoreResult<u64> {
        match self {
            Store::MySql(s) => s.delete_attendance_on(student_ids, date).await,
            Store::Memory(s) => s.delete_attendance_on(student_ids, date).await,
        }
    }

    async fn insert_attendance(&self, records: &[AttendanceRecord]) -> StoreResult<()> {
        match self {
            Store::MySql(s) => s.insert_attendance(records).await,
            Store::Memory(s) => s.insert_attendance(records).await,
        }
    }
}
