use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use tracing::warn;
use uuid::Uuid;

use super::{AttendanceStore, StoreError, StoreOp, StoreResult, StudentStore, SubjectStore};
use crate::model::{
    attendance::AttendanceRecord,
    student::{NewStudent, Student},
    subject::{NewSubject, Subject},
};

#[derive(Default)]
struct Tables {
    subjects: Vec<Subject>,
    students: Vec<Student>,
    // Rows are not keyed by (student, date): like the hosted tables, nothing
    // structural stops a duplicate cell.
    attendance: Vec<AttendanceRecord>,
    armed: HashSet<StoreOp>,
}

/// Process-local store. Used by tests and when no database is configured.
///
/// [`MemoryStore::fail_next`] arms a one-shot failure for an operation, which
/// is how tests break a replace between its delete and its insert.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next call of `op` fails with [`StoreError::Injected`].
    pub fn fail_next(&self, op: StoreOp) {
        self.lock().armed.insert(op);
    }

    /// Every stored attendance row, in insertion order.
    pub fn attendance_rows(&self) -> Vec<AttendanceRecord> {
        self.lock().attendance.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self, op: StoreOp) -> StoreResult<MutexGuard<'_, Tables>> {
        let mut tables = self.lock();
        if tables.armed.remove(&op) {
            warn!(op = %op, "Injected store failure");
            return Err(StoreError::Injected(op));
        }
        Ok(tables)
    }
}

impl SubjectStore for MemoryStore {
    async fn create_subject(&self, owner_id: &str, subject: &NewSubject) -> StoreResult<Subject> {
        let mut tables = self.begin(StoreOp::CreateSubject)?;
        let created = Subject {
            id: Uuid::new_v4().to_string(),
            name: subject.name.clone(),
            semester: subject.semester.clone(),
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
        };
        tables.subjects.push(created.clone());
        Ok(created)
    }

    async fn list_subjects(&self, owner_id: &str) -> StoreResult<Vec<Subject>> {
        let tables = self.begin(StoreOp::ListSubjects)?;
        // reversed first so equal timestamps still come out newest first
        let mut subjects: Vec<Subject> = tables
            .subjects
            .iter()
            .rev()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        subjects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(subjects)
    }

    async fn get_subject(&self, subject_id: &str) -> StoreResult<Option<Subject>> {
        let tables = self.begin(StoreOp::GetSubject)?;
        Ok(tables.subjects.iter().find(|s| s.id == subject_id).cloned())
    }

    async fn delete_subject(&self, subject_id: &str) -> StoreResult<bool> {
        let mut tables = self.begin(StoreOp::DeleteSubject)?;
        let before = tables.subjects.len();
        tables.subjects.retain(|s| s.id != subject_id);
        if tables.subjects.len() == before {
            return Ok(false);
        }

        let removed: HashSet<String> = tables
            .students
            .iter()
            .filter(|s| s.subject_id == subject_id)
            .map(|s| s.id.clone())
            .collect();
        tables.students.retain(|s| s.subject_id != subject_id);
        tables
            .attendance
            .retain(|r| !removed.contains(&r.student_id));
        Ok(true)
    }
}

impl StudentStore for MemoryStore {
    async fn insert_students(
        &self,
        subject_id: &str,
        students: &[NewStudent],
    ) -> StoreResult<Vec<Student>> {
        let mut tables = self.begin(StoreOp::InsertStudents)?;
        let now = Utc::now();
        let rows: Vec<Student> = students
            .iter()
            .map(|s| Student {
                id: Uuid::new_v4().to_string(),
                subject_id: subject_id.to_string(),
                name: s.name.clone(),
                roll_number: s.roll_number.clone(),
                created_at: now,
            })
            .collect();
        tables.students.extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn list_students(&self, subject_id: &str) -> StoreResult<Vec<Student>> {
        let tables = self.begin(StoreOp::ListStudents)?;
        let mut students: Vec<Student> = tables
            .students
            .iter()
            .filter(|s| s.subject_id == subject_id)
            .cloned()
            .collect();
        students.sort_by(|a, b| {
            (a.roll_number.is_none(), &a.roll_number).cmp(&(b.roll_number.is_none(), &b.roll_number))
        });
        Ok(students)
    }

    async fn get_student(&self, student_id: &str) -> StoreResult<Option<Student>> {
        let tables = self.begin(StoreOp::GetStudent)?;
        Ok(tables.students.iter().find(|s| s.id == student_id).cloned())
    }

    async fn delete_student(&self, student_id: &str) -> StoreResult<bool> {
        let mut tables = self.begin(StoreOp::DeleteStudent)?;
        let before = tables.students.len();
        tables.students.retain(|s| s.id != student_id);
        if tables.students.len() == before {
            return Ok(false);
        }
        tables.attendance.retain(|r| r.student_id != student_id);
        Ok(true)
    }
}

impl AttendanceStore for MemoryStore {
    async fn select_attendance(
        &self,
        student_ids: &[String],
        dates: &[NaiveDate],
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let tables = self.begin(StoreOp::SelectAttendance)?;
        Ok(tables
            .attendance
            .iter()
            .filter(|r| student_ids.contains(&r.student_id) && dates.contains(&r.date))
            .cloned()
            .collect())
    }

    async fn delete_attendance(&self, student_id: &str, date: NaiveDate) -> StoreResult<u64> {
        let mut tables = self.begin(StoreOp::DeleteAttendance)?;
        let before = tables.attendance.len();
        tables
            .attendance
            .retain(|r| !(r.student_id == student_id && r.date == date));
        Ok((before - tables.attendance.len()) as u64)
    }

    async fn delete_attendance_on(
        &self,
        student_ids: &[String],
        date: NaiveDate,
    ) -> StoreResult<u64> {
        let mut tables = self.begin(StoreOp::DeleteAttendance)?;
        let before = tables.attendance.len();
        tables
            .attendance
            .retain(|r| !(r.date == date && student_ids.contains(&r.student_id)));
        Ok((before - tables.attendance.len()) as u64)
    }

    async fn insert_attendance(&self, records: &[AttendanceRecord]) -> StoreResult<()> {
        let mut tables = self.begin(StoreOp::InsertAttendance)?;
        tables.attendance.extend(records.iter().cloned());
        Ok(())
    }
}
