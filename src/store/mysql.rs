use chrono::{NaiveDate, Utc};
use sqlx::{MySql, MySqlPool, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::{AttendanceStore, StoreResult, StudentStore, SubjectStore};
use crate::model::{
    attendance::AttendanceRecord,
    student::{NewStudent, Student},
    subject::{NewSubject, Subject},
};

/// Store backed by the MySQL schema in `migrations/`.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

impl SubjectStore for MySqlStore {
    async fn create_subject(&self, owner_id: &str, subject: &NewSubject) -> StoreResult<Subject> {
        let created = Subject {
            id: Uuid::new_v4().to_string(),
            name: subject.name.clone(),
            semester: subject.semester.clone(),
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO subjects (id, name, semester, owner_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&created.id)
        .bind(&created.name)
        .bind(&created.semester)
        .bind(&created.owner_id)
        .bind(created.created_at)
        .execute(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_subjects(&self, owner_id: &str) -> StoreResult<Vec<Subject>> {
        let subjects = sqlx::query_as::<_, Subject>(
            r#"
            SELECT id, name, semester, owner_id, created_at
            FROM subjects
            WHERE owner_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subjects)
    }

    async fn get_subject(&self, subject_id: &str) -> StoreResult<Option<Subject>> {
        let subject = sqlx::query_as::<_, Subject>(
            r#"
            SELECT id, name, semester, owner_id, created_at
            FROM subjects
            WHERE id = ?
            "#,
        )
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subject)
    }

    async fn delete_subject(&self, subject_id: &str) -> StoreResult<bool> {
        // students and attendance go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM subjects WHERE id = ?")
            .bind(subject_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl StudentStore for MySqlStore {
    async fn insert_students(
        &self,
        subject_id: &str,
        students: &[NewStudent],
    ) -> StoreResult<Vec<Student>> {
        if students.is_empty() {
            return Ok(Vec::new());
        }

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

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(
            "INSERT INTO students (id, subject_id, name, roll_number, created_at) ",
        );
        builder.push_values(&rows, |mut b, row| {
            b.push_bind(&row.id)
                .push_bind(&row.subject_id)
                .push_bind(&row.name)
                .push_bind(&row.roll_number)
                .push_bind(row.created_at);
        });

        debug!(subject_id, count = rows.len(), "Inserting students");
        builder.build().execute(&self.pool).await?;

        Ok(rows)
    }

    async fn list_students(&self, subject_id: &str) -> StoreResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, subject_id, name, roll_number, created_at
            FROM students
            WHERE subject_id = ?
            ORDER BY roll_number IS NULL, roll_number, created_at
            "#,
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    async fn get_student(&self, student_id: &str) -> StoreResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, subject_id, name, roll_number, created_at
            FROM students
            WHERE id = ?
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn delete_student(&self, student_id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl AttendanceStore for MySqlStore {
    async fn select_attendance(
        &self,
        student_ids: &[String],
        dates: &[NaiveDate],
    ) -> StoreResult<Vec<AttendanceRecord>> {
        if student_ids.is_empty() || dates.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<MySql> =
            QueryBuilder::new("SELECT student_id, date, present FROM attendance WHERE student_id IN (");
        let mut ids = builder.separated(", ");
        for id in student_ids {
            ids.push_bind(id);
        }
        ids.push_unseparated(") AND date IN (");
        let mut days = builder.separated(", ");
        for date in dates {
            days.push_bind(*date);
        }
        days.push_unseparated(")");

        debug!(
            students = student_ids.len(),
            dates = dates.len(),
            "Selecting attendance"
        );
        let records = builder
            .build_query_as::<AttendanceRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn delete_attendance(&self, student_id: &str, date: NaiveDate) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM attendance WHERE student_id = ? AND date = ?")
            .bind(student_id)
            .bind(date)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_attendance_on(
        &self,
        student_ids: &[String],
        date: NaiveDate,
    ) -> StoreResult<u64> {
        if student_ids.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new("DELETE FROM attendance WHERE date = ");
        builder.push_bind(date);
        builder.push(" AND student_id IN (");
        let mut ids = builder.separated(", ");
        for id in student_ids {
            ids.push_bind(id);
        }
        ids.push_unseparated(")");

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn insert_attendance(&self, records: &[AttendanceRecord]) -> StoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<MySql> =
            QueryBuilder::new("INSERT INTO attendance (student_id, date, present) ");
        builder.push_values(records, |mut b, record| {
            b.push_bind(&record.student_id)
                .push_bind(record.date)
                .push_bind(record.present);
        });

        builder.build().execute(&self.pool).await?;
        Ok(())
    }
}
