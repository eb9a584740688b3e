use std::collections::{BTreeMap, HashSet};

use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use super::owned_subject;
use crate::auth::session::Session;
use crate::error::{ApiError, ApiResult};
use crate::grid::{AttendanceGrid, DateWindow, GridError};
use crate::model::attendance::{AttendanceRecord, Mark};
use crate::model::student::Student;
use crate::model::subject::Subject;
use crate::store::{AttendanceStore, Store, StoreError, StudentStore};

/// Upper bound on `before` / `after` in one grid request.
pub const MAX_EXTENSION_DAYS: u32 = 31;

#[derive(Debug, Deserialize, IntoParams)]
pub struct GridQuery {
    /// Centre of the window, `yyyy-MM-dd`. Defaults to the server's local day.
    #[param(value_type = Option<String>)]
    pub today: Option<NaiveDate>,
    /// Extra days before the default window.
    pub before: Option<u32>,
    /// Extra days after the default window.
    pub after: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct GridResponse {
    #[schema(value_type = Object, example = json!({"first": "2024-08-29", "last": "2024-09-04"}))]
    pub window: DateWindow,
    #[schema(value_type = Vec<String>)]
    pub dates: Vec<NaiveDate>,
    pub students: Vec<Student>,
    /// Student id -> day -> mark. Missing cells are unmarked.
    #[schema(value_type = Object, example = json!({"<student-id>": {"2024-09-01": "present"}}))]
    pub cells: BTreeMap<String, BTreeMap<String, Mark>>,
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct ToggleRequest {
    pub student_id: String,
    #[schema(example = "2024-09-01", value_type = String, format = "date")]
    pub date: NaiveDate,
}

#[derive(Serialize, ToSchema)]
pub struct ToggleResponse {
    pub student_id: String,
    #[schema(example = "2024-09-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub mark: Mark,
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct SaveDay {
    /// Student id -> present.
    #[schema(value_type = Object, example = json!({"<student-id>": true}))]
    pub marks: BTreeMap<String, bool>,
}

async fn subject_students(store: &Store, subject: &Subject) -> ApiResult<Vec<Student>> {
    store.list_students(&subject.id).await.map_err(|e| {
        error!(error = %e, subject_id = %subject.id, "Failed to load students");
        ApiError::from(e)
    })
}

fn ids_of(students: &[Student]) -> Vec<String> {
    students.iter().map(|s| s.id.clone()).collect()
}

/// Attendance grid around a day
#[utoipa::path(
    get,
    path = "/api/subjects/{subject_id}/grid",
    params(
        ("subject_id", Path, description = "Subject ID"),
        GridQuery
    ),
    responses(
        (status = 200, description = "Window, students and marked cells", body = GridResponse),
        (status = 404, description = "Subject not found"),
        (status = 500, description = "Failed to load attendance")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_grid(
    session: Session,
    store: web::Data<Store>,
    path: web::Path<String>,
    query: web::Query<GridQuery>,
) -> ApiResult<impl Responder> {
    let subject = owned_subject(&store, &session, &path.into_inner()).await?;
    let students = subject_students(&store, &subject).await?;

    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    let mut grid = AttendanceGrid::open(store.get_ref(), ids_of(&students), today).await?;

    for _ in 0..query.before.unwrap_or(0).min(MAX_EXTENSION_DAYS) {
        grid.extend_window_backward().await?;
    }
    for _ in 0..query.after.unwrap_or(0).min(MAX_EXTENSION_DAYS) {
        grid.extend_window_forward().await?;
    }

    let window = *grid.window();
    let cells = grid.matrix().to_wire();

    Ok(HttpResponse::Ok().json(GridResponse {
        window,
        dates: window.dates(),
        students,
        cells,
    }))
}

/// Toggle one attendance cell
///
/// Unmarked and absent cells become present, present cells become absent.
#[utoipa::path(
    post,
    path = "/api/subjects/{subject_id}/attendance/toggle",
    params(("subject_id", Path, description = "Subject ID")),
    request_body = ToggleRequest,
    responses(
        (status = 200, description = "Mark written", body = ToggleResponse),
        (status = 404, description = "Subject or student not found"),
        (status = 500, description = "Write failed", body = Object, example = json!({
            "message": "Failed to save attendance"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn toggle_attendance(
    session: Session,
    store: web::Data<Store>,
    path: web::Path<String>,
    payload: web::Json<ToggleRequest>,
) -> ApiResult<impl Responder> {
    let subject = owned_subject(&store, &session, &path.into_inner()).await?;
    let students = subject_students(&store, &subject).await?;

    let ToggleRequest { student_id, date } = payload.into_inner();
    let mut grid = AttendanceGrid::new(store.get_ref(), ids_of(&students), DateWindow::single(date));
    grid.load_window(&[date]).await?;
    let mark = grid.toggle(&student_id, date).await?;

    Ok(HttpResponse::Ok().json(ToggleResponse {
        student_id,
        date,
        mark,
    }))
}

/// Attendance records for one day
#[utoipa::path(
    get,
    path = "/api/subjects/{subject_id}/attendance/{date}",
    params(
        ("subject_id", Path, description = "Subject ID"),
        ("date", Path, description = "Day, yyyy-MM-dd")
    ),
    responses(
        (status = 200, description = "Stored records", body = [AttendanceRecord]),
        (status = 404, description = "Subject not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_day(
    session: Session,
    store: web::Data<Store>,
    path: web::Path<(String, NaiveDate)>,
) -> ApiResult<impl Responder> {
    let (subject_id, date) = path.into_inner();
    let subject = owned_subject(&store, &session, &subject_id).await?;
    let students = subject_students(&store, &subject).await?;

    let records = store
        .select_attendance(&ids_of(&students), &[date])
        .await
        .map_err(|e| {
            error!(error = %e, subject_id = %subject.id, %date, "Failed to load attendance");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(records))
}

/// Save a whole day of attendance
///
/// Replaces every record of the subject's students on that day with the
/// submitted marks.
#[utoipa::path(
    put,
    path = "/api/subjects/{subject_id}/attendance/{date}",
    params(
        ("subject_id", Path, description = "Subject ID"),
        ("date", Path, description = "Day, yyyy-MM-dd")
    ),
    request_body = SaveDay,
    responses(
        (status = 200, description = "Attendance saved", body = Object, example = json!({
            "message": "Attendance saved successfully"
        })),
        (status = 400, description = "Unknown student in payload"),
        (status = 404, description = "Subject not found"),
        (status = 500, description = "Write failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn save_day(
    session: Session,
    store: web::Data<Store>,
    path: web::Path<(String, NaiveDate)>,
    payload: web::Json<SaveDay>,
) -> ApiResult<impl Responder> {
    let (subject_id, date) = path.into_inner();
    let subject = owned_subject(&store, &session, &subject_id).await?;
    let students = subject_students(&store, &subject).await?;

    let known: HashSet<&str> = students.iter().map(|s| s.id.as_str()).collect();
    if let Some(stranger) = payload.marks.keys().find(|id| !known.contains(id.as_str())) {
        return Err(ApiError::BadRequest(format!(
            "Student {} is not enrolled in this subject",
            stranger
        )));
    }

    let records: Vec<AttendanceRecord> = payload
        .marks
        .iter()
        .map(|(id, present)| AttendanceRecord::new(id.clone(), date, Mark::from(*present)))
        .collect();

    store
        .delete_attendance_on(&ids_of(&students), date)
        .await
        .map_err(|e| save_failed(e, &subject, date))?;
    store
        .insert_attendance(&records)
        .await
        .map_err(|e| save_failed(e, &subject, date))?;

    info!(subject_id = %subject.id, %date, records = records.len(), "Day saved");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance saved successfully"
    })))
}

fn save_failed(e: StoreError, subject: &Subject, date: NaiveDate) -> ApiError {
    error!(error = %e, subject_id = %subject.id, %date, "Failed to save attendance");
    ApiError::Grid(GridError::Save(e))
}
