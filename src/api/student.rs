use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use utoipa::ToSchema;

use super::{non_blank, owned_subject};
use crate::auth::session::Session;
use crate::error::{ApiError, ApiResult};
use crate::importer::import_roster;
use crate::model::student::{NewStudent, Student};
use crate::store::{Store, StudentStore};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct RosterImport {
    /// One student per line, `ROLL_NUMBER<TAB>NAME` or just `NAME`.
    #[schema(example = "780150\tMAHFUG MIYA\n780158\tMD. AMINUL ISLAM")]
    pub text: String,
}

#[derive(Serialize, ToSchema)]
pub struct RosterImportResponse {
    #[schema(example = "2 student(s) added successfully")]
    pub message: String,
    pub data: Vec<Student>,
}

/// List students of a subject
#[utoipa::path(
    get,
    path = "/api/subjects/{subject_id}/students",
    params(("subject_id", Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Students ordered by roll number", body = [Student]),
        (status = 404, description = "Subject not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Student"
)]
pub async fn list_students(
    session: Session,
    store: web::Data<Store>,
    path: web::Path<String>,
) -> ApiResult<impl Responder> {
    let subject = owned_subject(&store, &session, &path.into_inner()).await?;

    let students = store.list_students(&subject.id).await.map_err(|e| {
        error!(error = %e, subject_id = %subject.id, "Failed to load students");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(students))
}

/// Add a single student
#[utoipa::path(
    post,
    path = "/api/subjects/{subject_id}/students",
    params(("subject_id", Path, description = "Subject ID")),
    request_body = NewStudent,
    responses(
        (status = 201, description = "Student added", body = Student),
        (status = 400, description = "Name missing"),
        (status = 404, description = "Subject not found"),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Failed to add student"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Student"
)]
pub async fn add_student(
    session: Session,
    store: web::Data<Store>,
    path: web::Path<String>,
    payload: web::Json<NewStudent>,
) -> ApiResult<impl Responder> {
    let subject = owned_subject(&store, &session, &path.into_inner()).await?;

    let Some(name) = non_blank(&payload.name) else {
        return Err(ApiError::BadRequest("Student name is required".to_string()));
    };
    let candidate = NewStudent {
        name,
        roll_number: payload.roll_number.as_deref().and_then(non_blank),
    };

    let mut added = store
        .insert_students(&subject.id, std::slice::from_ref(&candidate))
        .await
        .map_err(|e| {
            error!(error = %e, subject_id = %subject.id, "Failed to add student");
            ApiError::from(e)
        })?;

    match added.pop() {
        Some(student) => {
            info!(subject_id = %subject.id, student_id = %student.id, "Student added");
            Ok(HttpResponse::Created().json(student))
        }
        None => Ok(HttpResponse::InternalServerError().json(json!({
            "message": "Failed to add student"
        }))),
    }
}

/// Bulk import students from pasted roster text
#[utoipa::path(
    post,
    path = "/api/subjects/{subject_id}/students/import",
    params(("subject_id", Path, description = "Subject ID")),
    request_body = RosterImport,
    responses(
        (status = 201, description = "Students added", body = RosterImportResponse),
        (status = 400, description = "Nothing to import", body = Object, example = json!({
            "message": "No valid student data found"
        })),
        (status = 404, description = "Subject not found"),
        (status = 500, description = "Insert failed", body = Object, example = json!({
            "message": "Failed to add students"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Student"
)]
pub async fn import_students(
    session: Session,
    store: web::Data<Store>,
    path: web::Path<String>,
    payload: web::Json<RosterImport>,
) -> ApiResult<impl Responder> {
    let subject = owned_subject(&store, &session, &path.into_inner()).await?;

    let added = import_roster(store.get_ref(), &subject.id, &payload.text).await?;

    Ok(HttpResponse::Created().json(RosterImportResponse {
        message: format!("{} student(s) added successfully", added.len()),
        data: added,
    }))
}

/// Remove a student and their attendance
#[utoipa::path(
    delete,
    path = "/api/subjects/{subject_id}/students/{student_id}",
    params(
        ("subject_id", Path, description = "Subject ID"),
        ("student_id", Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student removed", body = Object, example = json!({
            "message": "Student removed successfully"
        })),
        (status = 404, description = "Subject or student not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Student"
)]
pub async fn delete_student(
    session: Session,
    store: web::Data<Store>,
    path: web::Path<(String, String)>,
) -> ApiResult<impl Responder> {
    let (subject_id, student_id) = path.into_inner();
    let subject = owned_subject(&store, &session, &subject_id).await?;

    let student = store.get_student(&student_id).await.map_err(|e| {
        error!(error = %e, student_id = %student_id, "Failed to fetch student");
        ApiError::from(e)
    })?;
    if !student.is_some_and(|s| s.subject_id == subject.id) {
        return Err(ApiError::NotFound("Student"));
    }

    let deleted = store.delete_student(&student_id).await.map_err(|e| {
        error!(error = %e, student_id = %student_id, "Failed to delete student");
        ApiError::from(e)
    })?;
    if !deleted {
        return Err(ApiError::NotFound("Student"));
    }

    info!(subject_id = %subject.id, student_id = %student_id, "Student removed");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Student removed successfully"
    })))
}
