use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::{error, info};

use super::{non_blank, owned_subject};
use crate::auth::session::Session;
use crate::error::{ApiError, ApiResult};
use crate::model::subject::{NewSubject, Subject};
use crate::store::{Store, SubjectStore};

/// List the caller's subjects
#[utoipa::path(
    get,
    path = "/api/subjects",
    responses(
        (status = 200, description = "Subjects, newest first", body = [Subject]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Subject"
)]
pub async fn list_subjects(session: Session, store: web::Data<Store>) -> ApiResult<impl Responder> {
    let subjects = store.list_subjects(&session.user_id).await.map_err(|e| {
        error!(error = %e, user_id = %session.user_id, "Failed to load subjects");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(subjects))
}

/// Create Subject
#[utoipa::path(
    post,
    path = "/api/subjects",
    request_body = NewSubject,
    responses(
        (status = 201, description = "Subject created", body = Subject),
        (status = 400, description = "Name or semester missing", body = Object, example = json!({
            "message": "Subject name and semester are required"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Subject"
)]
pub async fn create_subject(
    session: Session,
    store: web::Data<Store>,
    payload: web::Json<NewSubject>,
) -> ApiResult<impl Responder> {
    let (Some(name), Some(semester)) = (non_blank(&payload.name), non_blank(&payload.semester))
    else {
        return Err(ApiError::BadRequest(
            "Subject name and semester are required".to_string(),
        ));
    };

    let subject = store
        .create_subject(&session.user_id, &NewSubject { name, semester })
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %session.user_id, "Failed to create subject");
            ApiError::from(e)
        })?;

    info!(subject_id = %subject.id, user_id = %session.user_id, "Subject created");
    Ok(HttpResponse::Created().json(subject))
}

/// Get Subject by ID
#[utoipa::path(
    get,
    path = "/api/subjects/{subject_id}",
    params(("subject_id", Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject found", body = Subject),
        (status = 404, description = "Subject not found", body = Object, example = json!({
            "message": "Subject not found"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Subject"
)]
pub async fn get_subject(
    session: Session,
    store: web::Data<Store>,
    path: web::Path<String>,
) -> ApiResult<impl Responder> {
    let subject = owned_subject(&store, &session, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(subject))
}

/// Delete Subject with its students and their attendance
#[utoipa::path(
    delete,
    path = "/api/subjects/{subject_id}",
    params(("subject_id", Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Subject not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Subject"
)]
pub async fn delete_subject(
    session: Session,
    store: web::Data<Store>,
    path: web::Path<String>,
) -> ApiResult<impl Responder> {
    let subject = owned_subject(&store, &session, &path.into_inner()).await?;

    let deleted = store.delete_subject(&subject.id).await.map_err(|e| {
        error!(error = %e, subject_id = %subject.id, "Failed to delete subject");
        ApiError::from(e)
    })?;

    if !deleted {
        return Err(ApiError::NotFound("Subject"));
    }

    info!(subject_id = %subject.id, "Subject deleted");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
