pub mod attendance;
pub mod student;
pub mod subject;

use tracing::error;

use crate::auth::session::Session;
use crate::error::{ApiError, ApiResult};
use crate::model::subject::Subject;
use crate::store::{Store, SubjectStore};

/// Loads a subject the caller owns. Someone else's subject reads as missing.
pub(crate) async fn owned_subject(
    store: &Store,
    session: &Session,
    subject_id: &str,
) -> ApiResult<Subject> {
    let subject = store.get_subject(subject_id).await.map_err(|e| {
        error!(error = %e, subject_id, "Failed to fetch subject");
        ApiError::from(e)
    })?;

    match subject {
        Some(s) if session.owns(&s.owner_id) => Ok(s),
        _ => Err(ApiError::NotFound("Subject")),
    }
}

/// Trimmed value, or `None` when only whitespace is left.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
