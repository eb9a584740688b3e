//! Bulk student import from pasted roster text.
//!
//! One student per line. A line is split on tabs only: the first field is
//! the roll number and the rest (joined by a single space) is the name. A
//! line with a single field is a bare name. Blank lines are skipped.

use derive_more::Display;
use tracing::{error, info};

use crate::model::student::{NewStudent, Student};
use crate::store::{StoreError, StudentStore};

#[derive(Debug, Display)]
pub enum ImportError {
    #[display(fmt = "No valid student data found")]
    NoValidData,
    #[display(fmt = "Failed to add students")]
    Storage(StoreError),
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::NoValidData => None,
            ImportError::Storage(e) => Some(e),
        }
    }
}

/// Parses roster text into candidate students, in line order.
pub fn parse_roster(text: &str) -> Vec<NewStudent> {
    text.trim().split('\n').filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<NewStudent> {
    let fields: Vec<&str> = line
        .split('\t')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();

    match fields.as_slice() {
        [] => None,
        [name] => Some(NewStudent::named(*name)),
        [roll, rest @ ..] => Some(NewStudent::with_roll(*roll, rest.join(" "))),
    }
}

/// Parses `text` and stores every candidate for `subject_id` in one batch.
///
/// The caller still owns `text`, so on any error it can be offered again
/// unchanged.
pub async fn import_roster<S: StudentStore>(
    store: &S,
    subject_id: &str,
    text: &str,
) -> Result<Vec<Student>, ImportError> {
    let candidates = parse_roster(text);
    if candidates.is_empty() {
        info!(subject_id, "Roster import rejected: no valid rows");
        return Err(ImportError::NoValidData);
    }

    let added = store
        .insert_students(subject_id, &candidates)
        .await
        .map_err(|e| {
            error!(error = %e, subject_id, count = candidates.len(), "Roster import failed");
            ImportError::Storage(e)
        })?;

    info!(subject_id, count = added.len(), "Roster imported");
    Ok(added)
}
