use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Student {
    pub id: String,

    pub subject_id: String,

    #[schema(example = "MAHFUG MIYA")]
    pub name: String,

    #[schema(example = "780150", nullable = true)]
    pub roll_number: Option<String>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// A student that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct NewStudent {
    #[schema(example = "MAHFUG MIYA")]
    pub name: String,

    #[schema(example = "780150", nullable = true)]
    pub roll_number: Option<String>,
}

impl NewStudent {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roll_number: None,
        }
    }

    pub fn with_roll(roll_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roll_number: Some(roll_number.into()),
        }
    }
}
