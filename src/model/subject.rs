use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "5b0f3c3e-8f7e-4a43-9d6f-2a1e6b7c9d10",
        "name": "Mathematics",
        "semester": "Fall 2024",
        "owner_id": "0c8d3a52-61f4-4f0e-a0c7-0d6c5b6f4e21",
        "created_at": "2024-09-01T08:00:00Z"
    })
)]
pub struct Subject {
    pub id: String,

    #[schema(example = "Mathematics")]
    pub name: String,

    #[schema(example = "Fall 2024")]
    pub semester: String,

    pub owner_id: String,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NewSubject {
    #[schema(example = "Mathematics")]
    pub name: String,
    #[schema(example = "Fall 2024")]
    pub semester: String,
}
