use crate::api::attendance::{GridResponse, SaveDay, ToggleRequest, ToggleResponse};
use crate::api::student::{RosterImport, RosterImportResponse};
use crate::model::attendance::{AttendanceRecord, CellState, Mark};
use crate::model::student::{NewStudent, Student};
use crate::model::subject::{NewSubject, Subject};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "0.1.0",
        description = r#"
## Attendance Tracker

Subjects, their students, and day-by-day attendance.

### Features
- **Subjects**: create, list, view and delete your own subjects
- **Students**: add one at a time or paste a tab-separated roster
- **Attendance**: a date-windowed grid with one-click present/absent toggles,
  or save a whole day at once

### Security
Every endpoint needs a **Bearer** token from the auth service. Subjects are
only visible to the user who created them.

Dates are always `yyyy-MM-dd`.
"#,
    ),
    paths(
        crate::api::subject::list_subjects,
        crate::api::subject::create_subject,
        crate::api::subject::get_subject,
        crate::api::subject::delete_subject,

        crate::api::student::list_students,
        crate::api::student::add_student,
        crate::api::student::import_students,
        crate::api::student::delete_student,

        crate::api::attendance::get_grid,
        crate::api::attendance::toggle_attendance,
        crate::api::attendance::get_day,
        crate::api::attendance::save_day
    ),
    components(
        schemas(
            Subject,
            NewSubject,
            Student,
            NewStudent,
            RosterImport,
            RosterImportResponse,
            AttendanceRecord,
            Mark,
            CellState,
            GridResponse,
            ToggleRequest,
            ToggleResponse,
            SaveDay
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Subject", description = "Subject management APIs"),
        (name = "Student", description = "Student roster APIs"),
        (name = "Attendance", description = "Attendance grid APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
