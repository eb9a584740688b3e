use std::net::SocketAddr;

use actix_web::{App, http::StatusCode, test, web::Data};
use attendance_tracker::auth::jwt::issue_token;
use attendance_tracker::config::Config;
use attendance_tracker::routes;
use attendance_tracker::store::{MemoryStore, Store, StoreOp};
use serde_json::{Value, json};

const SECRET: &str = "test-secret";

fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".to_string(),
        database_url: None,
        jwt_secret: SECRET.to_string(),
        jwt_audience: None,
        rate_protected_per_min: 10_000,
        api_prefix: "/api".to_string(),
        log_dir: "logs".to_string(),
        log_level: "debug".to_string(),
    }
}

fn bearer(user_id: &str) -> (&'static str, String) {
    let token = issue_token(user_id, None, None, SECRET, 600).unwrap();
    ("Authorization", format!("Bearer {}", token))
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

macro_rules! app {
    ($store:expr) => {{
        let config = test_config();
        let limiter = routes::build_limiter(config.rate_protected_per_min).unwrap();
        test::init_service(
            App::new()
                .app_data($store.clone())
                .app_data(Data::new(config.clone()))
                .configure(move |cfg| routes::configure(cfg, &config, limiter)),
        )
        .await
    }};
}

macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.peer_addr(peer()).to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

fn memory_store() -> Data<Store> {
    Data::new(Store::Memory(MemoryStore::new()))
}

#[actix_web::test]
async fn requests_without_a_token_are_rejected() {
    let store = memory_store();
    let app = app!(store);

    let (status, body) = call!(app, test::TestRequest::get().uri("/api/subjects"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing Authorization header");

    let (status, _) = call!(
        app,
        test::TestRequest::get()
            .uri("/api/subjects")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn subjects_are_private_to_their_owner() {
    let store = memory_store();
    let app = app!(store);

    let (status, created) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/subjects")
            .insert_header(bearer("alice"))
            .set_json(json!({"name": " Mathematics ", "semester": "Fall 2024"}))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Mathematics");
    assert_eq!(created["owner_id"], "alice");
    let subject_id = created["id"].as_str().unwrap().to_string();

    let (status, list) = call!(
        app,
        test::TestRequest::get()
            .uri("/api/subjects")
            .insert_header(bearer("bob"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));

    let (status, body) = call!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/subjects/{}", subject_id))
            .insert_header(bearer("bob"))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Subject not found");

    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/subjects")
            .insert_header(bearer("alice"))
            .set_json(json!({"name": "Physics", "semester": "  "}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn roster_import_then_grid_toggle_flow() {
    let store = memory_store();
    let app = app!(store);

    let (_, subject) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/subjects")
            .insert_header(bearer("alice"))
            .set_json(json!({"name": "Chemistry", "semester": "2"}))
    );
    let subject_id = subject["id"].as_str().unwrap().to_string();

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/subjects/{}/students/import", subject_id))
            .insert_header(bearer("alice"))
            .set_json(json!({"text": "   \n  "}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No valid student data found");

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/subjects/{}/students/import", subject_id))
            .insert_header(bearer("alice"))
            .set_json(json!({"text": "780158\tMD. AMINUL ISLAM\n780150\tMAHFUG MIYA"}))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "2 student(s) added successfully");

    let (_, students) = call!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/subjects/{}/students", subject_id))
            .insert_header(bearer("alice"))
    );
    assert_eq!(students[0]["roll_number"], "780150");
    let student_id = students[0]["id"].as_str().unwrap().to_string();

    for expected in ["present", "absent"] {
        let (status, body) = call!(
            app,
            test::TestRequest::post()
                .uri(&format!("/api/subjects/{}/attendance/toggle", subject_id))
                .insert_header(bearer("alice"))
                .set_json(json!({"student_id": student_id, "date": "2024-09-10"}))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mark"], expected);
    }

    let (status, grid) = call!(
        app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/subjects/{}/grid?today=2024-09-10&before=1&after=2",
                subject_id
            ))
            .insert_header(bearer("alice"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grid["window"], json!({"first": "2024-09-06", "last": "2024-09-15"}));
    assert_eq!(grid["dates"].as_array().unwrap().len(), 10);
    assert_eq!(grid["cells"][&student_id]["2024-09-10"], "absent");
    assert_eq!(grid["students"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn failed_toggle_reports_save_failure() {
    let store = memory_store();
    let app = app!(store);

    let (_, subject) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/subjects")
            .insert_header(bearer("alice"))
            .set_json(json!({"name": "Biology", "semester": "1"}))
    );
    let subject_id = subject["id"].as_str().unwrap().to_string();
    let (_, student) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/subjects/{}/students", subject_id))
            .insert_header(bearer("alice"))
            .set_json(json!({"name": "Rina", "roll_number": "  "}))
    );
    assert_eq!(student["roll_number"], Value::Null);
    let student_id = student["id"].as_str().unwrap().to_string();

    if let Store::Memory(memory) = store.get_ref() {
        memory.fail_next(StoreOp::InsertAttendance);
    }
    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/subjects/{}/attendance/toggle", subject_id))
            .insert_header(bearer("alice"))
            .set_json(json!({"student_id": student_id, "date": "2024-09-10"}))
    );
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to save attendance");

    let (_, records) = call!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/subjects/{}/attendance/2024-09-10", subject_id))
            .insert_header(bearer("alice"))
    );
    assert_eq!(records, json!([]));
}

#[actix_web::test]
async fn save_day_replaces_the_whole_day() {
    let store = memory_store();
    let app = app!(store);

    let (_, subject) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/subjects")
            .insert_header(bearer("alice"))
            .set_json(json!({"name": "History", "semester": "3"}))
    );
    let subject_id = subject["id"].as_str().unwrap().to_string();
    let (_, imported) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/subjects/{}/students/import", subject_id))
            .insert_header(bearer("alice"))
            .set_json(json!({"text": "1\tAna\n2\tBen"}))
    );
    let ana = imported["data"][0]["id"].as_str().unwrap().to_string();
    let ben = imported["data"][1]["id"].as_str().unwrap().to_string();
    let day_uri = format!("/api/subjects/{}/attendance/2024-09-02", subject_id);

    let (status, _) = call!(
        app,
        test::TestRequest::put()
            .uri(&day_uri)
            .insert_header(bearer("alice"))
            .set_json(json!({"marks": {ana.clone(): true, ben.clone(): false}}))
    );
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call!(
        app,
        test::TestRequest::put()
            .uri(&day_uri)
            .insert_header(bearer("alice"))
            .set_json(json!({"marks": {ben.clone(): true}}))
    );
    assert_eq!(status, StatusCode::OK);

    let (_, records) = call!(
        app,
        test::TestRequest::get()
            .uri(&day_uri)
            .insert_header(bearer("alice"))
    );
    assert_eq!(
        records,
        json!([{"student_id": ben, "date": "2024-09-02", "present": true}])
    );

    let (status, body) = call!(
        app,
        test::TestRequest::put()
            .uri(&day_uri)
            .insert_header(bearer("alice"))
            .set_json(json!({"marks": {"someone-else": true}}))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Student someone-else is not enrolled in this subject");
}

#[actix_web::test]
async fn deleting_a_student_checks_the_subject() {
    let store = memory_store();
    let app = app!(store);

    let mut subject_ids = Vec::new();
    for name in ["Art", "Music"] {
        let (_, subject) = call!(
            app,
            test::TestRequest::post()
                .uri("/api/subjects")
                .insert_header(bearer("alice"))
                .set_json(json!({"name": name, "semester": "1"}))
        );
        subject_ids.push(subject["id"].as_str().unwrap().to_string());
    }
    let (_, student) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/subjects/{}/students", subject_ids[0]))
            .insert_header(bearer("alice"))
            .set_json(json!({"name": "Dev"}))
    );
    let student_id = student["id"].as_str().unwrap().to_string();

    let (status, _) = call!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/subjects/{}/students/{}", subject_ids[1], student_id))
            .insert_header(bearer("alice"))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/subjects/{}/students/{}", subject_ids[0], student_id))
            .insert_header(bearer("alice"))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Student removed successfully");

    let (status, _) = call!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/subjects/{}", subject_ids[0]))
            .insert_header(bearer("alice"))
    );
    assert_eq!(status, StatusCode::OK);
    let (_, list) = call!(
        app,
        test::TestRequest::get()
            .uri("/api/subjects")
            .insert_header(bearer("alice"))
    );
    assert_eq!(list.as_array().unwrap().len(), 1);
}
