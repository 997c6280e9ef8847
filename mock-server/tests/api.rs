use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Attendance, Employee};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn bare_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

const JANE: &str = r#"{"full_name":"Jane Doe","employee_id":"EMP009","email":"jane@x.com","department":"Sales"}"#;

/// Send `request` through a clone of `app`, so several requests share state.
async fn send(app: &axum::Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

// --- employees: list ---

#[tokio::test]
async fn list_employees_empty() {
    let resp = app()
        .oneshot(bare_request("GET", "/api/employees/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let employees: Vec<Employee> = body_json(resp).await;
    assert!(employees.is_empty());
}

// --- employees: create ---

#[tokio::test]
async fn create_employee_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/api/employees/", JANE))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let employee: Employee = body_json(resp).await;
    assert_eq!(employee.full_name, "Jane Doe");
    assert_eq!(employee.employee_id, "EMP009");
}

#[tokio::test]
async fn create_employee_missing_field_returns_field_errors() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/employees/",
            r#"{"full_name":"Jane Doe","employee_id":"EMP009","department":"Sales"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({"email": ["This field is required."]}));
}

#[tokio::test]
async fn create_employee_malformed_json_returns_detail() {
    let resp = app()
        .oneshot(json_request("POST", "/api/employees/", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().starts_with("JSON parse error"));
}

#[tokio::test]
async fn duplicate_employee_id_is_rejected() {
    let app = app();
    assert_eq!(
        send(&app, json_request("POST", "/api/employees/", JANE)).await.status(),
        StatusCode::CREATED
    );

    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/employees/",
            r#"{"full_name":"Other","employee_id":"EMP009","email":"other@x.com","department":"Ops"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(
        body["employee_id"][0],
        "employee with this employee id already exists."
    );
}

// --- employees: get / update / delete ---

#[tokio::test]
async fn get_employee_not_found_has_detail() {
    let resp = app()
        .oneshot(bare_request(
            "GET",
            "/api/employees/00000000-0000-0000-0000-000000000000/",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "No Employee matches the given query.");
}

#[tokio::test]
async fn get_employee_bad_uuid_is_not_found() {
    let resp = app()
        .oneshot(bare_request("GET", "/api/employees/not-a-uuid/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_employee_not_found() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/api/employees/00000000-0000-0000-0000-000000000000/",
            JANE,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_employee_not_found() {
    let resp = app()
        .oneshot(bare_request(
            "DELETE",
            "/api/employees/00000000-0000-0000-0000-000000000000/",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- attendance ---

#[tokio::test]
async fn attendance_for_unknown_employee_is_rejected() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/attendance/",
            r#"{"employee":"00000000-0000-0000-0000-000000000000","date":"2025-03-01","status":"Present"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(
        body["employee"][0],
        "Invalid pk \"00000000-0000-0000-0000-000000000000\" - object does not exist."
    );
}

#[tokio::test]
async fn attendance_lifecycle_and_cascade() {
    let app = app();

    let resp = send(&app, json_request("POST", "/api/employees/", JANE)).await;
    let jane: Employee = body_json(resp).await;

    // mark two days
    for (date, status) in [("2025-03-01", "Present"), ("2025-03-02", "Absent")] {
        let body = format!(r#"{{"employee":"{}","date":"{date}","status":"{status}"}}"#, jane.id);
        let resp = send(&app, json_request("POST", "/api/attendance/", &body)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let record: Attendance = body_json(resp).await;
        assert_eq!(record.employee_name, "Jane Doe");
        assert_eq!(record.status, status);
    }

    // same day again violates the unique pair
    let body = format!(
        r#"{{"employee":"{}","date":"2025-03-01","status":"Absent"}}"#,
        jane.id
    );
    let resp = send(&app, json_request("POST", "/api/attendance/", &body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let errors: Value = body_json(resp).await;
    assert_eq!(
        errors["non_field_errors"][0],
        "The fields employee, date must make a unique set."
    );

    // list is newest date first
    let resp = send(&app, bare_request("GET", "/api/attendance/")).await;
    let records: Vec<Attendance> = body_json(resp).await;
    let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
    assert_eq!(dates, vec!["2025-03-02", "2025-03-01"]);

    // per-employee history by UUID
    let resp = send(&app, bare_request("GET", &format!("/api/attendance/{}/", jane.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let history: Vec<Attendance> = body_json(resp).await;
    assert_eq!(history.len(), 2);

    // single record by integer id
    let resp = send(&app, bare_request("GET", &format!("/api/attendance/{}/", records[0].id))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // deleting the employee removes their attendance
    let resp = send(&app, bare_request("DELETE", &format!("/api/employees/{}/", jane.id))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&app, bare_request("GET", "/api/attendance/")).await;
    let records: Vec<Attendance> = body_json(resp).await;
    assert!(records.is_empty());
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn employee_crud_lifecycle() {
    let app = app();

    // create two; list is newest first
    let resp = send(&app, json_request("POST", "/api/employees/", JANE)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let jane: Employee = body_json(resp).await;

    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/employees/",
            r#"{"full_name":"John Roe","employee_id":"EMP010","email":"john@x.com","department":"Ops"}"#,
        ),
    )
    .await;
    let john: Employee = body_json(resp).await;

    let resp = send(&app, bare_request("GET", "/api/employees/")).await;
    let employees: Vec<Employee> = body_json(resp).await;
    let ids: Vec<_> = employees.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![john.id, jane.id]);

    // update keeps id and created_at, may keep its own email
    let resp = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/employees/{}/", jane.id),
            r#"{"full_name":"Jane Smith","employee_id":"EMP009","email":"jane@x.com","department":"Sales"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Employee = body_json(resp).await;
    assert_eq!(updated.id, jane.id);
    assert_eq!(updated.full_name, "Jane Smith");
    assert_eq!(updated.created_at, jane.created_at);

    // update onto someone else's email
    let resp = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/employees/{}/", jane.id),
            r#"{"full_name":"Jane Smith","employee_id":"EMP009","email":"john@x.com","department":"Sales"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // delete
    let resp = send(&app, bare_request("DELETE", &format!("/api/employees/{}/", jane.id))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete: 404
    let resp = send(&app, bare_request("GET", &format!("/api/employees/{}/", jane.id))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&app, bare_request("GET", "/api/employees/")).await;
    let employees: Vec<Employee> = body_json(resp).await;
    assert_eq!(employees.len(), 1);
}
