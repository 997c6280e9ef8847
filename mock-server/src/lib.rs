use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub employee_id: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attendance {
    pub id: u64,
    pub employee: Uuid,
    pub employee_name: String,
    pub date: NaiveDate,
    pub status: String,
}

const STATUS_CHOICES: [&str; 2] = ["Present", "Absent"];

#[derive(Clone, Debug)]
struct AttendanceRow {
    id: u64,
    employee: Uuid,
    date: NaiveDate,
    status: String,
}

/// In-memory tables. Employees are kept in insertion order, which is also
/// creation order.
#[derive(Debug, Default)]
pub struct Db {
    employees: Vec<Employee>,
    attendance: Vec<AttendanceRow>,
    next_attendance_id: u64,
}

pub type SharedDb = Arc<RwLock<Db>>;

/// Every route lives under this prefix, like the real backend's `api/` include.
pub const API_PREFIX: &str = "/api";

pub fn app() -> Router {
    let db: SharedDb = Arc::new(RwLock::new(Db::default()));
    let api = Router::new()
        .route("/employees/", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}/",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .route("/attendance/", get(list_attendance).post(create_attendance))
        .route(
            "/attendance/{key}/",
            get(get_attendance).put(update_attendance).delete(delete_attendance),
        )
        .with_state(db);
    Router::new().nest(API_PREFIX, api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Error bodies
// ---------------------------------------------------------------------------

/// A non-2xx answer with a Django REST Framework style JSON body.
#[derive(Debug)]
pub struct Rejection {
    status: StatusCode,
    body: Value,
}

impl Rejection {
    fn not_found(model: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: json!({ "detail": format!("No {model} matches the given query.") }),
        }
    }

    fn bad_request(body: Value) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body,
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Field name to list of messages, in the order fields were validated.
#[derive(Debug, Default)]
struct FieldErrors(Map<String, Value>);

impl FieldErrors {
    fn add(&mut self, field: &str, message: impl Into<String>) {
        let entry = self
            .0
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(messages) = entry {
            messages.push(Value::String(message.into()));
        }
    }

    fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    fn into_result(self) -> Result<(), Rejection> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Rejection::bad_request(Value::Object(self.0)))
        }
    }
}

fn parse_object(body: &Bytes) -> Result<Map<String, Value>, Rejection> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(Rejection::bad_request(json!({
            "non_field_errors": [format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type(&other)
            )]
        }))),
        Err(e) => Err(Rejection::bad_request(json!({
            "detail": format!("JSON parse error - {e}")
        }))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// A required, trimmed, non-blank string of at most `max_len` characters.
fn char_field(
    payload: &Map<String, Value>,
    name: &str,
    max_len: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = match payload.get(name) {
        None => {
            errors.add(name, "This field is required.");
            return None;
        }
        Some(Value::Null) => {
            errors.add(name, "This field may not be null.");
            return None;
        }
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(_) => {
            errors.add(name, "Not a valid string.");
            return None;
        }
    };
    if value.is_empty() {
        errors.add(name, "This field may not be blank.");
        return None;
    }
    if value.chars().count() > max_len {
        errors.add(
            name,
            format!("Ensure this field has no more than {max_len} characters."),
        );
        return None;
    }
    Some(value)
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.contains(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty() && !label.contains('@'))
}

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

struct EmployeeFields {
    employee_id: String,
    full_name: String,
    email: String,
    department: String,
}

impl Db {
    fn employee(&self, id: Uuid) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    /// Whether an employee other than `current` satisfies `clash`.
    fn employee_clash(&self, current: Option<Uuid>, clash: impl Fn(&Employee) -> bool) -> bool {
        self.employees
            .iter()
            .any(|e| Some(e.id) != current && clash(e))
    }

    fn validate_employee(
        &self,
        payload: &Map<String, Value>,
        current: Option<Uuid>,
    ) -> Result<EmployeeFields, Rejection> {
        let mut errors = FieldErrors::default();

        let employee_id = char_field(payload, "employee_id", 20, &mut errors);
        if let Some(code) = &employee_id {
            if self.employee_clash(current, |e| &e.employee_id == code) {
                errors.add("employee_id", "employee with this employee id already exists.");
            }
        }
        let full_name = char_field(payload, "full_name", 255, &mut errors);
        let email = char_field(payload, "email", 254, &mut errors);
        if let Some(address) = &email {
            if !looks_like_email(address) {
                errors.add("email", "Enter a valid email address.");
            } else if self.employee_clash(current, |e| &e.email == address) {
                errors.add("email", "employee with this email already exists.");
            }
        }
        let department = char_field(payload, "department", 100, &mut errors);
        errors.into_result()?;

        match (employee_id, full_name, email, department) {
            (Some(employee_id), Some(full_name), Some(email), Some(department)) => Ok(EmployeeFields {
                employee_id,
                full_name,
                email,
                department,
            }),
            _ => Err(Rejection::bad_request(json!({ "detail": "Invalid input." }))),
        }
    }
}

fn parse_employee_pk(raw: &str) -> Result<Uuid, Rejection> {
    Uuid::parse_str(raw).map_err(|_| Rejection::not_found("Employee"))
}

async fn list_employees(State(db): State<SharedDb>) -> Json<Vec<Employee>> {
    let db = db.read().await;
    Json(db.employees.iter().rev().cloned().collect())
}

async fn create_employee(
    State(db): State<SharedDb>,
    body: Bytes,
) -> Result<(StatusCode, Json<Employee>), Rejection> {
    let payload = parse_object(&body)?;
    let mut db = db.write().await;
    let fields = db.validate_employee(&payload, None)?;
    let employee = Employee {
        id: Uuid::new_v4(),
        employee_id: fields.employee_id,
        full_name: fields.full_name,
        email: fields.email,
        department: fields.department,
        created_at: Utc::now(),
    };
    db.employees.push(employee.clone());
    tracing::info!(id = %employee.id, employee_id = %employee.employee_id, "employee created");
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn get_employee(
    State(db): State<SharedDb>,
    Path(id): Path<String>,
) -> Result<Json<Employee>, Rejection> {
    let id = parse_employee_pk(&id)?;
    let db = db.read().await;
    db.employee(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Rejection::not_found("Employee"))
}

async fn update_employee(
    State(db): State<SharedDb>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Employee>, Rejection> {
    let id = parse_employee_pk(&id)?;
    let mut db = db.write().await;
    if db.employee(id).is_none() {
        return Err(Rejection::not_found("Employee"));
    }
    let payload = parse_object(&body)?;
    let fields = db.validate_employee(&payload, Some(id))?;
    let employee = db
        .employees
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or_else(|| Rejection::not_found("Employee"))?;
    employee.employee_id = fields.employee_id;
    employee.full_name = fields.full_name;
    employee.email = fields.email;
    employee.department = fields.department;
    tracing::info!(%id, "employee updated");
    Ok(Json(employee.clone()))
}

async fn delete_employee(
    State(db): State<SharedDb>,
    Path(id): Path<String>,
) -> Result<StatusCode, Rejection> {
    let id = parse_employee_pk(&id)?;
    let mut db = db.write().await;
    let index = db
        .employees
        .iter()
        .position(|e| e.id == id)
        .ok_or_else(|| Rejection::not_found("Employee"))?;
    db.employees.remove(index);
    db.attendance.retain(|row| row.employee != id);
    tracing::info!(%id, "employee deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

struct AttendanceFields {
    employee: Uuid,
    date: NaiveDate,
    status: String,
}

impl Db {
    fn render(&self, row: &AttendanceRow) -> Attendance {
        Attendance {
            id: row.id,
            employee: row.employee,
            employee_name: self
                .employee(row.employee)
                .map(|e| e.full_name.clone())
                .unwrap_or_default(),
            date: row.date,
            status: row.status.clone(),
        }
    }

    /// Rows matching `keep`, newest date first; same-day rows newest first.
    fn attendance_where(&self, keep: impl Fn(&AttendanceRow) -> bool) -> Vec<Attendance> {
        let mut rows: Vec<&AttendanceRow> = self.attendance.iter().rev().filter(|row| keep(*row)).collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.into_iter().map(|row| self.render(row)).collect()
    }

    fn validate_attendance(
        &self,
        payload: &Map<String, Value>,
        current: Option<u64>,
    ) -> Result<AttendanceFields, Rejection> {
        let mut errors = FieldErrors::default();

        let employee = match payload.get("employee") {
            None => {
                errors.add("employee", "This field is required.");
                None
            }
            Some(Value::Null) => {
                errors.add("employee", "This field may not be null.");
                None
            }
            Some(Value::String(raw)) if raw.is_empty() => {
                errors.add("employee", "This field may not be null.");
                None
            }
            Some(Value::String(raw)) => match Uuid::parse_str(raw) {
                Ok(id) if self.employee(id).is_some() => Some(id),
                Ok(_) => {
                    errors.add(
                        "employee",
                        format!("Invalid pk \"{raw}\" - object does not exist."),
                    );
                    None
                }
                Err(_) => {
                    errors.add("employee", "Incorrect type. Expected pk value, received str.");
                    None
                }
            },
            Some(other) => {
                errors.add(
                    "employee",
                    format!(
                        "Incorrect type. Expected pk value, received {}.",
                        json_type(other)
                    ),
                );
                None
            }
        };

        let date = match payload.get("date") {
            None => {
                errors.add("date", "This field is required.");
                None
            }
            Some(Value::Null) => {
                errors.add("date", "This field may not be null.");
                None
            }
            Some(value) => match value.as_str().map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d")) {
                Some(Ok(date)) => Some(date),
                _ => {
                    errors.add(
                        "date",
                        "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
                    );
                    None
                }
            },
        };

        let status = match payload.get("status") {
            None => {
                errors.add("status", "This field is required.");
                None
            }
            Some(Value::Null) => {
                errors.add("status", "This field may not be null.");
                None
            }
            Some(Value::String(choice)) if STATUS_CHOICES.contains(&choice.as_str()) => {
                Some(choice.clone())
            }
            Some(Value::String(choice)) => {
                errors.add("status", format!("\"{choice}\" is not a valid choice."));
                None
            }
            Some(other) => {
                errors.add("status", format!("\"{other}\" is not a valid choice."));
                None
            }
        };

        if !errors.has("employee") && !errors.has("date") {
            if let (Some(employee), Some(date)) = (employee, date) {
                let taken = self
                    .attendance
                    .iter()
                    .any(|row| Some(row.id) != current && row.employee == employee && row.date == date);
                if taken {
                    errors.add(
                        "non_field_errors",
                        "The fields employee, date must make a unique set.",
                    );
                }
            }
        }
        errors.into_result()?;

        match (employee, date, status) {
            (Some(employee), Some(date), Some(status)) => Ok(AttendanceFields {
                employee,
                date,
                status,
            }),
            _ => Err(Rejection::bad_request(json!({ "detail": "Invalid input." }))),
        }
    }
}

fn parse_attendance_pk(raw: &str) -> Result<u64, Rejection> {
    raw.parse().map_err(|_| Rejection::not_found("Attendance"))
}

async fn list_attendance(State(db): State<SharedDb>) -> Json<Vec<Attendance>> {
    let db = db.read().await;
    Json(db.attendance_where(|_| true))
}

async fn create_attendance(
    State(db): State<SharedDb>,
    body: Bytes,
) -> Result<(StatusCode, Json<Attendance>), Rejection> {
    let payload = parse_object(&body)?;
    let mut db = db.write().await;
    let fields = db.validate_attendance(&payload, None)?;
    db.next_attendance_id += 1;
    let row = AttendanceRow {
        id: db.next_attendance_id,
        employee: fields.employee,
        date: fields.date,
        status: fields.status,
    };
    db.attendance.push(row.clone());
    tracing::info!(id = row.id, employee = %row.employee, date = %row.date, "attendance marked");
    Ok((StatusCode::CREATED, Json(db.render(&row))))
}

/// `/attendance/{uuid}/` lists one employee's history; `/attendance/{int}/`
/// is a single record.
async fn get_attendance(
    State(db): State<SharedDb>,
    Path(key): Path<String>,
) -> Result<Response, Rejection> {
    let db = db.read().await;
    if let Ok(employee) = Uuid::parse_str(&key) {
        return Ok(Json(db.attendance_where(|row| row.employee == employee)).into_response());
    }
    let id = parse_attendance_pk(&key)?;
    db.attendance
        .iter()
        .find(|row| row.id == id)
        .map(|row| Json(db.render(row)).into_response())
        .ok_or_else(|| Rejection::not_found("Attendance"))
}

async fn update_attendance(
    State(db): State<SharedDb>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<Json<Attendance>, Rejection> {
    let id = parse_attendance_pk(&key)?;
    let mut db = db.write().await;
    if !db.attendance.iter().any(|row| row.id == id) {
        return Err(Rejection::not_found("Attendance"));
    }
    let payload = parse_object(&body)?;
    let fields = db.validate_attendance(&payload, Some(id))?;
    let row = db
        .attendance
        .iter_mut()
        .find(|row| row.id == id)
        .ok_or_else(|| Rejection::not_found("Attendance"))?;
    row.employee = fields.employee;
    row.date = fields.date;
    row.status = fields.status;
    let row = row.clone();
    tracing::info!(id, "attendance updated");
    Ok(Json(db.render(&row)))
}

async fn delete_attendance(
    State(db): State<SharedDb>,
    Path(key): Path<String>,
) -> Result<StatusCode, Rejection> {
    let id = parse_attendance_pk(&key)?;
    let mut db = db.write().await;
    let index = db
        .attendance
        .iter()
        .position(|row| row.id == id)
        .ok_or_else(|| Rejection::not_found("Attendance"))?;
    db.attendance.remove(index);
    tracing::info!(id, "attendance deleted");
    Ok(StatusCode::NO_CONTENT)
}
