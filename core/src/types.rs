//! Domain DTOs for the HRMS API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any schema drift between the two crates.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An employee record as returned by `/employees/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Employee {
    pub id: Uuid,
    pub employee_id: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Case-insensitive search over name and employee id, as used by the
    /// employee list filter. An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.full_name.to_lowercase().contains(&query)
            || self.employee_id.to_lowercase().contains(&query)
    }

    /// Label shown in the attendance form's employee picker.
    pub fn option_label(&self) -> String {
        format!("{} ({})", self.full_name, self.employee_id)
    }

    /// The form payload that would recreate this employee's editable fields.
    pub fn to_input(&self) -> EmployeeInput {
        EmployeeInput {
            full_name: self.full_name.clone(),
            employee_id: self.employee_id.clone(),
            email: self.email.clone(),
            department: self.department.clone(),
        }
    }
}

/// Body of `POST /employees/` and `PUT /employees/{id}/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmployeeInput {
    pub full_name: String,
    pub employee_id: String,
    pub email: String,
    pub department: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Present => f.write_str("Present"),
            AttendanceStatus::Absent => f.write_str("Absent"),
        }
    }
}

/// An attendance record as returned by `/attendance/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attendance {
    pub id: u64,
    pub employee: Uuid,
    pub employee_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Body of `POST /attendance/`.
///
/// `employee` holds the raw picker selection; an empty string means nothing
/// was selected and is rejected before any request is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttendanceInput {
    pub employee: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl AttendanceInput {
    pub fn new(employee: impl Into<String>, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            employee: employee.into(),
            date,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> Employee {
        Employee {
            id: Uuid::nil(),
            employee_id: "EMP009".to_string(),
            full_name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            department: "Sales".to_string(),
            created_at: "2025-01-02T03:04:05.678901Z".parse().unwrap(),
        }
    }

    #[test]
    fn employee_parses_drf_timestamp() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "employee_id": "EMP001",
            "full_name": "John Doe",
            "email": "john@example.com",
            "department": "Engineering",
            "created_at": "2025-03-01T09:30:00.123456Z"
        }"#;
        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.employee_id, "EMP001");
        assert_eq!(employee.created_at.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn search_matches_name_or_employee_id_ignoring_case() {
        let employee = jane();
        assert!(employee.matches("jane"));
        assert!(employee.matches("emp00"));
        assert!(employee.matches(""));
        assert!(!employee.matches("sales"));
    }

    #[test]
    fn option_label_shows_name_and_code() {
        assert_eq!(jane().option_label(), "Jane Doe (EMP009)");
    }

    #[test]
    fn attendance_status_serializes_verbatim() {
        let input = AttendanceInput::new(
            "00000000-0000-0000-0000-000000000001",
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            AttendanceStatus::Absent,
        );
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["status"], "Absent");
        assert_eq!(json["date"], "2025-03-01");
    }

    #[test]
    fn attendance_rejects_unknown_status() {
        let json = r#"{"id":1,"employee":"00000000-0000-0000-0000-000000000001","employee_name":"x","date":"2025-03-01","status":"Late"}"#;
        assert!(serde_json::from_str::<Attendance>(json).is_err());
    }
}
