//! The `Resource` trait: what the store and controller need to know about
//! an entity type.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::types::{Attendance, AttendanceInput, Employee, EmployeeInput};

/// A server-owned entity addressable by a stable id.
pub trait Resource: DeserializeOwned + Clone + fmt::Debug {
    type Id: Clone + PartialEq + fmt::Display + fmt::Debug;
    /// Payload of create and update requests.
    type Input: Serialize + fmt::Debug;

    /// Collection path segment under the base URL, e.g. `employees`.
    const COLLECTION: &'static str;

    fn id(&self) -> &Self::Id;

    /// Client-side checks run before any request is built. The error string
    /// is shown to the user as-is.
    fn validate(_input: &Self::Input) -> Result<(), String> {
        Ok(())
    }

    fn created_message() -> String;
    fn updated_message() -> String;
    fn deleted_message() -> String;
    fn save_failed_message() -> String;
    fn delete_failed_message() -> String;
    fn load_failed_message() -> String;
}

impl Resource for Employee {
    type Id = Uuid;
    type Input = EmployeeInput;

    const COLLECTION: &'static str = "employees";

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn created_message() -> String {
        "Employee created successfully".to_string()
    }

    fn updated_message() -> String {
        "Employee updated successfully".to_string()
    }

    fn deleted_message() -> String {
        "Employee deleted successfully".to_string()
    }

    fn save_failed_message() -> String {
        "Failed to save employee".to_string()
    }

    fn delete_failed_message() -> String {
        "Failed to delete employee".to_string()
    }

    fn load_failed_message() -> String {
        "Failed to load employees".to_string()
    }
}

impl Resource for Attendance {
    type Id = u64;
    type Input = AttendanceInput;

    const COLLECTION: &'static str = "attendance";

    fn id(&self) -> &u64 {
        &self.id
    }

    fn validate(input: &AttendanceInput) -> Result<(), String> {
        if input.employee.trim().is_empty() {
            return Err("Select an employee".to_string());
        }
        Ok(())
    }

    fn created_message() -> String {
        "Attendance marked successfully".to_string()
    }

    fn updated_message() -> String {
        "Attendance updated successfully".to_string()
    }

    fn deleted_message() -> String {
        "Attendance deleted successfully".to_string()
    }

    fn save_failed_message() -> String {
        "Failed to mark attendance".to_string()
    }

    fn delete_failed_message() -> String {
        "Failed to delete attendance".to_string()
    }

    fn load_failed_message() -> String {
        "Failed to load attendance".to_string()
    }
}
