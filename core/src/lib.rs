//! Synchronous API client core for the HRMS service.
//!
//! # Overview
//! Keeps in-memory lists of employees and attendance records in step with a
//! REST backend. Requests are built and responses parsed as plain data; a
//! `Transport` performs the round-trip (host-does-IO), so every rule below
//! is testable without a network.
//!
//! # Design
//! - `HrmsClient` is stateless: it holds only `base_url`, builds requests
//!   and turns responses into typed values or a normalized `ApiError`.
//! - `ResourceStore` is the ordered list a view renders.
//! - `Collection` applies creates, updates and deletes to a store. Deletes
//!   are optimistic and reconciled with the server when they fail.
//! - Every failure reaches the caller as one human-readable message.

pub mod client;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod mock;
pub mod resource;
pub mod store;
pub mod transport;
pub mod types;

pub use client::HrmsClient;
pub use config::{ClientConfig, ConfigError};
pub use controller::{
    Collection, MutationError, MutationState, Notice, NoticeLevel, PendingDelete, Reconciliation,
};
pub use dashboard::{load_dashboard, DashboardStats};
pub use error::{extract_message, ApiError, GENERIC_ERROR_MESSAGE};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use resource::Resource;
pub use store::{LoadState, ResourceStore};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{Attendance, AttendanceInput, AttendanceStatus, Employee, EmployeeInput};
