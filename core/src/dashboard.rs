//! Headline numbers for the landing page.

use chrono::{NaiveDate, Utc};

use crate::client::HrmsClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{Attendance, AttendanceStatus, Employee};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_employees: usize,
    pub present_today: usize,
    pub total_records: usize,
}

impl DashboardStats {
    pub fn compute(employees: &[Employee], attendance: &[Attendance], today: NaiveDate) -> Self {
        let present_today = attendance
            .iter()
            .filter(|record| record.date == today && record.status == AttendanceStatus::Present)
            .count();
        Self {
            total_employees: employees.len(),
            present_today,
            total_records: attendance.len(),
        }
    }
}

/// Today's calendar date in UTC, which is what "today" means for
/// attendance counts.
pub fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Fetch both lists and compute the stats for `today`.
pub fn load_dashboard<T>(
    client: &HrmsClient,
    transport: &T,
    today: NaiveDate,
) -> Result<DashboardStats, ApiError>
where
    T: Transport + ?Sized,
{
    let employees: Vec<Employee> = client.parse_list(transport.execute(client.build_list::<Employee>())?)?;
    let attendance: Vec<Attendance> =
        client.parse_list(transport.execute(client.build_list::<Attendance>())?)?;
    tracing::debug!(
        employees = employees.len(),
        records = attendance.len(),
        "dashboard lists loaded"
    );
    Ok(DashboardStats::compute(&employees, &attendance, today))
}
