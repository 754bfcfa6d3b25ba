use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum VisitStatus {
        Planned => "planned",
        OnProgress => "on_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl VisitStatus {
    /// Completed and cancelled visits accept no further lifecycle steps.
    pub fn is_terminal(&self) -> bool {
        matches!(self, VisitStatus::Completed | VisitStatus::Cancelled)
    }
}

impl Default for VisitStatus {
    fn default() -> Self {
        VisitStatus::Planned
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CheckInLocation {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: Uuid,
    pub company_id: Uuid,
    pub team_id: Uuid,
    pub customer_id: Uuid,
    pub date_planned: NaiveDate,
    pub status: VisitStatus,
    pub check_in_location: Option<CheckInLocation>,
    pub note: Option<String>,
    pub date_completed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVisit {
    pub company_id: Uuid,
    pub team_id: Uuid,
    pub customer_id: Uuid,
    pub date_planned: NaiveDate,
}

/// Field-level write. `None` leaves a column untouched; for nullable columns
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitPatch {
    pub team_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub date_planned: Option<NaiveDate>,
    pub status: Option<VisitStatus>,
    pub check_in_location: Option<Option<CheckInLocation>>,
    pub note: Option<Option<String>>,
    pub date_completed: Option<Option<DateTime<Utc>>>,
}

impl VisitPatch {
    pub fn is_empty(&self) -> bool {
        *self == VisitPatch::default()
    }

    pub fn apply(self, visit: &mut Visit, now: DateTime<Utc>) {
        if let Some(team_id) = self.team_id {
            visit.team_id = team_id;
        }
        if let Some(customer_id) = self.customer_id {
            visit.customer_id = customer_id;
        }
        if let Some(date_planned) = self.date_planned {
            visit.date_planned = date_planned;
        }
        if let Some(status) = self.status {
            visit.status = status;
        }
        if let Some(location) = self.check_in_location {
            visit.check_in_location = location;
        }
        if let Some(note) = self.note {
            visit.note = note;
        }
        if let Some(date_completed) = self.date_completed {
            visit.date_completed = date_completed;
        }
        visit.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitInput {
    pub team_id: Uuid,
    pub customer_id: Uuid,
    pub date_planned: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleVisitInput {
    pub team_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub date_planned: Option<NaiveDate>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Unrestricted admin patch, status included.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitOverrideInput {
    pub team_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub date_planned: Option<NaiveDate>,
    pub status: Option<VisitStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub check_in_location: Option<Option<CheckInLocation>>,
    #[serde(default, deserialize_with = "double_option")]
    pub note: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub date_completed: Option<Option<DateTime<Utc>>>,
}

impl From<VisitOverrideInput> for VisitPatch {
    fn from(input: VisitOverrideInput) -> Self {
        Self {
            team_id: input.team_id,
            customer_id: input.customer_id,
            date_planned: input.date_planned,
            status: input.status,
            check_in_location: input.check_in_location,
            note: input.note,
            date_completed: input.date_completed,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PositionUnavailable {
    Unsupported,
    Denied,
    Timeout,
}

/// Outcome of the device's single-shot position request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionReport {
    Fix { lat: f64, lng: f64 },
    Unavailable { reason: PositionUnavailable },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInInput {
    pub position: PositionReport,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteInput {
    pub note: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitQuery {
    pub team_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub status: Option<VisitStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayPanel {
    pub date: NaiveDate,
    pub visits: Vec<Visit>,
    pub completed_count: usize,
    pub total_count: usize,
    pub progress_percent: f64,
}

impl TodayPanel {
    pub fn new(date: NaiveDate, visits: Vec<Visit>) -> Self {
        let total_count = visits.len();
        let completed_count = visits
            .iter()
            .filter(|v| v.status == VisitStatus::Completed)
            .count();
        let progress_percent = if total_count > 0 {
            completed_count as f64 / total_count as f64 * 100.0
        } else {
            0.0
        };

        Self {
            date,
            visits,
            completed_count,
            total_count,
            progress_percent,
        }
    }
}
