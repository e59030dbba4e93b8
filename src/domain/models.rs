use crate::domain::patch::Patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    #[serde(rename = "PM")]
    Pm,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "sprint_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    Active,
    Done,
    Upcoming,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum TicketStatus {
    Todo,
    InProgress,
    Done,
}

impl TicketStatus {
    pub fn is_done(self) -> bool {
        matches!(self, TicketStatus::Done)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hash: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub role: Option<UserRole>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sprint {
    pub id: Uuid,
    pub name: String,
    pub status: SprintStatus,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub sprint_week: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Sprint {
    /// Number of weeks in the sprint; unset means a one-week sprint.
    pub fn total_weeks(&self) -> i32 {
        self.sprint_week.unwrap_or(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub card_id: String,
    pub title: String,
    pub story_points: i32,
    pub estimated_days: f64,
    pub status: TicketStatus,
    pub sprint_week: i32,
    pub sprint_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// completed_at is derived from status: stamped on entering done (re-stamped
/// on done -> done), cleared on leaving it.
pub fn completion_stamp(status: TicketStatus, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if status.is_done() {
        Some(now)
    } else {
        None
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintPatch {
    pub name: Option<String>,
    pub status: Option<SprintStatus>,
    /// Unix milliseconds.
    pub start: Option<i64>,
    /// Unix milliseconds.
    pub end: Option<i64>,
    #[serde(default)]
    pub sprint_week: Patch<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    pub card_id: Option<String>,
    pub title: Option<String>,
    pub story_points: Option<i32>,
    pub estimated_days: Option<f64>,
    pub status: Option<TicketStatus>,
    pub sprint_week: Option<i32>,
    #[serde(rename = "sprintID")]
    pub sprint_id: Option<Uuid>,
    #[serde(rename = "userID")]
    pub user_id: Option<Uuid>,
}

impl TicketPatch {
    /// Merge onto the current row. Needs the prior row (read-before-write)
    /// so untouched fields survive and the completion rule sees the prior
    /// completed_at when status is left alone.
    pub fn apply(&self, current: &Ticket, now: DateTime<Utc>) -> Ticket {
        let status = self.status.unwrap_or(current.status);
        let completed_at = match self.status {
            Some(new_status) => completion_stamp(new_status, now),
            None => current.completed_at,
        };
        Ticket {
            id: current.id,
            card_id: self.card_id.clone().unwrap_or_else(|| current.card_id.clone()),
            title: self.title.clone().unwrap_or_else(|| current.title.clone()),
            story_points: self.story_points.unwrap_or(current.story_points),
            estimated_days: self.estimated_days.unwrap_or(current.estimated_days),
            status,
            sprint_week: self.sprint_week.unwrap_or(current.sprint_week),
            sprint_id: self.sprint_id.unwrap_or(current.sprint_id),
            user_id: self.user_id.unwrap_or(current.user_id),
            created_at: current.created_at,
            completed_at,
        }
    }
}
