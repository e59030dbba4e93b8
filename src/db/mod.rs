pub mod seed;

use crate::domain::models::{Sprint, SprintStatus, Ticket, TicketStatus, User, UserRole};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

// ========== Users ==========

pub async fn insert_user(
    pool: &PgPool,
    email: &str,
    hash: &str,
    name: Option<&str>,
    role: Option<UserRole>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO users (id, email, hash, name, role)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(hash)
    .bind(name)
    .bind(role)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, hash, name, phone, image, role, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, hash, name, phone, image, role, created_at, updated_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn list_users(pool: &PgPool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, hash, name, phone, image, role, created_at, updated_at
        FROM users
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub async fn list_users_by_role(pool: &PgPool, role: UserRole) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, hash, name, phone, image, role, created_at, updated_at
        FROM users
        WHERE role = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(role)
    .fetch_all(pool)
    .await?;
    Ok(users)
}

/// Returns rows affected so callers can surface not-found.
pub async fn set_user_role(pool: &PgPool, id: Uuid, role: UserRole) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET role = $2, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(role)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn count_users(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

// ========== Sprints ==========

pub async fn insert_sprint(
    pool: &PgPool,
    name: &str,
    status: SprintStatus,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    sprint_week: Option<i32>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO sprints (id, name, status, start_at, end_at, sprint_week)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(status)
    .bind(start_at)
    .bind(end_at)
    .bind(sprint_week)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn list_sprints(pool: &PgPool) -> Result<Vec<Sprint>> {
    let sprints = sqlx::query_as::<_, Sprint>(
        r#"
        SELECT id, name, status, start_at, end_at, sprint_week, created_at
        FROM sprints
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(sprints)
}

pub async fn find_sprint_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Sprint>> {
    let sprint = sqlx::query_as::<_, Sprint>(
        r#"
        SELECT id, name, status, start_at, end_at, sprint_week, created_at
        FROM sprints
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(sprint)
}

pub async fn list_sprints_by_status(pool: &PgPool, status: SprintStatus) -> Result<Vec<Sprint>> {
    let sprints = sqlx::query_as::<_, Sprint>(
        r#"
        SELECT id, name, status, start_at, end_at, sprint_week, created_at
        FROM sprints
        WHERE status = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(sprints)
}

/// Deterministic pick when several sprints are active: earliest start wins,
/// id breaks remaining ties.
pub async fn find_active_sprint(pool: &PgPool) -> Result<Option<Sprint>> {
    let sprint = sqlx::query_as::<_, Sprint>(
        r#"
        SELECT id, name, status, start_at, end_at, sprint_week, created_at
        FROM sprints
        WHERE status = 'active'
        ORDER BY start_at ASC, id ASC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;
    Ok(sprint)
}

/// Full-row write; the caller merges the patch onto the fetched row first.
pub async fn update_sprint(pool: &PgPool, sprint: &Sprint) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE sprints
        SET name = $2,
            status = $3,
            start_at = $4,
            end_at = $5,
            sprint_week = $6
        WHERE id = $1
        "#,
    )
    .bind(sprint.id)
    .bind(&sprint.name)
    .bind(sprint.status)
    .bind(sprint.start_at)
    .bind(sprint.end_at)
    .bind(sprint.sprint_week)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_sprint(pool: &PgPool, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sprints WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// ========== Tickets ==========

const TICKET_COLUMNS: &str = "id, card_id, title, story_points, estimated_days, status, \
     sprint_week, sprint_id, user_id, created_at, completed_at";

#[allow(clippy::too_many_arguments)]
pub async fn insert_ticket(
    pool: &PgPool,
    card_id: &str,
    title: &str,
    story_points: i32,
    estimated_days: f64,
    status: TicketStatus,
    sprint_week: i32,
    sprint_id: Uuid,
    user_id: Uuid,
    completed_at: Option<DateTime<Utc>>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO tickets
            (id, card_id, title, story_points, estimated_days, status,
             sprint_week, sprint_id, user_id, completed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(id)
    .bind(card_id)
    .bind(title)
    .bind(story_points)
    .bind(estimated_days)
    .bind(status)
    .bind(sprint_week)
    .bind(sprint_id)
    .bind(user_id)
    .bind(completed_at)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn list_tickets(pool: &PgPool) -> Result<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(tickets)
}

pub async fn find_ticket_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Ticket>> {
    let ticket = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(ticket)
}

pub async fn list_tickets_by_sprint(pool: &PgPool, sprint_id: Uuid) -> Result<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets WHERE sprint_id = $1 ORDER BY created_at ASC"
    ))
    .bind(sprint_id)
    .fetch_all(pool)
    .await?;
    Ok(tickets)
}

pub async fn list_tickets_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets WHERE user_id = $1 ORDER BY created_at ASC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(tickets)
}

pub async fn list_tickets_by_status(pool: &PgPool, status: TicketStatus) -> Result<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets WHERE status = $1 ORDER BY created_at ASC"
    ))
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(tickets)
}

pub async fn list_tickets_by_sprint_and_status(
    pool: &PgPool,
    sprint_id: Uuid,
    status: TicketStatus,
) -> Result<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets WHERE sprint_id = $1 AND status = $2 ORDER BY created_at ASC"
    ))
    .bind(sprint_id)
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(tickets)
}

/// Full-row write; the caller merges the patch (and the completion rule)
/// onto the fetched row first.
pub async fn update_ticket(pool: &PgPool, ticket: &Ticket) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE tickets
        SET card_id = $2,
            title = $3,
            story_points = $4,
            estimated_days = $5,
            status = $6,
            sprint_week = $7,
            sprint_id = $8,
            user_id = $9,
            completed_at = $10
        WHERE id = $1
        "#,
    )
    .bind(ticket.id)
    .bind(&ticket.card_id)
    .bind(&ticket.title)
    .bind(ticket.story_points)
    .bind(ticket.estimated_days)
    .bind(ticket.status)
    .bind(ticket.sprint_week)
    .bind(ticket.sprint_id)
    .bind(ticket.user_id)
    .bind(ticket.completed_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_ticket(pool: &PgPool, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
