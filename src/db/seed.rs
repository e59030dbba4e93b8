use crate::db;
use crate::domain::models::UserRole;
use anyhow::Result;
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand_core::OsRng;
use sqlx::PgPool;

/// Provision a first PM account when the users table is empty, so the
/// very first login is possible. Controlled by BOOTSTRAP_EMAIL and
/// BOOTSTRAP_PASSWORD; silently skipped when either is unset.
pub async fn seed_bootstrap_user(pool: &PgPool) -> Result<()> {
    let (email, password) = match (
        std::env::var("BOOTSTRAP_EMAIL"),
        std::env::var("BOOTSTRAP_PASSWORD"),
    ) {
        (Ok(email), Ok(password)) => (email, password),
        _ => {
            tracing::debug!("No bootstrap credentials configured, skipping seed");
            return Ok(());
        }
    };

    if db::count_users(pool).await? > 0 {
        return Ok(());
    }

    let email = email.trim().to_lowercase();
    let name = std::env::var("BOOTSTRAP_NAME").unwrap_or_else(|_| "Project Manager".to_string());

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash bootstrap password: {}", e))?
        .to_string();

    let id = db::insert_user(pool, &email, &hash, Some(&name), Some(UserRole::Pm)).await?;
    tracing::info!("Seeded bootstrap PM account {} ({})", email, id);

    Ok(())
}
