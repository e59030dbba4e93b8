//! In-memory sliding-window limiter for the login endpoint. One instance
//! lives in AppState so the window survives across requests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct RateLimiter {
    attempts: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
    max_attempts: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window_secs: u64) -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
            max_attempts,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Record an attempt for the identifier (an IP here) and report whether
    /// it is still within the window's budget.
    pub async fn check(&self, identifier: &str) -> bool {
        let now = Instant::now();
        let mut attempts = self.attempts.write().await;

        let history = attempts.entry(identifier.to_string()).or_default();
        history.retain(|&at| now.duration_since(at) < self.window);

        if history.len() < self.max_attempts {
            history.push(now);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocks_after_budget_is_spent() {
        let limiter = RateLimiter::new(3, 60);

        assert!(limiter.check("10.0.0.1").await);
        assert!(limiter.check("10.0.0.1").await);
        assert!(limiter.check("10.0.0.1").await);
        assert!(!limiter.check("10.0.0.1").await);

        // Separate identifiers keep separate budgets.
        assert!(limiter.check("10.0.0.2").await);
    }

    #[tokio::test]
    async fn window_expiry_frees_the_budget() {
        let limiter = RateLimiter::new(1, 1);

        assert!(limiter.check("10.0.0.1").await);
        assert!(!limiter.check("10.0.0.1").await);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(limiter.check("10.0.0.1").await);
    }
}
