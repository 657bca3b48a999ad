//! Rate Limiter
//!
//! In-memory sliding-window limiter keyed by (operation class, subject).
//! This is abuse damping, not an authoritative quota: state lives only
//! in this process and resets as windows roll forward. The limiter is
//! constructed and injected rather than kept in a global so tests can
//! run with their own instance and policies.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::domain::{DomainError, DomainResult};

/// Operation class a mutation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Create,
    Update,
    Delete,
}

impl OpClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpClass::Create => "create",
            OpClass::Update => "update",
            OpClass::Delete => "delete",
        }
    }
}

/// Maximum requests per rolling window
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub max_requests: usize,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub const fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

/// Sliding-window request counter, one window per key
pub struct RateLimiter {
    create: RateLimitPolicy,
    update: RateLimitPolicy,
    delete: RateLimitPolicy,
    // One short lock per check keeps the count atomic under
    // interleaved calls; never held across an await.
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::with_policies(
            RateLimitPolicy::new(20, Duration::from_secs(60)),
            RateLimitPolicy::new(60, Duration::from_secs(60)),
            RateLimitPolicy::new(30, Duration::from_secs(60)),
        )
    }
}

impl RateLimiter {
    pub fn with_policies(
        create: RateLimitPolicy,
        update: RateLimitPolicy,
        delete: RateLimitPolicy,
    ) -> Self {
        Self {
            create,
            update,
            delete,
            hits: Mutex::new(HashMap::new()),
        }
    }

    fn policy(&self, class: OpClass) -> RateLimitPolicy {
        match class {
            OpClass::Create => self.create,
            OpClass::Update => self.update,
            OpClass::Delete => self.delete,
        }
    }

    /// Records one request under `key` and rejects it when the class
    /// policy is exhausted. Rejection is terminal for the attempt; the
    /// caller must not queue a retry.
    pub fn check(&self, class: OpClass, key: &str) -> DomainResult<()> {
        self.check_at(class, key, Instant::now())
    }

    fn check_at(&self, class: OpClass, key: &str, now: Instant) -> DomainResult<()> {
        let policy = self.policy(class);
        let mut hits = self.hits.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let window = hits.entry(key.to_string()).or_default();
        while let Some(oldest) = window.front() {
            if now.duration_since(*oldest) >= policy.window {
                window.pop_front();
            } else {
                break;
            }
        }
        if window.len() >= policy.max_requests {
            let retry_after = window
                .front()
                .map(|oldest| policy.window.saturating_sub(now.duration_since(*oldest)));
            let message = format!(
                "too many {} requests: limit is {} per {}s, try again shortly",
                class.as_str(),
                policy.max_requests,
                policy.window.as_secs()
            );
            log::warn!("rate limit hit for {}", key);
            return Err(DomainError::RateLimited {
                message,
                retry_after_secs: retry_after.map(|d| d.as_secs()),
            });
        }
        window.push_back(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: usize, window_secs: u64) -> RateLimiter {
        let policy = RateLimitPolicy::new(max, Duration::from_secs(window_secs));
        RateLimiter::with_policies(policy, policy, policy)
    }

    #[test]
    fn test_nth_plus_one_call_rejected() {
        let limiter = limiter(3, 60);
        for _ in 0..3 {
            assert!(limiter.check(OpClass::Create, "data:create:alice").is_ok());
        }
        let err = limiter
            .check(OpClass::Create, "data:create:alice")
            .unwrap_err();
        match err {
            DomainError::RateLimited {
                retry_after_secs, ..
            } => {
                assert!(retry_after_secs.unwrap_or(0) <= 60);
            }
            other => panic!("expected RateLimited, got {:?}", other),
        }
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter(1, 60);
        assert!(limiter.check(OpClass::Create, "data:create:alice").is_ok());
        assert!(limiter.check(OpClass::Create, "data:create:bob").is_ok());
        assert!(limiter.check(OpClass::Create, "data:create:alice").is_err());
    }

    #[test]
    fn test_window_rolls_forward() {
        let limiter = limiter(1, 10);
        let start = Instant::now();
        assert!(limiter.check_at(OpClass::Update, "data:update:alice", start).is_ok());
        assert!(limiter
            .check_at(OpClass::Update, "data:update:alice", start + Duration::from_secs(5))
            .is_err());
        assert!(limiter
            .check_at(OpClass::Update, "data:update:alice", start + Duration::from_secs(10))
            .is_ok());
    }

    #[test]
    fn test_classes_have_distinct_policies() {
        let create = RateLimitPolicy::new(1, Duration::from_secs(60));
        let update = RateLimitPolicy::new(2, Duration::from_secs(60));
        let limiter = RateLimiter::with_policies(create, update, create);
        assert!(limiter.check(OpClass::Create, "data:create:alice").is_ok());
        assert!(limiter.check(OpClass::Create, "data:create:alice").is_err());
        assert!(limiter.check(OpClass::Update, "data:update:alice").is_ok());
        assert!(limiter.check(OpClass::Update, "data:update:alice").is_ok());
        assert!(limiter.check(OpClass::Update, "data:update:alice").is_err());
    }
}
