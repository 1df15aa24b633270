use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};

/// Configurable lockout policy applied to password logins.
#[derive(Debug, Clone, Copy)]
pub struct LoginPolicy {
    pub max_attempts: i32,
    pub lock_duration: Duration,
}

impl LoginPolicy {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            max_attempts: config.max_login_attempts,
            lock_duration: Duration::minutes(config.lock_duration_minutes),
        }
    }
}

/// The slice of an identity row the login policy operates on.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub is_active: bool,
    pub login_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
}

impl AccountState {
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.map(|until| until > now).unwrap_or(false)
    }
}

/// Field updates to persist after a failed password check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureUpdate {
    pub login_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
}

/// Checks run before any password comparison. The lock check comes first so
/// a locked account answers 423 regardless of the submitted password.
pub fn preflight(state: &AccountState, now: DateTime<Utc>) -> Result<()> {
    if state.is_locked(now) {
        return Err(Error::AccountLocked);
    }
    if !state.is_active {
        return Err(Error::AccountInactive);
    }
    Ok(())
}

/// A failed match increments the counter; hitting the threshold engages the
/// lock, so the threshold-th attempt itself still reports bad credentials
/// and only the next request sees 423.
pub fn register_failure(
    state: &AccountState,
    policy: &LoginPolicy,
    now: DateTime<Utc>,
) -> FailureUpdate {
    let attempts = state.login_attempts + 1;
    let lock_until = if attempts >= policy.max_attempts {
        Some(now + policy.lock_duration)
    } else {
        None
    };
    FailureUpdate {
        login_attempts: attempts,
        lock_until,
    }
}

/// A successful login clears failure state only when there is any; the
/// last-login stamp is recorded either way.
pub fn needs_reset(state: &AccountState) -> bool {
    state.login_attempts > 0 || state.lock_until.is_some()
}
