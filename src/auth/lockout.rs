//! Failed-login lockout policy.
//!
//! Pure decision logic consumed by the auth service during login. The policy
//! never decrements the counter and never reactivates an account; the
//! Locked -> Active transition belongs exclusively to the administrative
//! unlock operation.

/// Failed attempts after which an account is deactivated.
pub const MAX_FAILED_LOGIN_ATTEMPTS: u32 = 5;

/// Outcome of applying the lockout policy to one login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutDecision {
    /// Counter value the account should carry after this attempt.
    pub failed_attempts: u32,
    /// True exactly when this attempt crossed the lockout threshold.
    pub lock_account: bool,
}

/// Apply the lockout policy to a login attempt.
///
/// A valid password leaves the counter untouched. An invalid password
/// increments it; the account locks when the incremented value reaches
/// [`MAX_FAILED_LOGIN_ATTEMPTS`], and only then.
pub fn evaluate(failed_attempts: u32, password_valid: bool) -> LockoutDecision {
    if password_valid {
        return LockoutDecision { failed_attempts, lock_account: false };
    }

    let incremented = failed_attempts.saturating_add(1);
    LockoutDecision {
        failed_attempts: incremented,
        lock_account: incremented == MAX_FAILED_LOGIN_ATTEMPTS,
    }
}

/// Login attempts left before the account locks.
pub fn attempts_remaining(failed_attempts: u32) -> u32 {
    MAX_FAILED_LOGIN_ATTEMPTS.saturating_sub(failed_attempts)
}
