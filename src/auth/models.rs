//! Shared service-layer result and caller-context types.

use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Uniform soft-failure result returned by every service operation.
///
/// Business-rule violations (wrong password, duplicate roles, locked
/// account) are communicated through this type rather than raised as errors,
/// so the boundary layer can map them to responses without catching
/// anything. Exactly one error string is carried per failure; the payload is
/// present only on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResult<T = ()> {
    pub success: bool,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T> ServiceResult<T> {
    /// Successful outcome carrying a payload.
    pub fn ok(result: T) -> Self {
        Self { success: true, errors: Vec::new(), result: Some(result) }
    }

    /// Failed outcome with a single human-readable message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, errors: vec![message.into()], result: None }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl ServiceResult<()> {
    /// Successful outcome with no payload.
    pub fn ok_empty() -> Self {
        Self { success: true, errors: Vec::new(), result: None }
    }
}

/// Identity of the authenticated caller, extracted from a verified token by
/// the API middleware and handed to role-gated operations.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: UserId,
    pub name: String,
    pub roles: Vec<String>,
}

impl AuthContext {
    /// Check whether the caller holds `role`, matched case-insensitively.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}
