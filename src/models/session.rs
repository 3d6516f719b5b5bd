use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Verified caller identity, built per request from the bearer token and
/// passed explicitly to every wallet operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl Session {
    pub fn new(user_id: Uuid, email: Option<String>) -> Self {
        let email = email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        Self { user_id, email }
    }

    /// Deposits need an email for the gateway checkout.
    pub fn require_email(&self) -> Result<&str> {
        self.email.as_deref().ok_or_else(|| {
            AppError::BadRequest(
                "No email found for your account. Please update your profile.".to_string(),
            )
        })
    }
}
