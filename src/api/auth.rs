use axum::{extract::State, http::HeaderMap, Json};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{ApiResponse, Session},
};

use super::{require_session, AppState};

// ==================== REQUEST/RESPONSE TYPES ====================

/// Claims of an access token issued by the auth provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user uuid
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
}

// ==================== HANDLERS ====================

/// GET /api/v1/auth/session
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<SessionResponse>>> {
    let session = require_session(&headers, &state).await?;
    Ok(Json(ApiResponse::success(SessionResponse {
        user_id: session.user_id,
        email: session.email,
    })))
}

// ==================== HELPER FUNCTIONS ====================

pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| AppError::AuthError("Missing Authorization header".to_string()))?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::AuthError("Invalid Authorization header".to_string()))?;
    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::AuthError("Invalid Authorization scheme".to_string()))
}

pub fn session_from_token(token: &str, secret: &str, audience: &str) -> Result<Session> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("Rejected access token: {}", e);
        AppError::AuthError("Invalid or expired token".to_string())
    })?;

    let user_id = Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

    Ok(Session::new(user_id, token_data.claims.email))
}
