use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::warn;

use darkroom_types::api::Claims;
use darkroom_types::models::Role;

use crate::AppState;
use crate::error::ApiError;

/// Require a valid session token whose role is admin. The decoded claims are
/// made available to handlers as an extension.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!("Rejected session token: {}", e);
        ApiError::Unauthorized
    })?;

    if token_data.claims.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}
