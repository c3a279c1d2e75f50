use axum::{Json, extract::State};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};

use darkroom_db::DbError;
use darkroom_types::api::{Claims, LoginRequest, LoginResponse};
use darkroom_types::models::{Account, Role};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, convert, run_db};

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = req.email.trim().to_string();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::MissingFields);
    }

    let password = req.password;
    let lookup = email.clone();
    let row = run_db(&state, move |db| db.verify_login(&lookup, &password))
        .await
        .inspect_err(|e| {
            if matches!(e, ApiError::Db(DbError::Authentication)) {
                warn!("Failed console login for {}", email);
            }
        })?;

    let account = convert::account(row);
    if account.role != Role::Admin {
        warn!("User {} is not an admin, console access refused", account.id);
        return Err(ApiError::Forbidden);
    }

    let token = create_token(&state, &account)?;
    info!("Admin {} signed in", account.id);

    Ok(Json(LoginResponse {
        user: account,
        token,
    }))
}

pub fn create_token(state: &AppState, account: &Account) -> ApiResult<String> {
    let claims = Claims {
        sub: account.id,
        email: account.email.clone(),
        role: account.role,
        exp: (chrono::Utc::now() + state.session_ttl).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {}", e)))
}
