use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use darkroom_db::DbError;
use darkroom_types::api::ErrorBody;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied. Admin privileges required.")]
    Forbidden,

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Db(DbError::Authentication) => StatusCode::UNAUTHORIZED,
            ApiError::Db(e) if e.is_connection() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Db(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            ApiError::Db(DbError::Transaction(e)) => {
                error!("Delete rolled back: {}", e);
                format!("Delete failed and was rolled back: {}", e)
            }
            ApiError::Db(DbError::Authentication) => self.to_string(),
            ApiError::Db(e) => {
                error!("Database error: {}", e);
                e.to_string()
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(ErrorBody {
            error: message,
            status: status.as_u16(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_maps_to_401_with_fixed_message() {
        let err = ApiError::from(DbError::Authentication);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "invalid email or password");
    }

    #[test]
    fn poisoned_lock_is_unavailable() {
        assert_eq!(
            ApiError::from(DbError::Poisoned).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn forbidden_uses_console_copy() {
        assert_eq!(
            ApiError::Forbidden.to_string(),
            "Access denied. Admin privileges required."
        );
    }
}
