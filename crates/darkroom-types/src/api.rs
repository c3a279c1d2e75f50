use serde::{Deserialize, Serialize};

use crate::models::{Account, Role};

// -- Session claims --

/// Claims of the console session token. Holding a valid, unexpired token with
/// `role: admin` is what "logged in" means for the console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: Account,
    pub token: String,
}

// -- Deletes --

/// Rows removed by a cascading delete, per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedRows {
    pub likes: usize,
    pub comments: usize,
    pub photos: usize,
    pub users: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CascadeDeleteResponse {
    pub deleted: DeletedRows,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentDeleteResponse {
    pub deleted: usize,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}
