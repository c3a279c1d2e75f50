use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Privilege level of a service account. Only admins may use the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Regular,
    Admin,
}

impl Role {
    /// Map the integer stored in `User.role`. Anything other than `2` is a
    /// regular member.
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Role::Admin,
            _ => Role::Regular,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Role::Regular => 1,
            Role::Admin => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub photo_count: i64,
    pub comment_count: i64,
    pub like_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub like_count: i64,
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub photo_id: i64,
    pub username: String,
    pub user_profile_image: Option<String>,
    pub photo_url: String,
    pub photo_title: Option<String>,
}

/// The signed-in administrator as returned by login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_codes() {
        assert_eq!(Role::from_code(2), Role::Admin);
        assert_eq!(Role::from_code(1), Role::Regular);
        assert_eq!(Role::from_code(0), Role::Regular);
        assert_eq!(Role::Admin.code(), 2);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"regular\"").unwrap();
        assert_eq!(role, Role::Regular);
    }
}
