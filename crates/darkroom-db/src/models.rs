/// Database row types. Each one is built per query and handed straight to the
/// caller; nothing here is cached or mutated afterwards.

/// Role code stored in `User.role` for regular members.
pub const ROLE_REGULAR: i64 = 1;
/// Role code stored in `User.role` for console administrators.
pub const ROLE_ADMIN: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub created_at: String,
    pub photo_count: i64,
    pub comment_count: i64,
    pub like_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRow {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub created_at: String,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub like_count: i64,
    pub comment_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRow {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub user_id: i64,
    pub photo_id: i64,
    pub username: String,
    pub user_profile_image: Option<String>,
    pub photo_url: String,
    pub photo_title: Option<String>,
}

/// A verified login. Never carries the stored password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub created_at: String,
    pub role: i64,
}

impl AccountRow {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Rows removed per table by one committed cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub likes: usize,
    pub comments: usize,
    pub photos: usize,
    pub users: usize,
}

/// Rows in `Photo`, `Comment` and `Like` that still point at a user or photo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct References {
    pub photos: i64,
    pub comments: i64,
    pub likes: i64,
}

impl References {
    pub fn is_empty(&self) -> bool {
        self.photos == 0 && self.comments == 0 && self.likes == 0
    }
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: i64,
    pub profile_image: Option<&'a str>,
    /// `None` lets the column default to the current time.
    pub created_at: Option<&'a str>,
}
