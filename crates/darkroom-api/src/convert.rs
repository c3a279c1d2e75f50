use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use darkroom_db::models::{AccountRow, CascadeSummary, CommentRow, PhotoRow, UserRow};
use darkroom_types::api::DeletedRows;
use darkroom_types::models::{Account, Comment, Photo, Role, User};

/// Parse a stored `createdAt`. The service writes RFC 3339 or SQLite's
/// `YYYY-MM-DD HH:MM:SS[.fff]` without a zone, which is UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

fn created_at(raw: &str, kind: &str, id: i64) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(|| {
        warn!("Corrupt createdAt '{}' on {} {}", raw, kind, id);
        DateTime::default()
    })
}

pub fn user(row: UserRow) -> User {
    User {
        created_at: created_at(&row.created_at, "user", row.id),
        id: row.id,
        username: row.username,
        email: row.email,
        profile_image: row.profile_image,
        photo_count: row.photo_count,
        comment_count: row.comment_count,
        like_count: row.like_count,
    }
}

pub fn photo(row: PhotoRow) -> Photo {
    Photo {
        created_at: created_at(&row.created_at, "photo", row.id),
        id: row.id,
        url: row.url,
        title: row.title,
        user_id: row.user_id,
        username: row.username,
        email: row.email,
        like_count: row.like_count,
        comment_count: row.comment_count,
    }
}

pub fn comment(row: CommentRow) -> Comment {
    Comment {
        created_at: created_at(&row.created_at, "comment", row.id),
        id: row.id,
        content: row.content,
        user_id: row.user_id,
        photo_id: row.photo_id,
        username: row.username,
        user_profile_image: row.user_profile_image,
        photo_url: row.photo_url,
        photo_title: row.photo_title,
    }
}

pub fn account(row: AccountRow) -> Account {
    Account {
        role: Role::from_code(row.role),
        id: row.id,
        username: row.username,
        email: row.email,
        profile_image: row.profile_image,
    }
}

pub fn deleted_rows(summary: CascadeSummary) -> DeletedRows {
    DeletedRows {
        likes: summary.likes,
        comments: summary.comments,
        photos: summary.photos,
        users: summary.users,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_sqlite_datetime() {
        let ts = parse_timestamp("2024-03-09 17:45:12").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 3, 9));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (17, 45, 12));
    }

    #[test]
    fn parses_fractional_seconds_and_rfc3339() {
        assert!(parse_timestamp("2024-03-09 17:45:12.250").is_some());
        let ts = parse_timestamp("2024-03-09T17:45:12+02:00").unwrap();
        assert_eq!(ts.hour(), 15);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_timestamp("yesterday").is_none());
    }
}
