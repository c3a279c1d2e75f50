use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, warn};

use crate::models::{CommentRow, NewUser, PhotoRow, References, UserRow};
use crate::{Database, DbResult};

impl Database {
    // -- Users --

    /// Every user, newest first, with activity counts.
    pub fn list_users(&self) -> DbResult<Vec<UserRow>> {
        self.with_conn(query_users)
    }

    pub fn create_user(&self, user: &NewUser<'_>) -> DbResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"INSERT INTO "User" (username, email, password, role, profileImage, createdAt)
                   VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, datetime('now')))"#,
                params![
                    user.username,
                    user.email,
                    user.password_hash,
                    user.role,
                    user.profile_image,
                    user.created_at
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn user_exists_by_email(&self, email: &str) -> DbResult<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(r#"SELECT 1 FROM "User" WHERE email = ?1"#, [email], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
    }

    // -- Photos --

    /// Every photo, newest first, with owner details and like/comment counts.
    pub fn list_photos(&self) -> DbResult<Vec<PhotoRow>> {
        self.with_conn(query_photos)
    }

    pub fn create_photo(
        &self,
        user_id: i64,
        url: &str,
        title: Option<&str>,
        created_at: Option<&str>,
    ) -> DbResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO Photo (userId, url, title, createdAt)
                 VALUES (?1, ?2, ?3, COALESCE(?4, datetime('now')))",
                params![user_id, url, title, created_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    // -- Comments --

    /// Every comment whose author and photo still exist, newest first.
    ///
    /// Comments pointing at a missing user or photo cannot be joined and are
    /// left out; their number is logged so the inconsistency stays visible.
    pub fn list_comments(&self) -> DbResult<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let rows = query_comments(conn)?;

            let orphaned = count_orphaned_comments(conn)?;
            if orphaned > 0 {
                warn!("{} orphaned comment(s) excluded from listing", orphaned);
            }

            Ok(rows)
        })
    }

    pub fn create_comment(
        &self,
        user_id: i64,
        photo_id: i64,
        content: &str,
        created_at: Option<&str>,
    ) -> DbResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO Comment (userId, photoId, content, createdAt)
                 VALUES (?1, ?2, ?3, COALESCE(?4, datetime('now')))",
                params![user_id, photo_id, content, created_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    // -- Likes --

    pub fn create_like(&self, user_id: i64, photo_id: i64) -> DbResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"INSERT INTO "Like" (userId, photoId) VALUES (?1, ?2)"#,
                params![user_id, photo_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    // -- Integrity --

    /// Rows that still reference `user_id`, directly or through one of the
    /// user's photos.
    pub fn references_to_user(&self, user_id: i64) -> DbResult<References> {
        self.with_conn(|conn| {
            let refs = conn.query_row(
                r#"SELECT
                    (SELECT COUNT(*) FROM Photo WHERE userId = ?1),
                    (SELECT COUNT(*) FROM Comment
                        WHERE userId = ?1
                           OR photoId IN (SELECT id FROM Photo WHERE userId = ?1)),
                    (SELECT COUNT(*) FROM "Like"
                        WHERE userId = ?1
                           OR photoId IN (SELECT id FROM Photo WHERE userId = ?1))"#,
                [user_id],
                read_references,
            )?;
            Ok(refs)
        })
    }

    /// Rows that still reference `photo_id`. `photos` is 1 while the photo row
    /// itself exists.
    pub fn references_to_photo(&self, photo_id: i64) -> DbResult<References> {
        self.with_conn(|conn| {
            let refs = conn.query_row(
                r#"SELECT
                    (SELECT COUNT(*) FROM Photo WHERE id = ?1),
                    (SELECT COUNT(*) FROM Comment WHERE photoId = ?1),
                    (SELECT COUNT(*) FROM "Like" WHERE photoId = ?1)"#,
                [photo_id],
                read_references,
            )?;
            Ok(refs)
        })
    }
}

fn query_users(conn: &Connection) -> DbResult<Vec<UserRow>> {
    // One indexed count per child table; joining all three would multiply rows
    let mut stmt = conn.prepare(
        r#"SELECT u.id, u.username, u.email, u.profileImage, u.createdAt,
                  (SELECT COUNT(*) FROM Photo p WHERE p.userId = u.id) AS photo_count,
                  (SELECT COUNT(*) FROM Comment c WHERE c.userId = u.id) AS comment_count,
                  (SELECT COUNT(*) FROM "Like" l WHERE l.userId = u.id) AS like_count
           FROM "User" u
           ORDER BY julianday(u.createdAt) DESC, u.id DESC"#,
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                profile_image: row.get(3)?,
                created_at: row.get(4)?,
                photo_count: row.get(5)?,
                comment_count: row.get(6)?,
                like_count: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Listed {} users", rows.len());
    Ok(rows)
}

fn query_photos(conn: &Connection) -> DbResult<Vec<PhotoRow>> {
    let mut stmt = conn.prepare(
        r#"SELECT p.id, p.url, p.title, p.createdAt, p.userId, u.username, u.email,
                  (SELECT COUNT(*) FROM "Like" l WHERE l.photoId = p.id) AS like_count,
                  (SELECT COUNT(*) FROM Comment c WHERE c.photoId = p.id) AS comment_count
           FROM Photo p
           JOIN "User" u ON p.userId = u.id
           ORDER BY julianday(p.createdAt) DESC, p.id DESC"#,
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(PhotoRow {
                id: row.get(0)?,
                url: row.get(1)?,
                title: row.get(2)?,
                created_at: row.get(3)?,
                user_id: row.get(4)?,
                username: row.get(5)?,
                email: row.get(6)?,
                like_count: row.get(7)?,
                comment_count: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Listed {} photos", rows.len());
    Ok(rows)
}

fn query_comments(conn: &Connection) -> DbResult<Vec<CommentRow>> {
    let mut stmt = conn.prepare(
        r#"SELECT c.id, c.content, c.createdAt, c.userId, c.photoId,
                  u.username, u.profileImage, p.url, p.title
           FROM Comment c
           JOIN "User" u ON c.userId = u.id
           JOIN Photo p ON c.photoId = p.id
           ORDER BY julianday(c.createdAt) DESC, c.id DESC"#,
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(CommentRow {
                id: row.get(0)?,
                content: row.get(1)?,
                created_at: row.get(2)?,
                user_id: row.get(3)?,
                photo_id: row.get(4)?,
                username: row.get(5)?,
                user_profile_image: row.get(6)?,
                photo_url: row.get(7)?,
                photo_title: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Listed {} comments", rows.len());
    Ok(rows)
}

fn count_orphaned_comments(conn: &Connection) -> DbResult<i64> {
    let count = conn.query_row(
        r#"SELECT COUNT(*) FROM Comment c
           WHERE NOT EXISTS (SELECT 1 FROM "User" u WHERE u.id = c.userId)
              OR NOT EXISTS (SELECT 1 FROM Photo p WHERE p.id = c.photoId)"#,
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn read_references(row: &Row<'_>) -> rusqlite::Result<References> {
    Ok(References {
        photos: row.get(0)?,
        comments: row.get(1)?,
        likes: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ROLE_REGULAR;

    fn user(db: &Database, name: &str, created_at: &str) -> i64 {
        let email = format!("{name}@example.com");
        db.create_user(&NewUser {
            username: name,
            email: &email,
            password_hash: "x",
            role: ROLE_REGULAR,
            profile_image: None,
            created_at: Some(created_at),
        })
        .unwrap()
    }

    #[test]
    fn empty_database_lists_nothing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.list_users().unwrap().is_empty());
        assert!(db.list_photos().unwrap().is_empty());
        assert!(db.list_comments().unwrap().is_empty());
    }

    #[test]
    fn users_without_activity_have_zero_counts() {
        let db = Database::open_in_memory().unwrap();
        user(&db, "quiet", "2024-01-01 10:00:00");

        let users = db.list_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "quiet");
        assert_eq!(
            (users[0].photo_count, users[0].comment_count, users[0].like_count),
            (0, 0, 0)
        );
    }

    #[test]
    fn photo_counts_do_not_multiply_across_joins() {
        let db = Database::open_in_memory().unwrap();
        let owner = user(&db, "owner", "2024-01-01 10:00:00");
        let fan = user(&db, "fan", "2024-01-02 10:00:00");
        let photo = db.create_photo(owner, "https://cdn/p.jpg", None, None).unwrap();

        for _ in 0..3 {
            db.create_comment(fan, photo, "nice", None).unwrap();
        }
        db.create_like(fan, photo).unwrap();
        db.create_like(owner, photo).unwrap();

        let photos = db.list_photos().unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].like_count, 2);
        assert_eq!(photos[0].comment_count, 3);
        assert_eq!(photos[0].username, "owner");
        assert_eq!(photos[0].email, "owner@example.com");
        assert_eq!(photos[0].title, None);
    }

    #[test]
    fn comments_carry_author_and_photo_details() {
        let db = Database::open_in_memory().unwrap();
        let owner = user(&db, "owner", "2024-01-01 10:00:00");
        let photo = db
            .create_photo(owner, "https://cdn/dawn.jpg", Some("Dawn"), None)
            .unwrap();
        db.create_comment(owner, photo, "first light", None).unwrap();

        let comments = db.list_comments().unwrap();
        assert_eq!(comments.len(), 1);
        let c = &comments[0];
        assert_eq!(c.content, "first light");
        assert_eq!(c.username, "owner");
        assert_eq!(c.photo_url, "https://cdn/dawn.jpg");
        assert_eq!(c.photo_title.as_deref(), Some("Dawn"));
        assert_eq!(c.photo_id, photo);
    }

    #[test]
    fn orphaned_comments_are_left_out() {
        let db = Database::open_in_memory().unwrap();
        let owner = user(&db, "owner", "2024-01-01 10:00:00");
        let photo = db.create_photo(owner, "https://cdn/p.jpg", None, None).unwrap();
        db.create_comment(owner, photo, "kept", None).unwrap();

        // Plant a comment on a photo that does not exist.
        db.with_conn(|conn| {
            conn.pragma_update(None, "foreign_keys", "OFF")?;
            conn.execute(
                "INSERT INTO Comment (userId, photoId, content) VALUES (?1, 9999, 'stray')",
                [owner],
            )?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        })
        .unwrap();

        let comments = db.list_comments().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "kept");
        assert_eq!(db.with_conn(count_orphaned_comments).unwrap(), 1);
    }

    #[test]
    fn mixed_timestamp_formats_sort_by_instant() {
        let db = Database::open_in_memory().unwrap();
        let morning = user(&db, "morning", "2024-01-01T10:00:00Z");
        let night = user(&db, "night", "2024-01-01 23:00:00");
        // 22:30 in UTC, so between the two above
        let offset = user(&db, "offset", "2024-01-02T01:30:00+03:00");

        let ids: Vec<_> = db.list_users().unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![night, offset, morning]);

        let early = db
            .create_photo(morning, "https://cdn/a.jpg", None, Some("2024-03-01T08:00:00Z"))
            .unwrap();
        let late = db
            .create_photo(morning, "https://cdn/b.jpg", None, Some("2024-03-01 09:00:00"))
            .unwrap();
        let ids: Vec<_> = db.list_photos().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![late, early]);

        let first = db
            .create_comment(night, early, "first", Some("2024-03-02T07:00:00Z"))
            .unwrap();
        let second = db
            .create_comment(night, early, "second", Some("2024-03-02 07:30:00"))
            .unwrap();
        let ids: Vec<_> = db.list_comments().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn heavy_user_counts_stay_exact() {
        let db = Database::open_in_memory().unwrap();
        let owner = user(&db, "owner", "2024-01-01 10:00:00");
        let fan = user(&db, "fan", "2024-01-02 10:00:00");

        let mut photos = Vec::new();
        for i in 0..40 {
            photos.push(
                db.create_photo(owner, &format!("https://cdn/{i}.jpg"), None, None)
                    .unwrap(),
            );
        }
        for &p in &photos {
            db.create_comment(owner, p, "mine", None).unwrap();
            db.create_comment(owner, p, "also mine", None).unwrap();
            db.create_comment(fan, p, "theirs", None).unwrap();
            db.create_like(owner, p).unwrap();
            db.create_like(fan, p).unwrap();
        }

        let users = db.list_users().unwrap();
        let owner_row = users.iter().find(|u| u.id == owner).unwrap();
        assert_eq!(
            (owner_row.photo_count, owner_row.comment_count, owner_row.like_count),
            (40, 80, 40)
        );
        let fan_row = users.iter().find(|u| u.id == fan).unwrap();
        assert_eq!(
            (fan_row.photo_count, fan_row.comment_count, fan_row.like_count),
            (0, 40, 40)
        );

        let listed = db.list_photos().unwrap();
        assert_eq!(listed.len(), 40);
        assert!(listed.iter().all(|p| p.like_count == 2 && p.comment_count == 3));
    }

    #[test]
    fn user_exists_by_email_matches_exactly() {
        let db = Database::open_in_memory().unwrap();
        user(&db, "ada", "2024-01-01 10:00:00");
        assert!(db.user_exists_by_email("ada@example.com").unwrap());
        assert!(!db.user_exists_by_email("bob@example.com").unwrap());
    }

    #[test]
    fn duplicate_email_is_a_query_error() {
        let db = Database::open_in_memory().unwrap();
        user(&db, "ada", "2024-01-01 10:00:00");
        let err = db
            .create_user(&NewUser {
                username: "ada2",
                email: "ada@example.com",
                password_hash: "x",
                role: ROLE_REGULAR,
                profile_image: None,
                created_at: None,
            })
            .unwrap_err();
        assert!(matches!(err, crate::DbError::Query(_)));
    }
}
