use rusqlite::Connection;
use tracing::info;

use crate::{DbError, DbResult};

/// Bootstrap the photo-sharing schema when it is missing.
///
/// Table and column names follow the service's own schema. Foreign keys carry
/// no `ON DELETE CASCADE`: dependent rows are removed by [`crate::cascade`].
pub fn run(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS "User" (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL UNIQUE,
            email           TEXT NOT NULL UNIQUE,
            profileImage    TEXT,
            createdAt       TEXT NOT NULL DEFAULT (datetime('now')),
            password        TEXT NOT NULL,
            role            INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS Photo (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            url         TEXT NOT NULL,
            title       TEXT,
            createdAt   TEXT NOT NULL DEFAULT (datetime('now')),
            userId      INTEGER NOT NULL REFERENCES "User"(id)
        );

        CREATE INDEX IF NOT EXISTS idx_photo_user ON Photo(userId);
        CREATE INDEX IF NOT EXISTS idx_photo_created ON Photo(createdAt);

        CREATE TABLE IF NOT EXISTS Comment (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            content     TEXT NOT NULL,
            createdAt   TEXT NOT NULL DEFAULT (datetime('now')),
            userId      INTEGER NOT NULL REFERENCES "User"(id),
            photoId     INTEGER NOT NULL REFERENCES Photo(id)
        );

        CREATE INDEX IF NOT EXISTS idx_comment_user ON Comment(userId);
        CREATE INDEX IF NOT EXISTS idx_comment_photo ON Comment(photoId);
        CREATE INDEX IF NOT EXISTS idx_comment_created ON Comment(createdAt);

        CREATE TABLE IF NOT EXISTS "Like" (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            userId      INTEGER NOT NULL REFERENCES "User"(id),
            photoId     INTEGER NOT NULL REFERENCES Photo(id)
        );

        CREATE INDEX IF NOT EXISTS idx_like_user ON "Like"(userId);
        CREATE INDEX IF NOT EXISTS idx_like_photo ON "Like"(photoId);
        "#,
    )
    .map_err(DbError::classify)?;

    info!("Database schema ready");
    Ok(())
}
