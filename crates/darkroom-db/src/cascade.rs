//! Cascading deletes.
//!
//! The schema has no `ON DELETE CASCADE`, so dependent rows are removed here,
//! children before parents, inside one `IMMEDIATE` transaction per operation.
//! If any statement fails the `Transaction` guard is dropped without commit and
//! SQLite rolls every earlier statement back; the caller gets
//! [`DbError::Transaction`] and no partial delete is ever visible.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, info, warn};

use crate::models::CascadeSummary;
use crate::{Database, DbError, DbResult};

impl Database {
    /// Remove a user together with their likes, comments, photos, and every
    /// like and comment left on those photos by anyone.
    pub fn delete_user(&self, user_id: i64) -> DbResult<CascadeSummary> {
        self.with_conn_mut(|conn| {
            run_in_transaction(conn, "user", user_id, |tx| cascade_user(tx, user_id))
        })
    }

    /// Remove a photo together with its likes and comments.
    pub fn delete_photo(&self, photo_id: i64) -> DbResult<CascadeSummary> {
        self.with_conn_mut(|conn| {
            run_in_transaction(conn, "photo", photo_id, |tx| cascade_photo(tx, photo_id))
        })
    }

    /// Remove a single comment. Nothing depends on comments, so this is one
    /// statement. Returns the number of rows removed; deleting an id that does
    /// not exist succeeds with `0`.
    pub fn delete_comment(&self, comment_id: i64) -> DbResult<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM Comment WHERE id = ?1", [comment_id])?;
            if removed == 0 {
                debug!("Comment {} already absent", comment_id);
            } else {
                info!("Deleted comment {}", comment_id);
            }
            Ok(removed)
        })
    }
}

fn run_in_transaction<F>(
    conn: &mut Connection,
    kind: &str,
    id: i64,
    body: F,
) -> DbResult<CascadeSummary>
where
    F: FnOnce(&Transaction<'_>) -> rusqlite::Result<CascadeSummary>,
{
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DbError::classify)?;

    let summary = match body(&tx) {
        Ok(summary) => summary,
        Err(e) => {
            // dropping `tx` rolls back
            warn!("Deleting {} {} failed, rolling back: {}", kind, id, e);
            return Err(DbError::Transaction(e));
        }
    };

    tx.commit().map_err(|e| {
        warn!("Commit of {} {} delete failed: {}", kind, id, e);
        DbError::Transaction(e)
    })?;

    info!(
        "Deleted {} {} ({} likes, {} comments, {} photos, {} users)",
        kind, id, summary.likes, summary.comments, summary.photos, summary.users
    );
    Ok(summary)
}

fn cascade_user(tx: &Transaction<'_>, user_id: i64) -> rusqlite::Result<CascadeSummary> {
    let mut summary = CascadeSummary::default();

    summary.likes += tx.execute(r#"DELETE FROM "Like" WHERE userId = ?1"#, [user_id])?;
    summary.comments += tx.execute("DELETE FROM Comment WHERE userId = ?1", [user_id])?;
    debug!("User {}: own likes and comments removed", user_id);

    let photo_ids = {
        let mut stmt = tx.prepare("SELECT id FROM Photo WHERE userId = ?1")?;
        let ids = stmt
            .query_map([user_id], |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        ids
    };

    for photo_id in &photo_ids {
        summary.likes += tx.execute(r#"DELETE FROM "Like" WHERE photoId = ?1"#, [photo_id])?;
        summary.comments += tx.execute("DELETE FROM Comment WHERE photoId = ?1", [photo_id])?;
    }
    debug!("User {}: activity on {} photos removed", user_id, photo_ids.len());

    summary.photos += tx.execute("DELETE FROM Photo WHERE userId = ?1", [user_id])?;
    summary.users += tx.execute(r#"DELETE FROM "User" WHERE id = ?1"#, [user_id])?;

    Ok(summary)
}

fn cascade_photo(tx: &Transaction<'_>, photo_id: i64) -> rusqlite::Result<CascadeSummary> {
    let mut summary = CascadeSummary::default();

    summary.likes += tx.execute(r#"DELETE FROM "Like" WHERE photoId = ?1"#, [photo_id])?;
    summary.comments += tx.execute("DELETE FROM Comment WHERE photoId = ?1", [photo_id])?;
    summary.photos += tx.execute("DELETE FROM Photo WHERE id = ?1", [photo_id])?;

    Ok(summary)
}
