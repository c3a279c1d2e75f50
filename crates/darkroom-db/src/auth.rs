use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rusqlite::OptionalExtension;
use tracing::{debug, warn};

use crate::models::AccountRow;
use crate::{Database, DbError, DbResult};

/// Hash a plaintext password with Argon2id and a random salt, returning the
/// PHC string stored in `User.password`.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// bcrypt prefixes written by the photo service (`$2a$`, `$2b$`, `$2x$`, `$2y$`).
fn is_bcrypt(stored: &str) -> bool {
    let bytes = stored.as_bytes();
    bytes.len() > 4
        && stored.starts_with("$2")
        && matches!(bytes[2], b'a' | b'b' | b'x' | b'y')
        && bytes[3] == b'$'
}

/// Check `password` against a stored hash: bcrypt for accounts created by the
/// photo service, Argon2 PHC strings for accounts created here. Both compare
/// digests in constant time.
fn password_matches(password: &str, stored: &str) -> bool {
    if is_bcrypt(stored) {
        return match bcrypt::verify(password, stored) {
            Ok(matched) => matched,
            Err(e) => {
                warn!("Stored bcrypt hash is malformed: {}", e);
                false
            }
        };
    }

    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is not bcrypt or a valid PHC string: {}", e);
            false
        }
    }
}

/// Hash burned on unknown emails so both failure paths cost one Argon2 run.
fn decoy_hash() -> Option<&'static str> {
    static DECOY: OnceLock<Option<String>> = OnceLock::new();
    DECOY
        .get_or_init(|| hash_password("darkroom-decoy-password").ok())
        .as_deref()
}

impl Database {
    /// Authenticate by email and password.
    ///
    /// An unknown email and a wrong password both yield
    /// [`DbError::Authentication`]. Authorization is left to the caller:
    /// check [`AccountRow::is_admin`] before granting console access.
    pub fn verify_login(&self, email: &str, password: &str) -> DbResult<AccountRow> {
        let found = self.with_conn(|conn| {
            let row = conn
                .query_row(
                    r#"SELECT id, username, email, profileImage, createdAt, role, password
                       FROM "User" WHERE email = ?1"#,
                    [email],
                    |row| {
                        Ok((
                            AccountRow {
                                id: row.get(0)?,
                                username: row.get(1)?,
                                email: row.get(2)?,
                                profile_image: row.get(3)?,
                                created_at: row.get(4)?,
                                role: row.get(5)?,
                            },
                            row.get::<_, String>(6)?,
                        ))
                    },
                )
                .optional()?;
            Ok(row)
        })?;

        let Some((account, stored_hash)) = found else {
            if let Some(decoy) = decoy_hash() {
                let _ = password_matches(password, decoy);
            }
            debug!("Login rejected: unknown email");
            return Err(DbError::Authentication);
        };

        if !password_matches(password, &stored_hash) {
            debug!("Login rejected for user {}", account.id);
            return Err(DbError::Authentication);
        }

        Ok(account)
    }
}
