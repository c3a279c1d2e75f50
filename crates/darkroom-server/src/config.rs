use std::time::Duration;

use anyhow::{Context, Result, bail};

use darkroom_db::ConnectOptions;

/// Placeholder secrets that MUST NOT be used to sign session tokens.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me", "dev-secret-change-me", "secret"];

#[derive(Debug)]
pub struct Config {
    pub db: ConnectOptions,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub session_ttl: chrono::Duration,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Admin account created at startup when its email is not yet registered.
pub struct BootstrapAdmin {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("DARKROOM_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("DARKROOM_JWT_SECRET is unset or still a placeholder");
        }

        let busy_timeout_ms: u64 = get("DARKROOM_DB_BUSY_TIMEOUT_MS", "5000")
            .parse()
            .context("DARKROOM_DB_BUSY_TIMEOUT_MS must be a number of milliseconds")?;
        let port: u16 = get("DARKROOM_PORT", "3100")
            .parse()
            .context("DARKROOM_PORT must be a port number")?;
        let session_hours: i64 = get("DARKROOM_SESSION_HOURS", "12")
            .parse()
            .context("DARKROOM_SESSION_HOURS must be a whole number of hours")?;
        if session_hours <= 0 {
            bail!("DARKROOM_SESSION_HOURS must be positive");
        }

        let mut db = ConnectOptions::new(get("DARKROOM_DB_PATH", "darkroom.db"));
        db.busy_timeout = Duration::from_millis(busy_timeout_ms);

        let bootstrap_admin = match (
            lookup("DARKROOM_BOOTSTRAP_ADMIN_EMAIL"),
            lookup("DARKROOM_BOOTSTRAP_ADMIN_USERNAME"),
            lookup("DARKROOM_BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(username), Some(password))
                if !email.is_empty() && !username.is_empty() && !password.is_empty() =>
            {
                Some(BootstrapAdmin { email, username, password })
            }
            (None, None, None) => None,
            _ => bail!(
                "DARKROOM_BOOTSTRAP_ADMIN_EMAIL, _USERNAME and _PASSWORD must be set together"
            ),
        };

        Ok(Self {
            db,
            host: get("DARKROOM_HOST", "127.0.0.1"),
            port,
            jwt_secret,
            session_ttl: chrono::Duration::hours(session_hours),
            bootstrap_admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = config_from(&[("DARKROOM_JWT_SECRET", "a-real-secret")]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3100);
        assert_eq!(config.db.path.to_str(), Some("darkroom.db"));
        assert_eq!(config.db.busy_timeout, Duration::from_secs(5));
        assert_eq!(config.session_ttl, chrono::Duration::hours(12));
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn placeholder_secret_is_refused() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("DARKROOM_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn bad_port_is_reported() {
        let err = config_from(&[
            ("DARKROOM_JWT_SECRET", "a-real-secret"),
            ("DARKROOM_PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("DARKROOM_PORT"));
    }

    #[test]
    fn partial_bootstrap_admin_is_an_error() {
        assert!(config_from(&[
            ("DARKROOM_JWT_SECRET", "a-real-secret"),
            ("DARKROOM_BOOTSTRAP_ADMIN_EMAIL", "root@example.com"),
        ])
        .is_err());

        let config = config_from(&[
            ("DARKROOM_JWT_SECRET", "a-real-secret"),
            ("DARKROOM_BOOTSTRAP_ADMIN_EMAIL", "root@example.com"),
            ("DARKROOM_BOOTSTRAP_ADMIN_USERNAME", "root"),
            ("DARKROOM_BOOTSTRAP_ADMIN_PASSWORD", "pw"),
        ])
        .unwrap();
        assert_eq!(config.bootstrap_admin.unwrap().username, "root");
    }
}
