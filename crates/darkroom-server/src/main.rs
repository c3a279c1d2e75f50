mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{response::Html, routing::get};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use darkroom_api::{AppState, AppStateInner};
use darkroom_db::Database;
use darkroom_db::auth::hash_password;
use darkroom_db::models::{NewUser, ROLE_ADMIN};

use crate::config::{BootstrapAdmin, Config};

const CONSOLE_HTML: &str = include_str!("../assets/console.html");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "darkroom=debug,darkroom_api=debug,darkroom_db=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // One connection for the life of the process
    let db = Database::open(&config.db)?;

    if let Some(admin) = &config.bootstrap_admin {
        ensure_admin(&db, admin)?;
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret,
        session_ttl: config.session_ttl,
    });

    let app = darkroom_api::router(state.clone())
        .route("/", get(console))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Darkroom admin console listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Release the connection whether or not serving failed
    match Arc::try_unwrap(state) {
        Ok(inner) => {
            if let Err(e) = inner.db.close() {
                warn!("Closing database failed: {}", e);
            }
        }
        Err(_) => warn!("Database still referenced at shutdown, closing on drop"),
    }

    served?;
    Ok(())
}

async fn console() -> Html<&'static str> {
    Html(CONSOLE_HTML)
}

/// Create the configured admin account unless its email is already taken.
fn ensure_admin(db: &Database, admin: &BootstrapAdmin) -> anyhow::Result<()> {
    if db.user_exists_by_email(&admin.email)? {
        info!("Bootstrap admin {} already present", admin.email);
        return Ok(());
    }

    let password_hash = hash_password(&admin.password)?;
    let id = db.create_user(&NewUser {
        username: &admin.username,
        email: &admin.email,
        password_hash: &password_hash,
        role: ROLE_ADMIN,
        profile_image: None,
        created_at: None,
    })?;

    info!("Created bootstrap admin {} (id {})", admin.email, id);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
