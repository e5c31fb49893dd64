//! HTTP surface for votebox.
//!
//! # Routes
//! - `GET /projects` lists the catalog with running tallies.
//! - `POST /vote` with `{ "id": 1, "email": "a@b.com" }` casts one vote.
//! - `POST /reset` with `{ "secret": "..." }` zeroes tallies and clears the ledger.
//!
//! Each route is also served under `/api`.
//!
//! # Configuration
//! `PORT`, `VOTEBOX_DB_PATH`, `VOTEBOX_SEED_PATH`, `VOTEBOX_LOG_LEVEL`,
//! `VOTEBOX_LOG_DIR`, `VOTEBOX_CORS_ORIGINS` (comma separated) and
//! `ADMIN_SECRET`. See [`config::Config`].

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use log::{error, info, warn};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use votebox_core::db::{open_db, DbError};
use votebox_core::{CatalogRepository, CatalogSeed, RepoError, SeedError, SqliteCatalogRepository};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::Config;
use routes::{projects_handler, reset_handler, vote_handler};
use state::AppState;

const CORS_MAX_AGE: Duration = Duration::from_secs(60 * 60);

#[derive(Debug)]
pub enum ServerError {
    Db(DbError),
    Repo(RepoError),
    SeedRead(std::io::Error),
    Seed(SeedError),
    Io(std::io::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database bootstrap failed: {err}"),
            Self::Repo(err) => write!(f, "catalog seeding failed: {err}"),
            Self::SeedRead(err) => write!(f, "cannot read catalog seed: {err}"),
            Self::Seed(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "server i/o failed: {err}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::SeedRead(err) | Self::Io(err) => Some(err),
            Self::Seed(err) => Some(err),
        }
    }
}

/// Builds the router with both bare and `/api`-prefixed routes.
pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/projects", get(projects_handler))
        .route("/vote", post(vote_handler))
        .route("/reset", post(reset_handler));

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("event=cors_config module=server status=skipped origin={origin}");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(CORS_MAX_AGE)
}

/// Migrates the database and applies the optional catalog seed.
///
/// The connection is closed before returning; requests open their own.
pub fn bootstrap_storage(db_path: &Path, seed_path: Option<&Path>) -> Result<(), ServerError> {
    let mut conn = open_db(db_path).map_err(ServerError::Db)?;

    if let Some(seed_path) = seed_path {
        let raw = std::fs::read_to_string(seed_path).map_err(ServerError::SeedRead)?;
        let seed = CatalogSeed::from_json(&raw).map_err(ServerError::Seed)?;
        let inserted = SqliteCatalogRepository::new(&mut conn)
            .seed_entries(&seed.projects)
            .map_err(ServerError::Repo)?;
        info!(
            "event=catalog_seed module=server status=ok entries={} inserted={}",
            seed.projects.len(),
            inserted
        );
    }

    Ok(())
}

/// Bootstraps storage, then serves until Ctrl+C or SIGTERM.
pub async fn start_server(config: Config) -> Result<(), ServerError> {
    bootstrap_storage(&config.db_path, config.seed_path.as_deref())?;

    if !config.admin_secret.is_configured() {
        warn!("event=server_start module=server status=warn reason=admin_secret_unset reset=disabled");
    }

    let state = AppState::new(config.db_path.clone(), config.admin_secret.clone());
    let app = build_router(state, &config.cors_origins);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await.map_err(ServerError::Io)?;
    info!("event=server_start module=server status=ok address={address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Io)?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("event=shutdown module=server signal=ctrl_c"),
            Err(err) => {
                error!("event=shutdown module=server status=error signal=ctrl_c error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=shutdown module=server signal=terminate");
            }
            Err(err) => {
                error!("event=shutdown module=server status=error signal=terminate error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
