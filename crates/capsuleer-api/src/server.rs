//! Main server implementation for the Capsuleer API

use crate::{
    api,
    auth::{LoginStateStore, SessionCodec, SsoClient},
    config::Config,
    error::{ApiError, Result},
};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Main server structure
pub struct Server {
    config: Arc<Config>,
    app: Router,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// EVE SSO client
    pub sso: Arc<SsoClient>,

    /// Session token codec
    pub sessions: Arc<SessionCodec>,

    /// Pending login attempts keyed by anti-forgery state
    pub login_states: Arc<LoginStateStore>,
}

impl AppState {
    /// Assemble application state from validated configuration
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let sso = Arc::new(SsoClient::new(config.sso.clone())?);
        let sessions = Arc::new(SessionCodec::new(
            &config.session.secret,
            config.session.ttl_hours,
        ));

        Ok(Self {
            config,
            sso,
            sessions,
            login_states: Arc::new(LoginStateStore::default()),
        })
    }
}

impl Server {
    /// Create a new server instance
    ///
    /// Validates the configuration before anything is constructed;
    /// a missing signing secret or SSO credentials abort startup here.
    pub fn new(config: Config) -> Result<Self> {
        info!("Initializing Capsuleer API server");

        config.validate().map_err(ApiError::Config)?;

        let state = AppState::new(config)?;
        let config = state.config.clone();
        let app = Self::build_router(state);

        Ok(Self { config, app })
    }

    /// Build the application router with all routes and middleware
    fn build_router(state: AppState) -> Router {
        let cors = if state.config.server.allowed_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<HeaderValue> = state
                .config
                .server
                .allowed_origins
                .iter()
                .filter_map(|origin| {
                    origin
                        .parse()
                        .map_err(|e| warn!("Skipping unparseable CORS origin {origin}: {e}"))
                        .ok()
                })
                .collect();

            CorsLayer::new()
                .allow_origin(tower_http::cors::AllowOrigin::list(origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        };

        let middleware = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(state.config.request_timeout()))
            .layer(cors);

        Router::new()
            .merge(api::routes())
            .merge(api::docs_routes())
            .layer(middleware)
            .with_state(state)
    }

    /// Run the server until shutdown signal
    pub async fn run(self) -> Result<()> {
        let addr = self.config.server.bind_address;

        info!("Starting HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::Internal {
                message: format!("Failed to bind to address {addr}: {e}"),
            })?;

        info!("Capsuleer API listening on {}", addr);
        info!(
            "EVE SSO callback URL: {}",
            self.config.sso.callback_url
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::Internal {
                message: format!("Server error: {e}"),
            })?;

        Ok(())
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            warn!("Received terminate signal, shutting down");
        },
    }
}
