//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared components once, from configuration
//! - Create the Axum router: admin routes plus the gateway catch-all
//! - Wire up middleware (request ID, tracing)
//! - Serve over plain TCP or TLS with client certificate identity
//! - Stop gracefully on the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::{http::HeaderName, routing::any, Router};
use axum_server::Handle;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::admin;
use crate::audit::AuditLog;
use crate::config::{MiddlewareConfig, TlsConfig};
use crate::http::gateway::gateway_handler;
use crate::lifecycle::ShutdownSignal;
use crate::net::tls::{self, ClientCertAcceptor, TlsError};
use crate::proxy::{BackendTarget, ForwardError, ProxyForwarder};
use crate::security::{IdentityExtractor, TrustRegistry};

/// How long in-flight TLS connections may drain after shutdown.
const TLS_DRAIN_PERIOD: Duration = Duration::from_secs(10);

/// Errors that prevent the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] TlsError),

    #[error(transparent)]
    Backend(#[from] ForwardError),

    #[error("invalid identity header {0:?}")]
    IdentityHeader(String),
}

/// Application state injected into handlers.
///
/// Every component is constructed once and shared; nothing here is global.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentityExtractor>,
    pub trust: Arc<TrustRegistry>,
    pub audit: Arc<AuditLog>,
    pub forwarder: Arc<ProxyForwarder>,
    pub max_body_bytes: usize,
    pub default_log_limit: usize,
}

impl AppState {
    pub fn from_config(config: &MiddlewareConfig) -> Result<Self, ServerError> {
        let header = HeaderName::from_bytes(config.trust.identity_header.as_bytes())
            .map_err(|_| ServerError::IdentityHeader(config.trust.identity_header.clone()))?;

        let audit = Arc::new(AuditLog::from_config(&config.audit));
        let target = BackendTarget::parse(&config.backend.base_url)?;
        let forwarder = ProxyForwarder::new(target, Arc::clone(&audit));

        Ok(Self {
            identity: Arc::new(IdentityExtractor::new(header)),
            trust: Arc::new(TrustRegistry::from_config(&config.trust)),
            audit,
            forwarder: Arc::new(forwarder),
            max_body_bytes: config.listener.max_body_bytes,
            default_log_limit: config.admin.default_log_limit,
        })
    }
}

/// HTTP server for the security middleware.
pub struct HttpServer {
    router: Router,
    config: MiddlewareConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: MiddlewareConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &MiddlewareConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler));

        if config.admin.enabled {
            router = router.merge(admin::admin_routes());
        }

        router
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared components, for inspection.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &MiddlewareConfig {
        &self.config
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;

        let trust = &self.state.trust;
        tracing::info!(
            backend = %self.state.forwarder.target().authority(),
            trusted_services = ?trust.trusted_services().collect::<Vec<_>>(),
            admit_on_untrusted = trust.admit_on_untrusted(),
            identity_header = %self.state.identity.header(),
            audit_retention = ?self.state.audit.max_entries(),
            "Gateway ready"
        );

        if let Some(tls_config) = self.config.listener.tls.clone() {
            return self.serve_tls(listener, &tls_config, shutdown).await;
        }

        tracing::info!(address = %addr, "HTTP server starting");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    async fn serve_tls(
        self,
        listener: TcpListener,
        tls_config: &TlsConfig,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let server_config = tls::build_server_config(tls_config)?;
        let acceptor = ClientCertAcceptor::new(server_config);

        let handle = Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown.recv().await;
            drain.graceful_shutdown(Some(TLS_DRAIN_PERIOD));
        });

        tracing::info!(
            address = %listener.local_addr()?,
            client_ca = tls_config.client_ca_path.is_some(),
            require_client_cert = tls_config.require_client_cert,
            "HTTPS server starting"
        );

        axum_server::from_tcp(listener.into_std()?)
            .acceptor(acceptor)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
