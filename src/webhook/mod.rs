//! Webhook HTTP server
//!
//! A single mutation endpoint behind a TLS-terminated axum server. The API
//! server POSTs AdmissionReview envelopes to `/mutate`; every other concern
//! (certificate material, bind address, the lookup client) arrives through
//! [`Config`] and [`WebhookState`] at startup.

pub mod mutate;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tracing::info;

use crate::config::Config;
use crate::error::Error;
use crate::store::ServiceAccountStore;

/// Shared state for webhook handlers
#[derive(Clone)]
pub struct WebhookState {
    /// ServiceAccount lookup, constructed once at startup
    pub store: Arc<dyn ServiceAccountStore>,
    /// Owner-reference kind to propagate
    pub target_kind: String,
}

impl WebhookState {
    /// Create webhook state over the given store and target kind
    pub fn new(store: Arc<dyn ServiceAccountStore>, target_kind: impl Into<String>) -> Self {
        Self {
            store,
            target_kind: target_kind.into(),
        }
    }
}

/// Create the webhook router
///
/// - `POST /mutate` - owner-reference mutation for incoming objects
/// - `GET /healthz` - liveness probe
pub fn webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/mutate", post(mutate::mutate_handler))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

/// Start the TLS webhook server and serve until the process exits
pub async fn serve(config: &Config, state: Arc<WebhookState>) -> Result<(), Error> {
    let tls_config = RustlsConfig::from_pem_file(&config.tls_cert, &config.tls_key)
        .await
        .map_err(|e| Error::config(format!("TLS config error: {e}")))?;

    info!(addr = %config.addr, target_kind = %config.target_kind, "Starting admission webhook server");

    axum_server::bind_rustls(config.addr, tls_config)
        .serve(webhook_router(state).into_make_service())
        .await
        .map_err(|e| Error::internal(format!("server error: {e}")))
}
