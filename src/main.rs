//! Owner-reference propagation webhook for Kubernetes
//!
//! Mutating admission controller that links objects created by a
//! ServiceAccount to the same parent the ServiceAccount is owned by.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use kube::Client;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ownerref_webhook::config::Config;
use ownerref_webhook::store::KubeStore;
use ownerref_webhook::webhook::{self, WebhookState};

/// Mutating admission webhook propagating ServiceAccount owner references
#[derive(Parser, Debug)]
#[command(name = "ownerref-webhook", version, about, long_about = None)]
struct Cli {
    /// Address to bind the TLS server (overrides WEBHOOK_ADDR)
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install crypto provider - FIPS-validated aws-lc-rs.
    // The webhook cannot serve its TLS endpoint without one.
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!(
            "CRITICAL: Failed to install crypto provider: {:?}. \
             The webhook cannot terminate TLS without a working provider.",
            e
        );
        std::process::exit(1);
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(addr) = cli.addr {
        config.addr = addr;
    }

    let client = Client::try_default().await?;
    let store = Arc::new(KubeStore::new(client, config.lookup_timeout));
    let state = Arc::new(WebhookState::new(store, config.target_kind.clone()));

    tracing::info!(
        target_kind = %config.target_kind,
        cert = %config.tls_cert.display(),
        "Webhook configured"
    );

    webhook::serve(&config, state).await?;
    Ok(())
}
