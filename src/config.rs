//! Environment-sourced startup configuration
//!
//! All settings are read once at startup and are immutable for the process
//! lifetime. The only required setting is `TARGET_KIND`, the owner-reference
//! kind the webhook propagates; everything else has a sensible default.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// Default bind address for the webhook server
pub const DEFAULT_WEBHOOK_ADDR: &str = "0.0.0.0:4443";

/// Default TLS certificate path (mounted by the serving-cert secret)
pub const DEFAULT_TLS_CERT_FILE: &str = "certs/tls.crt";

/// Default TLS private key path
pub const DEFAULT_TLS_KEY_FILE: &str = "certs/tls.key";

/// Default bound on a single ServiceAccount lookup, in seconds
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 5;

/// Webhook configuration, resolved once at startup
#[derive(Clone, Debug)]
pub struct Config {
    /// Owner-reference kind to propagate (e.g. a CRD kind like "Foo")
    pub target_kind: String,
    /// Address to bind the TLS server
    pub addr: SocketAddr,
    /// Path to the TLS certificate PEM file
    pub tls_cert: PathBuf,
    /// Path to the TLS private key PEM file
    pub tls_key: PathBuf,
    /// Upper bound on a single ServiceAccount lookup
    pub lookup_timeout: Duration,
}

impl Config {
    /// Read configuration from the process environment
    ///
    /// Fails if `TARGET_KIND` is unset or empty, or if an override value
    /// does not parse. Absent optional variables fall back to defaults.
    pub fn from_env() -> Result<Config, Error> {
        let target_kind = std::env::var("TARGET_KIND")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                Error::config("TARGET_KIND must be set to the owner-reference kind to propagate")
            })?;

        let addr = std::env::var("WEBHOOK_ADDR")
            .unwrap_or_else(|_| DEFAULT_WEBHOOK_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| Error::config(format!("invalid WEBHOOK_ADDR: {e}")))?;

        let tls_cert = std::env::var("TLS_CERT_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TLS_CERT_FILE));
        let tls_key = std::env::var("TLS_KEY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TLS_KEY_FILE));

        let lookup_timeout = match std::env::var("LOOKUP_TIMEOUT_SECS") {
            Ok(v) => Duration::from_secs(
                v.parse::<u64>()
                    .map_err(|e| Error::config(format!("invalid LOOKUP_TIMEOUT_SECS: {e}")))?,
            ),
            Err(_) => Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
        };

        Ok(Config {
            target_kind,
            addr,
            tls_cert,
            tls_key,
            lookup_timeout,
        })
    }
}
