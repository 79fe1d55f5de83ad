//! Mutating admission webhook for ServiceAccount owner-reference propagation
//!
//! When a workload creates an object through the Kubernetes API, the admission
//! request carries the identity of the creating principal. If that principal is
//! a ServiceAccount which itself carries an owner reference of a configured
//! target kind, this webhook patches the incoming object so it is owned by the
//! same parent. The webhook never denies on the happy path; it only augments.
//!
//! # Modules
//!
//! - [`config`] - Environment-sourced startup configuration
//! - [`error`] - Error types shared across the webhook
//! - [`store`] - ServiceAccount lookup abstraction over the Kubernetes API
//! - [`resolver`] - Requesting-identity parsing and owner-reference resolution
//! - [`patch`] - JSON patch construction for the mutation
//! - [`webhook`] - HTTP server, routing, and the admission pipeline

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod patch;
pub mod resolver;
pub mod store;
pub mod webhook;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
