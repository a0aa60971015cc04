//! Common building blocks for subctl: errors, embedded templates, kube helpers
//! and the RBAC ensure operations

#![deny(missing_docs)]

pub mod embedded;
pub mod error;
pub mod kube_utils;
pub mod rbac;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Namespace the submariner operator is deployed into by default
pub const DEFAULT_SUBMARINER_NAMESPACE: &str = "submariner-operator";
