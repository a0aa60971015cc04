//! Error types for subctl library operations
//!
//! Errors carry the context needed to tell which template or resource kind
//! an operation was working on when it failed.

use thiserror::Error;

/// Main error type for subctl library operations
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being (de)serialized (if known)
        kind: Option<String>,
    },

    /// No embedded template is registered under the requested key
    #[error("embedded template not found: {key}")]
    TemplateNotFound {
        /// The key that was looked up
        key: String,
    },

    /// Internal/operational error
    #[error("internal error [{context}]: {message}")]
    Internal {
        /// Description of what failed
        message: String,
        /// Where the error occurred (e.g., "create_client")
        context: String,
    },
}

impl Error {
    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error for a specific resource kind
    pub fn serialization_for(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create an internal error with context
    pub fn internal_with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: context.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_error_carries_kind() {
        let err = Error::serialization_for("Role", "missing field `rules`");
        match &err {
            Error::Serialization { kind, message } => {
                assert_eq!(kind.as_deref(), Some("Role"));
                assert_eq!(message, "missing field `rules`");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "serialization error: missing field `rules`"
        );
    }

    #[test]
    fn template_not_found_display() {
        let err = Error::TemplateNotFound {
            key: "config/rbac/missing.yaml".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "embedded template not found: config/rbac/missing.yaml"
        );
    }

    #[test]
    fn internal_error_display_includes_context() {
        let err = Error::internal_with_context("create_client", "no kubeconfig");
        assert_eq!(
            err.to_string(),
            "internal error [create_client]: no kubeconfig"
        );
    }
}
