use serde::{Deserialize, Serialize};

use crate::operations::{Domain, Operation};

/// User-facing failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnresolvedDomain,
    UnrecognizedOperation,
    InvalidFormat,
    MissingParameters,
    CapabilityNotFound,
    HandlerFailure,
    /// Expected "entity does not exist" outcome, not a fault.
    NotFound,
    /// The store refused the credentials, or a path was out of bounds.
    PermissionDenied,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnresolvedDomain => "unresolved_domain",
            Self::UnrecognizedOperation => "unrecognized_operation",
            Self::InvalidFormat => "invalid_format",
            Self::MissingParameters => "missing_parameters",
            Self::CapabilityNotFound => "capability_not_found",
            Self::HandlerFailure => "handler_failure",
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
        }
    }
}

/// Why a message could not be turned into an [`Intent`](crate::Intent).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolutionError {
    #[error("no capability domain matched the message")]
    UnresolvedDomain,

    /// The domain matched but no operation phrasing applied at all.
    #[error("no {domain} operation matched the message")]
    NoMatchingOperation { domain: Domain },

    /// An operation's phrasing applied but its parameters could not be
    /// extracted. Carries the usage hint for that operation.
    #[error("could not extract parameters for {operation}")]
    UnrecognizedOperation { operation: Operation, hint: String },

    #[error("model output is not a valid intent: {reason}")]
    InvalidFormat { reason: String },

    #[error("{operation} is missing required parameters: {}", .missing.join(", "))]
    MissingParameters {
        operation: Operation,
        missing: Vec<String>,
    },

    #[error("no capability {operation} in domain {domain}")]
    CapabilityNotFound { domain: String, operation: String },

    /// The model backend failed (transport, status, timeout).
    #[error("language model backend failed: {0}")]
    Backend(String),
}

impl ResolutionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnresolvedDomain => ErrorKind::UnresolvedDomain,
            Self::NoMatchingOperation { .. } | Self::UnrecognizedOperation { .. } => {
                ErrorKind::UnrecognizedOperation
            }
            Self::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            Self::MissingParameters { .. } => ErrorKind::MissingParameters,
            Self::CapabilityNotFound { .. } => ErrorKind::CapabilityNotFound,
            Self::Backend(_) => ErrorKind::HandlerFailure,
        }
    }

    /// Operation the error refers to, when one was identified.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::UnrecognizedOperation { operation, .. }
            | Self::MissingParameters { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

/// Failure at the dispatch boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("{operation} is missing required parameters: {}", .missing.join(", "))]
    MissingParameters {
        operation: Operation,
        missing: Vec<String>,
    },

    #[error("no handler registered for domain {domain} ({operation})")]
    CapabilityNotFound { domain: Domain, operation: Operation },

    #[error("{item} not found")]
    NotFound { item: String },

    #[error("permission denied: {detail}")]
    PermissionDenied { detail: String },

    #[error("handler failed: {detail}")]
    HandlerFailure { detail: String },

    #[error("handler timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameters { .. } => ErrorKind::MissingParameters,
            Self::CapabilityNotFound { .. } => ErrorKind::CapabilityNotFound,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::HandlerFailure { .. } | Self::Timeout { .. } => ErrorKind::HandlerFailure,
        }
    }
}
