//! # Errors
//!
//! The coach service reports every failure through [`CoachError`].
//! Core goals:
//! - one variant per failure class callers must tell apart
//! - consistent status codes + class names (Feathers-style shape)
//! - transport-agnostic (the adapter crate decides how to serialize)
//!
//! `CompensationFailed` is reported with a higher [`Severity`] than any
//! ordinary error: it means a partial write could not be rolled back.

use serde_json::json;
use thiserror::Error;

/// A convenience result type for coach APIs.
pub type CoachResult<T> = std::result::Result<T, CoachError>;

/// Feathers-ish error class names + status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,     // 400
    NotFound,       // 404
    GeneralError,   // 500
    NotImplemented, // 501
    BadGateway,     // 502
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::GeneralError => 500,
            ErrorKind::NotImplemented => 501,
            ErrorKind::BadGateway => 502,
        }
    }

    /// Error `name` (e.g. "NotFound")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::GeneralError => "GeneralError",
            ErrorKind::NotImplemented => "NotImplemented",
            ErrorKind::BadGateway => "BadGateway",
        }
    }

    /// Error `className` (kebab-cased)
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotFound => "not-found",
            ErrorKind::GeneralError => "general-error",
            ErrorKind::NotImplemented => "not-implemented",
            ErrorKind::BadGateway => "bad-gateway",
        }
    }
}

/// How loudly a failure should be surfaced. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Invalid input or missing entity.
    Client,
    /// A store or remote service failed; nothing was left half-written.
    Upstream,
    /// State may be inconsistent across stores.
    Critical,
}

#[derive(Error, Debug)]
pub enum CoachError {
    #[error("coach data is empty")]
    EmptyPayload,

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Malformed photo reference: {reference}")]
    MalformedReference { reference: String },

    #[error("Remote call {call} failed: {message}")]
    RemoteCallFailed { call: &'static str, message: String },

    #[error("Compensation failed ({compensation}) while recovering from: {original}")]
    CompensationFailed {
        original: Box<CoachError>,
        compensation: Box<CoachError>,
    },

    #[error("Method not implemented: {method}")]
    NotImplemented { method: &'static str },
}

impl CoachError {
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(entity: &'static str, id: S) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn malformed_reference<S: Into<String>>(reference: S) -> Self {
        Self::MalformedReference {
            reference: reference.into(),
        }
    }

    /// Wrap any downstream failure (database, blob store, remote service).
    pub fn remote<E: std::fmt::Display>(call: &'static str, error: E) -> Self {
        Self::RemoteCallFailed {
            call,
            message: error.to_string(),
        }
    }

    pub fn compensation_failed(original: CoachError, compensation: CoachError) -> Self {
        Self::CompensationFailed {
            original: Box::new(original),
            compensation: Box::new(compensation),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CoachError::EmptyPayload | CoachError::BadRequest { .. } => ErrorKind::BadRequest,
            CoachError::NotFound { .. } => ErrorKind::NotFound,
            CoachError::MalformedReference { .. } | CoachError::CompensationFailed { .. } => {
                ErrorKind::GeneralError
            }
            CoachError::RemoteCallFailed { .. } => ErrorKind::BadGateway,
            CoachError::NotImplemented { .. } => ErrorKind::NotImplemented,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CoachError::EmptyPayload
            | CoachError::BadRequest { .. }
            | CoachError::NotFound { .. }
            | CoachError::NotImplemented { .. } => Severity::Client,
            CoachError::MalformedReference { .. } | CoachError::RemoteCallFailed { .. } => {
                Severity::Upstream
            }
            CoachError::CompensationFailed { .. } => Severity::Critical,
        }
    }

    pub fn code(&self) -> u16 {
        self.kind().status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind().class_name()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CoachError::NotFound { .. })
    }

    /// Client-facing JSON payload.
    ///
    /// Downstream messages are replaced by the failing call name so driver or
    /// network details never reach the caller.
    pub fn to_json(&self) -> serde_json::Value {
        let message = match self {
            CoachError::RemoteCallFailed { call, .. } => format!("Remote call {call} failed"),
            CoachError::CompensationFailed { .. } => {
                "Partial write could not be rolled back".to_string()
            }
            other => other.to_string(),
        };

        let mut base = json!({
            "name": self.name(),
            "message": message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let CoachError::CompensationFailed { original, .. } = self {
            base["data"] = json!({ "original": original.name() });
        }
        base
    }
}
