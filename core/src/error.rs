//! Error types for the catalog client.
//!
//! # Design
//! Transport failures, non-2xx statuses, decode failures and unsupported
//! operations are separate variants so callers can branch on them. A 404 on
//! an id-addressed operation is promoted to `EntityNotFound`; on any other
//! operation it stays an `Http` error carrying the status.

use thiserror::Error;
use uuid::Uuid;

use crate::bridge::BridgeError;
use crate::models::EntityKind;

/// Errors returned by catalog operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, timeout, TLS).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The server answered 404 for an id-addressed operation.
    #[error("{entity} {id} not found")]
    EntityNotFound { entity: EntityKind, id: Uuid },

    /// The response body did not match the expected shape.
    #[error(transparent)]
    Malformed(#[from] BridgeError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The operation is not implemented by this client. No request was sent.
    #[error("operation not supported: {operation}")]
    Unsupported { operation: &'static str },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::EntityNotFound { .. } | ApiError::Http { status: 404, .. }
        )
    }

    /// Status code of the response that caused the error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::EntityNotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Promotes a 404 into `EntityNotFound` for the given entity.
    pub(crate) fn for_entity(self, entity: EntityKind, id: Uuid) -> Self {
        match self {
            ApiError::Http { status: 404, .. } => ApiError::EntityNotFound { entity, id },
            other => other,
        }
    }
}
