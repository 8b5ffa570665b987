//! Error types for the contract lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::store::StoreError;

/// Contract operation result type.
pub type Result<T> = std::result::Result<T, ContractError>;

/// Contract lifecycle errors.
///
/// Every variant carries a human-readable message; callers branch on
/// [`ContractError::kind`] rather than on message text.
#[derive(Error, Debug)]
pub enum ContractError {
    /// Malformed or missing input, wrong arity, unknown operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No record stored under the requested id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored record could not be decoded
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Mutation attempted on a contract that is no longer Proposed
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Acting party is not allowed to perform the transition
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// External key-value store failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl ContractError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// The error kind tag.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::InvalidTransition(_) => ErrorKind::InvalidTransition,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }
}

/// Tag identifying which class of failure a [`ContractError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    InvalidState,
    InvalidTransition,
    Unauthorized,
    StoreUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::InvalidState => "invalid_state",
            Self::InvalidTransition => "invalid_transition",
            Self::Unauthorized => "unauthorized",
            Self::StoreUnavailable => "store_unavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
