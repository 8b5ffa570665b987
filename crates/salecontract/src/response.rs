//! Invocation response envelope.
//!
//! Mirrors the host's success/error response: a status code, a message on
//! failure, and an optional payload on success.

use serde::{Deserialize, Serialize};

use crate::error::{ContractError, ErrorKind};

pub const OK: u16 = 200;
pub const ERROR: u16 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,

    /// Decoded JSON when the payload is JSON, otherwise its text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl Response {
    pub fn success(payload: Option<&[u8]>) -> Self {
        Self {
            status: OK,
            message: String::new(),
            kind: None,
            payload: payload.map(decode_payload),
        }
    }

    pub fn error(err: &ContractError) -> Self {
        Self {
            status: ERROR,
            message: err.to_string(),
            kind: Some(err.kind()),
            payload: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == OK
    }
}

fn decode_payload(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

impl From<Result<Vec<u8>, ContractError>> for Response {
    fn from(result: Result<Vec<u8>, ContractError>) -> Self {
        match result {
            Ok(payload) => Self::success(Some(&payload)),
            Err(e) => Self::error(&e),
        }
    }
}

impl From<Result<(), ContractError>> for Response {
    fn from(result: Result<(), ContractError>) -> Self {
        match result {
            Ok(()) => Self::success(None),
            Err(e) => Self::error(&e),
        }
    }
}
