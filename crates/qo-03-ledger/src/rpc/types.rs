//! Wire types of the JSON-RPC interface.

use crate::domain::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON-RPC 2.0 error codes used by the ledger host.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;

    /// Transaction refused at submission.
    pub const TRANSACTION_REJECTED: i32 = -32000;
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(details: impl fmt::Display) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {details}"))
    }

    pub fn invalid_request(details: impl fmt::Display) -> Self {
        Self::new(codes::INVALID_REQUEST, format!("Invalid request: {details}"))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(codes::METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    pub fn invalid_params(details: impl fmt::Display) -> Self {
        Self::new(codes::INVALID_PARAMS, format!("Invalid params: {details}"))
    }
}

impl From<LedgerError> for RpcError {
    fn from(err: LedgerError) -> Self {
        Self {
            code: codes::TRANSACTION_REJECTED,
            message: err.to_string(),
            data: Some(serde_json::json!({ "reason": err.label() })),
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

/// Extracts positional parameter `index`. A non-array `params` counts as
/// the single parameter at index 0.
pub fn parse_param<T: serde::de::DeserializeOwned>(
    params: Option<&serde_json::Value>,
    index: usize,
) -> Result<T, RpcError> {
    let param = params
        .and_then(|p| {
            if p.is_array() {
                p.get(index)
            } else if index == 0 {
                Some(p)
            } else {
                None
            }
        })
        .ok_or_else(|| RpcError::invalid_params(format!("missing parameter at index {index}")))?;

    serde_json::from_value(param.clone())
        .map_err(|e| RpcError::invalid_params(format!("parameter {index}: {e}")))
}
