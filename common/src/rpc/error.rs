use serde_json::Error as SerdeError;
use thiserror::Error;

// JSON RPC error codes
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
// Implementation-defined server error, used for rejected execution
pub const SERVER_ERROR: i64 = -32000;

/// Failure to exchange a request with the node
///
/// Errors are reported exactly as the transport or the node produced them;
/// nothing is retried.
#[derive(Error, Debug)]
pub enum RpcError {
    /// Connection refused, timeout or any other HTTP transport failure
    #[cfg(feature = "rpc-client")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The node answered with a non-success HTTP status
    #[error("HTTP error {0}")]
    Status(u16),

    /// The node answered with a JSON RPC error object
    #[error("RPC error {code}: {message}")]
    Server { code: i64, message: String },

    /// The node answered, but not with what the method should return
    #[error("Malformed response to '{method}': {reason}")]
    MalformedResponse { method: String, reason: String },

    #[error(transparent)]
    Json(#[from] SerdeError),
}

impl RpcError {
    pub fn server(code: i64, message: impl Into<String>) -> Self {
        Self::Server {
            code,
            message: message.into(),
        }
    }

    pub fn malformed(method: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::server(INVALID_PARAMS, message)
    }

    /// JSON RPC code when the node returned an error object
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Server { code, .. } => Some(*code),
            _ => None,
        }
    }
}
