#[cfg(feature = "rpc-client")]
pub mod client;

mod error;
mod types;

pub use error::*;
pub use types::*;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Request channel to a node that understands the development control methods.
///
/// Implemented by the HTTP client and by in-process simulated nodes, so code
/// driving a node never depends on how requests reach it.
#[async_trait]
pub trait ControlChannel: Send + Sync {
    /// Send `method` with positional `params` and return the raw `result`.
    ///
    /// # Errors
    ///
    /// Returns the transport failure or the node's error object unchanged.
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

#[async_trait]
impl<T: ControlChannel + ?Sized> ControlChannel for Arc<T> {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        (**self).request(method, params).await
    }
}
