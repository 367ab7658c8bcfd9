//! The transport seam.

use std::future::Future;

use serde_json::Value;

use crate::error::TransportError;

/// The two primitives the bridge needs from an RPC channel.
///
/// Implementations must preserve the order of notifications sent from one
/// task, and must serialise concurrent senders onto a single write path.
pub trait RpcTransport: Send + Sync {
    /// Call `method` with positional `args` and wait for its result.
    fn request(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;

    /// Fire-and-forget notification.
    fn notify(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
