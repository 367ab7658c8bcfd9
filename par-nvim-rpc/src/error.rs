//! Typed errors for the RPC transport.

use thiserror::Error;

use crate::jsonrpc::RpcError;

/// Failure of a single request or notification on the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Writing to the underlying stream failed.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The outgoing message could not be serialized as JSON.
    #[error("failed to encode JSON-RPC message: {0}")]
    Encode(#[from] serde_json::Error),

    /// The outgoing message could not be serialized as MessagePack.
    #[error("failed to encode MessagePack-RPC message: {0}")]
    EncodeMsgPack(String),

    /// The writer has been shut down with [`crate::RpcClient::close`].
    #[error("transport is closed")]
    Closed,

    /// The reader reached end-of-stream before the response arrived.
    #[error("connection closed before a response to request {0} arrived")]
    ResponseDropped(u64),

    /// The remote side answered with an error object.
    #[error("{0}")]
    Remote(RpcError),
}

/// An inbound frame that did not decode into a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Well delimited, but not a valid message. The frame is skipped.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// A line grew past the frame limit. It is skipped up to its newline.
    #[error("frame exceeds {limit} bytes")]
    Oversize { limit: usize },

    /// The stream cannot be decoded any further.
    #[error("undecodable stream: {0}")]
    Corrupt(String),
}

impl FrameError {
    /// Whether the reader must stop after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FrameError::Corrupt(_))
    }
}
