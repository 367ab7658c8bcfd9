//! par-nvim-rpc: the RPC channel between par-nvim and the editor core.
//!
//! The bridge only needs two primitives from its transport: "call a method and
//! wait for the result" and "fire a notification". Both are captured by the
//! [`RpcTransport`] trait so the connection manager and the GUI protocol never
//! depend on framing details.
//!
//! # Modules
//!
//! - [`jsonrpc`] - message model (JSON-RPC 2.0 shaped) and classification
//! - [`codec`] - MessagePack-RPC and line-delimited JSON framing
//! - [`client`] - [`RpcClient`] over any async reader/writer pair (child
//!   pipes, inherited stdio, sockets)
//! - [`transport`] - the [`RpcTransport`] trait
//! - [`error`] - [`TransportError`], [`FrameError`]

pub mod client;
pub mod codec;
pub mod error;
pub mod jsonrpc;
pub mod transport;

pub use client::RpcClient;
pub use codec::{FrameDecoder, Framing, MAX_FRAME_LEN};
pub use error::{FrameError, TransportError};
pub use jsonrpc::{IncomingMessage, Notification, Request, Response, RpcError};
pub use transport::RpcTransport;
