//! RPC client over any async reader/writer pair.
//!
//! A background task reads the inbound half, routing responses to the
//! request that is waiting for them and everything else (notifications,
//! calls from the core) to an unbounded channel handed out once via
//! [`RpcClient::take_incoming`]. The task is aborted when the client is
//! dropped, which releases the read half of the stream.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::codec::{FrameDecoder, Framing};
use crate::error::TransportError;
use crate::jsonrpc::{IncomingMessage, Response, RpcError};
use crate::transport::RpcTransport;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Response>>>>;

const READ_CHUNK: usize = 8 * 1024;

/// An RPC client speaking MessagePack-RPC or line-delimited JSON-RPC.
pub struct RpcClient {
    /// Writer half. The lock is the single ordered write path; `None` once closed.
    writer: Mutex<Option<BoxedWriter>>,
    framing: Framing,
    /// Monotonically increasing request id counter.
    next_id: AtomicU64,
    /// Pending requests awaiting a response, keyed by request id.
    pending: PendingMap,
    /// Receiver side, handed out exactly once via `take_incoming()`.
    incoming_rx: Option<mpsc::UnboundedReceiver<IncomingMessage>>,
    reader_task: JoinHandle<()>,
}

impl RpcClient {
    /// Create a MessagePack-RPC client and spawn its reader task.
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::with_framing(reader, writer, Framing::MessagePack)
    }

    /// Create a client with explicit framing and spawn its reader task.
    ///
    /// Must be called from within a Tokio runtime. The reader task ends when
    /// the stream reaches EOF, a read fails, the stream becomes undecodable,
    /// the incoming receiver is dropped, or the client is dropped; any
    /// requests still pending at that point fail with
    /// [`TransportError::ResponseDropped`].
    pub fn with_framing<R, W>(reader: R, writer: W, framing: Framing) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel::<IncomingMessage>();

        let reader_pending = Arc::clone(&pending);
        let reader_task = tokio::spawn(async move {
            read_loop(reader, framing, reader_pending, incoming_tx).await;
        });

        Self {
            writer: Mutex::new(Some(Box::new(writer))),
            framing,
            next_id: AtomicU64::new(1),
            pending,
            incoming_rx: Some(incoming_rx),
            reader_task,
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Take the receiver for incoming notifications and RPC calls.
    ///
    /// This can only be called once; subsequent calls return `None`.
    pub fn take_incoming(&mut self) -> Option<mpsc::UnboundedReceiver<IncomingMessage>> {
        self.incoming_rx.take()
    }

    /// Send a request and wait for the matching response.
    ///
    /// Returns the raw [`Response`]; use [`RpcTransport::request`] to get the
    /// result value with remote errors mapped to [`TransportError::Remote`].
    pub async fn call(&self, method: &str, args: Vec<Value>) -> Result<Response, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = self.framing.encode_request(Some(id), method, args)?;

        let (tx, rx) = oneshot::channel::<Response>();

        // Register the pending request before writing to avoid races.
        self.pending.lock().await.insert(id, tx);

        if let Err(e) = self.write_frame(&frame).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        rx.await.map_err(|_| TransportError::ResponseDropped(id))
    }

    /// Send a notification (no id, no response expected).
    pub async fn send_notification(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> Result<(), TransportError> {
        let frame = self.framing.encode_request(None, method, args)?;
        self.write_frame(&frame).await
    }

    /// Answer an RPC call that the core made to us.
    pub async fn respond(
        &self,
        id: u64,
        result: Option<Value>,
        error: Option<RpcError>,
    ) -> Result<(), TransportError> {
        let frame = self.framing.encode_response(id, result, error)?;
        self.write_frame(&frame).await
    }

    /// Shut down the writer half. Later sends fail with [`TransportError::Closed`].
    ///
    /// Closing twice is harmless.
    pub async fn close(&self) {
        let writer = self.writer.lock().await.take();
        if let Some(mut writer) = writer
            && let Err(e) = writer.shutdown().await
        {
            log::debug!("RPC writer shutdown failed: {e}");
        }
    }

    /// Whether [`Self::close`] has been called.
    pub async fn is_closed(&self) -> bool {
        self.writer.lock().await.is_none()
    }

    async fn write_frame(&self, frame: &[u8]) -> Result<(), TransportError> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(TransportError::Closed)?;
        writer.write_all(frame).await?;
        writer.flush().await?;
        Ok(())
    }
}

impl Drop for RpcClient {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

impl RpcTransport for RpcClient {
    async fn request(&self, method: &str, args: Vec<Value>) -> Result<Value, TransportError> {
        let response = self.call(method, args).await?;
        if let Some(err) = response.error {
            return Err(TransportError::Remote(err));
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    async fn notify(&self, method: &str, args: Vec<Value>) -> Result<(), TransportError> {
        self.send_notification(method, args).await
    }
}

async fn read_loop<R>(
    mut reader: R,
    framing: Framing,
    pending: PendingMap,
    incoming_tx: mpsc::UnboundedSender<IncomingMessage>,
) where
    R: AsyncRead + Send + Unpin,
{
    let mut decoder = FrameDecoder::new(framing);
    let mut chunk = vec![0u8; READ_CHUNK];

    'read: loop {
        let n = match reader.read(&mut chunk).await {
            Ok(0) => {
                log::debug!("RPC stream reached EOF");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                log::error!("Error reading from RPC stream: {e}");
                break;
            }
        };
        decoder.extend(&chunk[..n]);

        loop {
            match decoder.next_message() {
                Ok(Some(msg)) => {
                    if !dispatch(msg, &pending, &incoming_tx).await {
                        // Receiver dropped; nobody is listening any more.
                        break 'read;
                    }
                }
                Ok(None) => break,
                Err(e) if e.is_fatal() => {
                    log::error!("Closing RPC stream: {e}");
                    break 'read;
                }
                Err(e) => log::warn!("Dropping RPC frame: {e}"),
            }
        }
    }

    // Dropping the senders wakes every waiting request with an error.
    pending.lock().await.clear();
}

/// Route one decoded message. Returns `false` once nobody receives incoming
/// messages.
async fn dispatch(
    msg: IncomingMessage,
    pending: &PendingMap,
    incoming_tx: &mpsc::UnboundedSender<IncomingMessage>,
) -> bool {
    if !msg.is_response() {
        return incoming_tx.send(msg).is_ok();
    }
    let Some(id) = msg.id else {
        log::error!("Received response without id");
        return true;
    };
    match pending.lock().await.remove(&id) {
        Some(tx) => {
            let _ = tx.send(msg.into_response());
        }
        None => log::error!("Received response for unknown request id {id}"),
    }
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
