//! Shared integration test helpers for par-nvim.
//!
//! Fakes for the three seams the bridge talks through: the RPC transport,
//! the launcher that opens streams to the core, and the host environment
//! consulted for the runtime path. [`Peer`] plays the core's side of an
//! in-memory duplex stream.
//!
//! Include with `mod common;` at the top of a test file. The
//! `#![allow(dead_code)]` keeps files that use only a subset quiet.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use par_nvim::connector::{CoreStreams, HostEnvironment, Launcher, ServerAddress};
use par_nvim::error::ConnectionError;
use par_nvim_rpc::{FrameDecoder, Framing, RpcTransport, TransportError};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};

// ============================================================================
// Transport
// ============================================================================

/// Transport that records traffic instead of sending it.
#[derive(Default)]
pub struct FakeTransport {
    notifications: Mutex<Vec<(String, Vec<Value>)>>,
    requests: Mutex<Vec<(String, Vec<Value>)>>,
    fail_sends: AtomicBool,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later send fail with [`TransportError::Closed`].
    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    /// Undo [`FakeTransport::fail_sends`].
    pub fn resume_sends(&self) {
        self.fail_sends.store(false, Ordering::SeqCst);
    }

    pub fn notifications(&self) -> Vec<(String, Vec<Value>)> {
        self.notifications.lock().clone()
    }

    pub fn requests(&self) -> Vec<(String, Vec<Value>)> {
        self.requests.lock().clone()
    }
}

impl RpcTransport for FakeTransport {
    async fn request(&self, method: &str, args: Vec<Value>) -> Result<Value, TransportError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.requests.lock().push((method.to_string(), args));
        Ok(Value::Null)
    }

    async fn notify(&self, method: &str, args: Vec<Value>) -> Result<(), TransportError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.notifications.lock().push((method.to_string(), args));
        Ok(())
    }
}

// ============================================================================
// Launcher
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchCall {
    Spawn { program: String, args: Vec<String> },
    Embed,
    Attach(ServerAddress),
}

/// Launcher that records each call and hands back in-memory streams.
///
/// The core's end of each stream is kept for [`RecordingLauncher::take_peer`].
#[derive(Default)]
pub struct RecordingLauncher {
    calls: Mutex<Vec<LaunchCall>>,
    peers: Mutex<Vec<DuplexStream>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<LaunchCall> {
        self.calls.lock().clone()
    }

    /// The core side of the most recent connection.
    pub fn take_peer(&self) -> Option<Peer> {
        self.peers.lock().pop().map(Peer::new)
    }

    fn record(&self, call: LaunchCall) -> CoreStreams {
        self.calls.lock().push(call);
        let (ours, theirs) = tokio::io::duplex(64 * 1024);
        self.peers.lock().push(theirs);
        let (reader, writer) = tokio::io::split(ours);
        CoreStreams::new(reader, writer)
    }
}

impl Launcher for RecordingLauncher {
    fn spawn(&self, program: &str, args: &[String]) -> Result<CoreStreams, ConnectionError> {
        Ok(self.record(LaunchCall::Spawn {
            program: program.to_string(),
            args: args.to_vec(),
        }))
    }

    fn embed(&self) -> Result<CoreStreams, ConnectionError> {
        Ok(self.record(LaunchCall::Embed))
    }

    async fn attach(&self, address: &ServerAddress) -> Result<CoreStreams, ConnectionError> {
        Ok(self.record(LaunchCall::Attach(address.clone())))
    }
}

// ============================================================================
// Host environment
// ============================================================================

/// Host environment backed by in-memory maps.
#[derive(Default)]
pub struct FakeHost {
    vars: HashMap<String, String>,
    dirs: HashSet<PathBuf>,
    exe_dir: Option<PathBuf>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.insert(dir.into());
        self
    }

    pub fn with_exe_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.exe_dir = Some(dir.into());
        self
    }
}

impl HostEnvironment for FakeHost {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn exe_dir(&self) -> Option<PathBuf> {
        self.exe_dir.clone()
    }
}

/// Runtime directory the bridge expects next to a binary in `bin_dir`.
pub fn binary_relative_runtime(bin_dir: &Path) -> PathBuf {
    let prefix = bin_dir.parent().expect("bin dir has a parent");
    if cfg!(target_os = "macos") {
        prefix.join("Resources").join("runtime")
    } else {
        prefix.join("share").join("par-nvim").join("runtime")
    }
}

// ============================================================================
// Core peer
// ============================================================================

/// The editor core's end of an in-memory connection, speaking MessagePack-RPC.
///
/// Messages from the bridge are returned as JSON objects shaped like
/// JSON-RPC (`id`, `method`, `params`, `result`, `error`).
pub struct Peer {
    reader: ReadHalf<DuplexStream>,
    writer: WriteHalf<DuplexStream>,
    decoder: FrameDecoder,
}

impl Peer {
    pub fn new(stream: DuplexStream) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            reader,
            writer,
            decoder: FrameDecoder::new(Framing::MessagePack),
        }
    }

    /// Next message from the bridge, or `None` once it closed its side.
    pub async fn read_message(&mut self) -> Option<Value> {
        let mut chunk = vec![0u8; 8192];
        loop {
            if let Some(msg) = self.decoder.next_message().expect("bridge sent an invalid frame") {
                return Some(serde_json::to_value(msg).expect("message converts to JSON"));
            }
            let read = tokio::time::timeout(Duration::from_secs(5), self.reader.read(&mut chunk))
                .await
                .expect("timed out waiting for the bridge")
                .expect("peer read failed");
            if read == 0 {
                return None;
            }
            self.decoder.extend(&chunk[..read]);
        }
    }

    /// Read everything until the bridge closes its side.
    pub async fn read_until_closed(&mut self) -> Vec<Value> {
        let mut messages = Vec::new();
        while let Some(msg) = self.read_message().await {
            messages.push(msg);
        }
        messages
    }

    /// Write raw bytes, reporting failure instead of panicking.
    pub async fn try_write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await
    }

    async fn write(&mut self, bytes: Vec<u8>) {
        self.try_write(&bytes).await.expect("peer write failed");
    }

    pub async fn notify(&mut self, method: &str, args: Vec<Value>) {
        let frame = Framing::MessagePack
            .encode_request(None, method, args)
            .expect("notification encodes");
        self.write(frame).await;
    }

    /// Call a method on the bridge.
    pub async fn call(&mut self, id: u64, method: &str, args: Vec<Value>) {
        let frame = Framing::MessagePack
            .encode_request(Some(id), method, args)
            .expect("request encodes");
        self.write(frame).await;
    }

    /// Send a GUI channel notification: `Gui(event, args...)`.
    pub async fn gui(&mut self, event: &str, args: Vec<Value>) {
        let mut params = vec![json!(event)];
        params.extend(args);
        self.notify("Gui", params).await;
    }

    /// Answer a request with a nil result.
    pub async fn ack(&mut self, request: &Value) {
        let id = request["id"].as_u64().expect("request has an id");
        let frame = Framing::MessagePack
            .encode_response(id, None, None)
            .expect("response encodes");
        self.write(frame).await;
    }

    /// Close the core's side.
    pub async fn hang_up(mut self) {
        let _ = self.writer.shutdown().await;
    }
}
