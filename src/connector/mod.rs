//! Connection management: reaching the editor core in one of three modes.
//!
//! [`ConnectionRequest::from_options`] validates startup options without any
//! I/O, [`establish`] opens the transport through a [`Launcher`], and the
//! resulting [`ConnectionHandle`] owns everything the connection created.

mod address;
mod launch;
mod login_env;
mod request;
mod runtime_path;

pub use address::ServerAddress;
pub use launch::{CoreStreams, Launcher, SystemLauncher};
pub use request::{
    ConnectionMode, ConnectionRequest, LaunchOptions, STARTUP_FLAGS, spawn_arguments,
};
pub use runtime_path::{
    COMPILED_RUNTIME_PATH, HostEnvironment, RUNTIME_PATH_ENV, RuntimeCandidate,
    RuntimePathHint, RuntimePathSource, SystemHost,
};

use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;

use par_nvim_rpc::{IncomingMessage, RpcClient, RpcTransport, TransportError};
use serde_json::Value;
use tokio::process::Child;
use tokio::sync::mpsc;

use crate::error::{BridgeError, ConnectionError};

/// Open the transport described by `request`.
pub async fn establish<L: Launcher>(
    request: ConnectionRequest,
    launcher: &L,
) -> Result<ConnectionHandle, ConnectionError> {
    let mode = request.mode();
    let streams = match request {
        ConnectionRequest::Spawn { program, args } => launcher.spawn(&program, &args)?,
        ConnectionRequest::Embed => launcher.embed()?,
        ConnectionRequest::ServerAttach { address } => {
            let address = ServerAddress::parse(&address)?;
            launcher.attach(&address).await?
        }
    };
    log::info!("Connected to editor core ({mode})");
    Ok(ConnectionHandle::new(mode, streams))
}

/// Validate `options` and connect. Nothing is launched if validation fails.
pub async fn connect<H, L>(
    options: &LaunchOptions,
    host: &H,
    launcher: &L,
) -> Result<ConnectionHandle, BridgeError>
where
    H: HostEnvironment,
    L: Launcher,
{
    let request = ConnectionRequest::from_options(options, host)?;
    Ok(establish(request, launcher).await?)
}

/// A live connection to the editor core.
///
/// Owns the RPC client and, in spawn mode, the child process. The child is
/// killed if the handle is dropped without [`ConnectionHandle::close`].
pub struct ConnectionHandle {
    mode: ConnectionMode,
    client: Arc<RpcClient>,
    incoming: Option<mpsc::UnboundedReceiver<IncomingMessage>>,
    child: Option<Child>,
}

impl ConnectionHandle {
    /// Wrap already opened streams.
    pub fn new(mode: ConnectionMode, streams: CoreStreams) -> Self {
        let mut client = RpcClient::new(streams.reader, streams.writer);
        let incoming = client.take_incoming();
        Self {
            mode,
            client: Arc::new(client),
            incoming,
            child: streams.child,
        }
    }

    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// Shared RPC client, for components that send on this connection.
    pub fn client(&self) -> Arc<RpcClient> {
        Arc::clone(&self.client)
    }

    /// Process id of the spawned editor, if this connection owns one.
    pub fn child_id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Inbound notifications and calls, in arrival order.
    ///
    /// Available once; later calls return `None`.
    pub fn take_notifications(&mut self) -> Option<mpsc::UnboundedReceiver<IncomingMessage>> {
        self.incoming.take()
    }

    pub async fn request(&self, method: &str, args: Vec<Value>) -> Result<Value, TransportError> {
        self.client.request(method, args).await
    }

    pub async fn notify(&self, method: &str, args: Vec<Value>) -> Result<(), TransportError> {
        self.client.notify(method, args).await
    }

    /// Release the transport and reap the child.
    ///
    /// Closing the editor's stdin normally makes it exit; if it has not
    /// exited within `grace` it is killed.
    pub async fn close(mut self, grace: Duration) -> Option<ExitStatus> {
        self.client.close().await;
        let mut child = self.child.take()?;

        match tokio::time::timeout(grace, child.wait()).await {
            Ok(Ok(status)) => {
                log::info!("Editor exited with {status}");
                Some(status)
            }
            Ok(Err(e)) => {
                log::warn!("Failed waiting for editor: {e}");
                None
            }
            Err(_) => {
                log::warn!("Editor did not exit within {grace:?}, killing it");
                if let Err(e) = child.kill().await {
                    log::warn!("Failed to kill editor: {e}");
                    return None;
                }
                child.wait().await.ok()
            }
        }
    }
}
