//! Orderly shutdown of a connection.
//!
//! ```text
//! Connected -> ClosingRequestedLocally -> CloseSent -> Disconnected
//! Connected -> CoreLeaving -> Disconnected
//! ```
//!
//! A local close request sends `Close` at most once and never waits for the
//! core to agree. When the core announces it is leaving nothing is sent.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use par_nvim_rpc::RpcTransport;

use crate::connector::ConnectionHandle;
use crate::gui::{GuiDispatcher, GuiEvent};

/// Why the connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// We asked the core to close.
    LocalClose,
    /// The core announced it was leaving.
    CoreLeft,
    /// The transport ended with no close from either side.
    CoreExitedUnexpectedly,
}

impl DisconnectReason {
    /// Process exit code for this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            DisconnectReason::LocalClose | DisconnectReason::CoreLeft => 0,
            DisconnectReason::CoreExitedUnexpectedly => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Connected,
    ClosingRequestedLocally,
    CloseSent,
    CoreLeaving,
    Disconnected(DisconnectReason),
}

pub struct ShutdownCoordinator<T: RpcTransport> {
    dispatcher: Arc<GuiDispatcher<T>>,
    state: Mutex<ShutdownState>,
    handle: tokio::sync::Mutex<Option<ConnectionHandle>>,
    close_grace: Duration,
}

impl<T: RpcTransport> ShutdownCoordinator<T> {
    /// `handle` is released when the coordinator reaches `Disconnected`.
    pub fn new(
        dispatcher: Arc<GuiDispatcher<T>>,
        handle: Option<ConnectionHandle>,
        close_grace: Duration,
    ) -> Self {
        Self {
            dispatcher,
            state: Mutex::new(ShutdownState::Connected),
            handle: tokio::sync::Mutex::new(handle),
            close_grace,
        }
    }

    pub fn state(&self) -> ShutdownState {
        *self.state.lock()
    }

    pub fn is_disconnected(&self) -> bool {
        matches!(self.state(), ShutdownState::Disconnected(_))
    }

    /// Ask the core to close.
    ///
    /// Returns `true` if this call sent the request, `false` if shutdown was
    /// already under way. Send failures are logged, not returned.
    pub async fn request_close(&self) -> bool {
        {
            let mut state = self.state.lock();
            if *state != ShutdownState::Connected {
                log::debug!("Close already in progress ({:?})", *state);
                return false;
            }
            *state = ShutdownState::ClosingRequestedLocally;
        }

        log::info!("Requesting editor close");
        if let Err(e) = self.dispatcher.send(&GuiEvent::Close).await {
            log::warn!("Failed to send close request: {e}");
        }

        let mut state = self.state.lock();
        if *state == ShutdownState::ClosingRequestedLocally {
            *state = ShutdownState::CloseSent;
        }
        true
    }

    /// The core reported that it is leaving.
    pub fn core_leaving(&self) {
        let mut state = self.state.lock();
        if matches!(*state, ShutdownState::Disconnected(_)) {
            return;
        }
        log::info!("Editor is leaving");
        *state = ShutdownState::CoreLeaving;
    }

    /// Move to `Disconnected` and release the connection.
    ///
    /// Safe to call more than once; later calls return the first reason.
    pub async fn disconnect(&self) -> DisconnectReason {
        let reason = {
            let mut state = self.state.lock();
            let reason = match *state {
                ShutdownState::Disconnected(reason) => return reason,
                ShutdownState::Connected => DisconnectReason::CoreExitedUnexpectedly,
                ShutdownState::ClosingRequestedLocally | ShutdownState::CloseSent => {
                    DisconnectReason::LocalClose
                }
                ShutdownState::CoreLeaving => DisconnectReason::CoreLeft,
            };
            *state = ShutdownState::Disconnected(reason);
            reason
        };

        match reason {
            DisconnectReason::CoreExitedUnexpectedly => {
                log::warn!("Editor connection ended without a close")
            }
            _ => log::info!("Disconnected ({reason:?})"),
        }

        let handle = self.handle.lock().await.take();
        if let Some(handle) = handle {
            handle.close(self.close_grace).await;
        }
        reason
    }
}
