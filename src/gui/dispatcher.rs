//! The GUI channel endpoint: outbound commands, inbound events, and the
//! shared [`GuiState`] they update.
//!
//! State is published through an [`ArcSwap`] so readers on other tasks take
//! lock-free snapshots while the dispatcher swaps in new values.

use std::sync::Arc;

use arc_swap::ArcSwap;
use par_nvim_rpc::{RpcTransport, TransportError};
use serde_json::Value;
use tokio::sync::OnceCell;

use super::error::ProtocolError;
use super::event::{GUI_CHANNEL, GuiEvent};
use super::state::GuiState;

/// Channels registered with the core. Fixed once established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    channels: Vec<String>,
}

impl Subscription {
    pub fn channels(&self) -> &[String] {
        &self.channels
    }
}

/// Read-only view of the GUI state, cheap to clone and share.
#[derive(Debug, Clone)]
pub struct StateReader {
    state: Arc<ArcSwap<GuiState>>,
}

impl StateReader {
    /// A consistent copy of the whole state.
    pub fn snapshot(&self) -> Arc<GuiState> {
        self.state.load_full()
    }
}

/// Maps GUI commands to outbound notifications and inbound notifications
/// to [`GuiState`] updates.
///
/// The dispatcher is the only writer of the state; any number of readers
/// take snapshots through [`GuiDispatcher::reader`].
pub struct GuiDispatcher<T: RpcTransport> {
    transport: Arc<T>,
    state: Arc<ArcSwap<GuiState>>,
    subscription: OnceCell<Subscription>,
}

impl<T: RpcTransport> GuiDispatcher<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            state: Arc::new(ArcSwap::from_pointee(GuiState::default())),
            subscription: OnceCell::new(),
        }
    }

    pub fn state(&self) -> Arc<GuiState> {
        self.state.load_full()
    }

    pub fn reader(&self) -> StateReader {
        StateReader {
            state: Arc::clone(&self.state),
        }
    }

    /// Register for GUI channel notifications.
    ///
    /// Only the first successful call talks to the core; later calls return
    /// the same subscription.
    pub async fn subscribe(&self) -> Result<&Subscription, TransportError> {
        self.subscription
            .get_or_try_init(|| async {
                self.transport
                    .request("nvim_subscribe", vec![Value::from(GUI_CHANNEL)])
                    .await?;
                log::info!("Subscribed to '{GUI_CHANNEL}' notifications");
                Ok(Subscription {
                    channels: vec![GUI_CHANNEL.to_string()],
                })
            })
            .await
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.get()
    }

    /// Send one event as a GUI channel notification.
    pub async fn send(&self, event: &GuiEvent) -> Result<(), TransportError> {
        log::debug!("-> {GUI_CHANNEL} {}", event.name());
        self.transport.notify(GUI_CHANNEL, event.to_args()).await
    }

    /// Handle an inbound notification.
    ///
    /// Updates the state for known events and returns the decoded event so
    /// the caller can react to [`GuiEvent::Close`]. Never sends anything.
    pub fn handle_notification(
        &self,
        method: &str,
        args: &[Value],
    ) -> Result<GuiEvent, ProtocolError> {
        if method != GUI_CHANNEL {
            return Err(ProtocolError::NotGuiChannel(method.to_string()));
        }

        let event = GuiEvent::from_args(args)?;
        log::debug!("<- {GUI_CHANNEL} {}", event.name());

        if let GuiEvent::Unknown(name) = &event {
            log::debug!("Ignoring unknown GUI event '{name}'");
        } else {
            self.update(|state| {
                state.apply(&event);
            });
        }
        Ok(event)
    }

    /// Record the presentation layer's window handle.
    pub fn set_window_id(&self, window_id: Option<u64>) {
        self.update(|state| state.window_id = window_id);
    }

    /// Copy, mutate and publish. Readers never see a half-applied change.
    fn update(&self, mutate: impl Fn(&mut GuiState)) {
        self.state.rcu(|current| {
            let mut next = GuiState::clone(current);
            mutate(&mut next);
            next
        });
    }
}
