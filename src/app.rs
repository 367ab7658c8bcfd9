//! Application bootstrap: connect, subscribe, apply startup state, then
//! route inbound traffic until the connection ends.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use par_nvim_config::Config;
use par_nvim_rpc::{IncomingMessage, RpcClient, RpcError, RpcTransport};
use tokio::sync::mpsc;

use crate::cli::{RuntimeOptions, WindowRequest};
use crate::connector::{self, HostEnvironment, Launcher, SystemHost, SystemLauncher};
use crate::gui::{GuiDispatcher, GuiEvent, ProtocolError};
use crate::shutdown::{DisconnectReason, ShutdownCoordinator};

/// GUI state requested before the core has reported anything.
///
/// Sent through the same commands a user would issue at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupState {
    pub font: Option<String>,
    pub linespace: Option<i64>,
    pub mouse_hide: Option<bool>,
    pub window: Option<WindowRequest>,
}

impl StartupState {
    pub fn from_options(options: &RuntimeOptions, config: &Config) -> Self {
        Self {
            font: config.font.clone(),
            linespace: config.linespace,
            mouse_hide: config.mouse_hide,
            window: options.window_request(config),
        }
    }

    /// Send every requested value. Failures are logged and do not stop startup.
    pub async fn apply<T: RpcTransport>(&self, dispatcher: &GuiDispatcher<T>) {
        if let Some(font) = &self.font
            && let Err(e) = dispatcher.font(Some(font.as_str()), false).await
        {
            log::warn!("Startup font '{font}' not applied: {e}");
        }
        if let Some(px) = self.linespace
            && let Err(e) = dispatcher.linespace(Some(px)).await
        {
            log::warn!("Startup linespace {px} not applied: {e}");
        }
        if let Some(hide) = self.mouse_hide
            && let Err(e) = dispatcher.mouse_hide(Some(hide)).await
        {
            log::warn!("Startup mouse hide not applied: {e}");
        }
        let window = match self.window {
            Some(WindowRequest::FullScreen) => dispatcher.window_full_screen(Some(true)).await,
            Some(WindowRequest::Maximized) => dispatcher.window_maximized(Some(true)).await,
            None => return,
        };
        if let Err(e) = window {
            log::warn!("Startup window mode not applied: {e}");
        }
    }
}

pub struct App {
    options: RuntimeOptions,
    config: Config,
}

impl App {
    pub fn new(options: RuntimeOptions, config: Config) -> Self {
        Self { options, config }
    }

    /// Run until the connection ends.
    pub async fn run(self) -> Result<DisconnectReason> {
        self.run_with(&SystemHost, &SystemLauncher).await
    }

    /// [`App::run`] with the host environment and launcher supplied.
    pub async fn run_with(
        self,
        host: &impl HostEnvironment,
        launcher: &impl Launcher,
    ) -> Result<DisconnectReason> {
        let launch = self
            .options
            .launch_options(&self.config)
            .context("invalid configuration")?;
        let mut handle = connector::connect(&launch, host, launcher).await?;
        let incoming = handle
            .take_notifications()
            .context("notification channel already taken")?;

        let client = handle.client();
        let dispatcher = Arc::new(GuiDispatcher::new(Arc::clone(&client)));
        let coordinator = ShutdownCoordinator::new(
            Arc::clone(&dispatcher),
            Some(handle),
            Duration::from_millis(self.config.close_timeout_ms),
        );

        if let Err(e) = dispatcher.subscribe().await {
            log::warn!("Subscribing to GUI events failed: {e}");
        }
        StartupState::from_options(&self.options, &self.config)
            .apply(&dispatcher)
            .await;

        Ok(pump(incoming, &client, &dispatcher, &coordinator).await)
    }
}

/// Route inbound messages until the core leaves or the stream ends.
async fn pump(
    mut incoming: mpsc::UnboundedReceiver<IncomingMessage>,
    client: &RpcClient,
    dispatcher: &GuiDispatcher<RpcClient>,
    coordinator: &ShutdownCoordinator<RpcClient>,
) -> DisconnectReason {
    loop {
        tokio::select! {
            msg = incoming.recv() => {
                let Some(msg) = msg else { break };
                if route(msg, client, dispatcher).await {
                    coordinator.core_leaving();
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if !coordinator.request_close().await {
                    log::info!("Second interrupt, disconnecting");
                    break;
                }
            }
        }
    }
    coordinator.disconnect().await
}

/// Handle one inbound message. Returns `true` when the core is leaving.
async fn route(
    msg: IncomingMessage,
    client: &RpcClient,
    dispatcher: &GuiDispatcher<RpcClient>,
) -> bool {
    if msg.is_rpc_call() {
        let method = msg.method.clone().unwrap_or_default();
        if let Some(id) = msg.id {
            log::debug!("Rejecting call to '{method}' from editor");
            if let Err(e) = client
                .respond(id, None, Some(RpcError::method_not_found(&method)))
                .await
            {
                log::warn!("Failed to answer '{method}': {e}");
            }
        }
        return false;
    }

    let Some(notification) = msg.into_notification() else {
        return false;
    };
    match dispatcher.handle_notification(&notification.method, &notification.args) {
        Ok(GuiEvent::Close) => true,
        Ok(_) => false,
        Err(ProtocolError::NotGuiChannel(method)) => {
            log::trace!("Ignoring '{method}' notification");
            false
        }
        Err(e) => {
            log::warn!("Dropping GUI notification: {e}");
            false
        }
    }
}
