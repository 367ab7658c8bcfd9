//! Shutdown coordinator tests.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeTransport, RecordingLauncher};
use par_nvim::connector::{self, ConnectionRequest};
use par_nvim::gui::{GUI_CHANNEL, GuiDispatcher};
use par_nvim::shutdown::{DisconnectReason, ShutdownCoordinator, ShutdownState};
use serde_json::json;

fn coordinator() -> (Arc<FakeTransport>, ShutdownCoordinator<FakeTransport>) {
    let transport = Arc::new(FakeTransport::new());
    let dispatcher = Arc::new(GuiDispatcher::new(Arc::clone(&transport)));
    let coordinator = ShutdownCoordinator::new(dispatcher, None, Duration::from_millis(50));
    (transport, coordinator)
}

fn close_count(transport: &FakeTransport) -> usize {
    transport
        .notifications()
        .iter()
        .filter(|(method, args)| method == GUI_CHANNEL && args == &vec![json!("Close")])
        .count()
}

#[tokio::test]
async fn test_double_close_sends_one_notification() {
    let (transport, coordinator) = coordinator();
    assert_eq!(coordinator.state(), ShutdownState::Connected);

    assert!(coordinator.request_close().await);
    assert_eq!(coordinator.state(), ShutdownState::CloseSent);
    assert!(!coordinator.request_close().await);

    assert_eq!(close_count(&transport), 1);
    assert_eq!(transport.notifications().len(), 1);
}

#[tokio::test]
async fn test_close_request_never_fails() {
    let (transport, coordinator) = coordinator();
    transport.fail_sends();

    assert!(coordinator.request_close().await);
    assert_eq!(coordinator.state(), ShutdownState::CloseSent);
}

#[tokio::test]
async fn test_core_leaving_sends_nothing() {
    let (transport, coordinator) = coordinator();

    coordinator.core_leaving();
    assert_eq!(coordinator.state(), ShutdownState::CoreLeaving);
    // A local request after the core announced leaving is a no-op.
    assert!(!coordinator.request_close().await);

    assert_eq!(coordinator.disconnect().await, DisconnectReason::CoreLeft);
    assert_eq!(
        coordinator.state(),
        ShutdownState::Disconnected(DisconnectReason::CoreLeft)
    );
    assert!(transport.notifications().is_empty());
}

#[tokio::test]
async fn test_local_close_then_disconnect() {
    let (_, coordinator) = coordinator();
    coordinator.request_close().await;
    assert_eq!(coordinator.disconnect().await, DisconnectReason::LocalClose);
    assert!(coordinator.is_disconnected());
}

#[tokio::test]
async fn test_end_of_stream_without_close_is_unexpected() {
    let (_, coordinator) = coordinator();
    let reason = coordinator.disconnect().await;
    assert_eq!(reason, DisconnectReason::CoreExitedUnexpectedly);
    assert_eq!(reason.exit_code(), 1);
    assert_eq!(DisconnectReason::CoreLeft.exit_code(), 0);
    assert_eq!(DisconnectReason::LocalClose.exit_code(), 0);
}

#[tokio::test]
async fn test_disconnect_is_terminal() {
    let (transport, coordinator) = coordinator();
    coordinator.core_leaving();
    assert_eq!(coordinator.disconnect().await, DisconnectReason::CoreLeft);

    coordinator.core_leaving();
    assert!(!coordinator.request_close().await);
    assert_eq!(coordinator.disconnect().await, DisconnectReason::CoreLeft);
    assert!(transport.notifications().is_empty());
}

#[tokio::test]
async fn test_disconnect_releases_the_connection() {
    let launcher = RecordingLauncher::new();
    let handle = connector::establish(ConnectionRequest::Embed, &launcher)
        .await
        .unwrap();
    let mut peer = launcher.take_peer().unwrap();
    let client = handle.client();
    let dispatcher = Arc::new(GuiDispatcher::new(Arc::clone(&client)));
    let coordinator =
        ShutdownCoordinator::new(dispatcher, Some(handle), Duration::from_millis(50));

    coordinator.request_close().await;
    coordinator.request_close().await;
    coordinator.disconnect().await;

    let messages = peer.read_until_closed().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["method"], "Gui");
    assert_eq!(messages[0]["params"], json!(["Close"]));
    assert!(client.is_closed().await);
}
