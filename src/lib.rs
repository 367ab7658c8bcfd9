// Library exports for testing and potential library use
//
// # Mutex Usage Policy
//
//   - `tokio::sync::Mutex`: state held across `.await` (the RPC writer, the
//     connection handle during teardown).
//
//   - `parking_lot::Mutex`: short sync-only critical sections (shutdown state,
//     the log file). Never held across `.await`.
//
// GUI state is published through `arc_swap::ArcSwap` so readers never lock.

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod app;
pub mod cli;
pub mod connector;
pub mod debug;
pub mod error;
pub mod gui;
pub mod shutdown;

pub use connector::{ConnectionHandle, ConnectionMode, ConnectionRequest, LaunchOptions};
pub use error::{BridgeError, ConfigurationError, ConnectionError};
pub use gui::{GuiDispatcher, GuiEvent, GuiState};
pub use shutdown::{DisconnectReason, ShutdownCoordinator, ShutdownState};
