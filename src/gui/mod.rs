//! The GUI event protocol.
//!
//! All GUI traffic uses one RPC method, [`GUI_CHANNEL`], with the event name
//! as the first argument. [`GuiDispatcher`] turns commands into outbound
//! notifications and applies inbound ones to [`GuiState`].

mod commands;
mod dispatcher;
mod error;
pub mod escape;
mod event;
mod state;

pub use commands::CommandOutcome;
pub use dispatcher::{GuiDispatcher, StateReader, Subscription};
pub use error::{CommandError, ProtocolError, ValidationError};
pub use event::{GUI_CHANNEL, GuiEvent};
pub use state::GuiState;
