use par_nvim_fonts::FontParseError;
use par_nvim_rpc::TransportError;
use thiserror::Error;

/// A malformed inbound GUI notification. Logged and dropped by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("notification '{0}' is not on the GUI channel")]
    NotGuiChannel(String),

    #[error("GUI notification without an event name")]
    MissingDiscriminator,

    #[error("GUI event '{event}' expects {expected}")]
    InvalidArgument {
        event: &'static str,
        expected: &'static str,
    },
}

/// A command argument rejected before anything was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid font: {0}")]
    Font(#[from] FontParseError),

    #[error("no files to drop")]
    EmptyFileList,
}

/// Failure of a GUI command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to send GUI event: {0}")]
    Transport(#[from] TransportError),
}
