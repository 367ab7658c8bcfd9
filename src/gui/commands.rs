//! The user-facing command surface.
//!
//! Query forms (no argument) read the current state. Set forms validate,
//! send, and return without touching the state; it changes when the core
//! echoes the event.

use std::path::Path;

use par_nvim_fonts::FontSpec;
use par_nvim_rpc::RpcTransport;

use super::dispatcher::GuiDispatcher;
use super::error::{CommandError, ValidationError};
use super::escape::escape_paths;
use super::event::GuiEvent;

/// Result of a command that may query or set.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome<V> {
    /// No argument was given; this is the current value.
    Current(V),
    /// The change was sent to the core.
    Requested,
}

impl<T: RpcTransport> GuiDispatcher<T> {
    /// Query or request the font. `force` keeps text that does not follow
    /// the font grammar.
    pub async fn font(
        &self,
        spec: Option<&str>,
        force: bool,
    ) -> Result<CommandOutcome<Option<FontSpec>>, CommandError> {
        let Some(text) = spec else {
            return Ok(CommandOutcome::Current(self.state().font.clone()));
        };
        let font = if force {
            FontSpec::parse_forced(text)
        } else {
            FontSpec::parse(text).map_err(ValidationError::from)?
        };
        self.send(&GuiEvent::Font(font)).await?;
        Ok(CommandOutcome::Requested)
    }

    /// Query or request extra pixels between lines.
    pub async fn linespace(
        &self,
        pixels: Option<i64>,
    ) -> Result<CommandOutcome<i64>, CommandError> {
        match pixels {
            None => Ok(CommandOutcome::Current(self.state().linespace)),
            Some(px) => {
                self.send(&GuiEvent::Linespace(px)).await?;
                Ok(CommandOutcome::Requested)
            }
        }
    }

    pub async fn window_maximized(
        &self,
        enable: Option<bool>,
    ) -> Result<CommandOutcome<bool>, CommandError> {
        match enable {
            None => Ok(CommandOutcome::Current(self.state().window_maximized)),
            Some(on) => {
                self.send(&GuiEvent::WindowMaximized(on)).await?;
                Ok(CommandOutcome::Requested)
            }
        }
    }

    pub async fn window_full_screen(
        &self,
        enable: Option<bool>,
    ) -> Result<CommandOutcome<bool>, CommandError> {
        match enable {
            None => Ok(CommandOutcome::Current(self.state().window_full_screen)),
            Some(on) => {
                self.send(&GuiEvent::WindowFullScreen(on)).await?;
                Ok(CommandOutcome::Requested)
            }
        }
    }

    pub async fn mouse_hide(
        &self,
        enable: Option<bool>,
    ) -> Result<CommandOutcome<bool>, CommandError> {
        match enable {
            None => Ok(CommandOutcome::Current(self.state().mouse_hide)),
            Some(on) => {
                self.send(&GuiEvent::Mousehide(on)).await?;
                Ok(CommandOutcome::Requested)
            }
        }
    }

    pub async fn foreground(&self) -> Result<(), CommandError> {
        self.send(&GuiEvent::Foreground).await?;
        Ok(())
    }

    /// Ask the core to open `paths`, escaped for its command parser.
    pub async fn drop_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<(), CommandError> {
        if paths.is_empty() {
            return Err(ValidationError::EmptyFileList.into());
        }
        self.send(&GuiEvent::DropFiles(escape_paths(paths))).await?;
        Ok(())
    }
}
