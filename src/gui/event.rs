//! The GUI event vocabulary and its wire encoding.
//!
//! Every event travels as a notification on the single [`GUI_CHANNEL`]
//! method with the event name as the first positional argument.

use par_nvim_fonts::FontSpec;
use serde_json::Value;

use super::error::ProtocolError;

/// RPC method name carrying all GUI protocol traffic.
pub const GUI_CHANNEL: &str = "Gui";

/// A GUI protocol event.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiEvent {
    /// Raise and focus the window.
    Foreground,
    WindowMaximized(bool),
    WindowFullScreen(bool),
    Font(FontSpec),
    /// Extra per-line pixel spacing; may be negative.
    Linespace(i64),
    Mousehide(bool),
    /// Paths to open, already escaped for the core's command parser.
    DropFiles(Vec<String>),
    /// Outbound: ask the core to close. Inbound: the core is leaving.
    Close,
    /// Discriminator this side does not know. Carried for logging only.
    Unknown(String),
}

impl GuiEvent {
    /// The discriminator sent as `args[0]`.
    pub fn name(&self) -> &str {
        match self {
            GuiEvent::Foreground => "Foreground",
            GuiEvent::WindowMaximized(_) => "WindowMaximized",
            GuiEvent::WindowFullScreen(_) => "WindowFullScreen",
            GuiEvent::Font(_) => "Font",
            GuiEvent::Linespace(_) => "Linespace",
            GuiEvent::Mousehide(_) => "Mousehide",
            GuiEvent::DropFiles(_) => "DropFiles",
            GuiEvent::Close => "Close",
            GuiEvent::Unknown(name) => name,
        }
    }

    /// Positional notification arguments: the name followed by the payload.
    pub fn to_args(&self) -> Vec<Value> {
        let mut args = vec![Value::from(self.name())];
        match self {
            GuiEvent::WindowMaximized(on)
            | GuiEvent::WindowFullScreen(on)
            | GuiEvent::Mousehide(on) => args.push(Value::Bool(*on)),
            GuiEvent::Font(font) => args.push(Value::String(font.to_string())),
            GuiEvent::Linespace(px) => args.push(Value::from(*px)),
            GuiEvent::DropFiles(paths) => args.extend(paths.iter().cloned().map(Value::String)),
            GuiEvent::Foreground | GuiEvent::Close | GuiEvent::Unknown(_) => {}
        }
        args
    }

    /// Decode the arguments of a GUI channel notification.
    ///
    /// Unrecognized event names decode to [`GuiEvent::Unknown`]; only a
    /// missing name or a wrongly typed payload is an error. Font text the
    /// core reports is kept even when it does not follow the font grammar.
    pub fn from_args(args: &[Value]) -> Result<Self, ProtocolError> {
        let Some((first, rest)) = args.split_first() else {
            return Err(ProtocolError::MissingDiscriminator);
        };
        let Some(name) = first.as_str() else {
            return Err(ProtocolError::MissingDiscriminator);
        };

        let event = match name {
            "Foreground" => GuiEvent::Foreground,
            "Close" => GuiEvent::Close,
            "WindowMaximized" => GuiEvent::WindowMaximized(bool_arg("WindowMaximized", rest)?),
            "WindowFullScreen" => GuiEvent::WindowFullScreen(bool_arg("WindowFullScreen", rest)?),
            "Mousehide" => GuiEvent::Mousehide(bool_arg("Mousehide", rest)?),
            "Font" => {
                let text = rest.first().and_then(Value::as_str).ok_or(
                    ProtocolError::InvalidArgument {
                        event: "Font",
                        expected: "a font string",
                    },
                )?;
                GuiEvent::Font(FontSpec::parse_forced(text))
            }
            "Linespace" => {
                let px = rest.first().and_then(integer_value).ok_or(
                    ProtocolError::InvalidArgument {
                        event: "Linespace",
                        expected: "an integer",
                    },
                )?;
                GuiEvent::Linespace(px)
            }
            "DropFiles" => {
                let paths = rest
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or(ProtocolError::InvalidArgument {
                        event: "DropFiles",
                        expected: "a list of path strings",
                    })?;
                GuiEvent::DropFiles(paths)
            }
            other => GuiEvent::Unknown(other.to_string()),
        };
        Ok(event)
    }
}

fn bool_arg(event: &'static str, rest: &[Value]) -> Result<bool, ProtocolError> {
    let invalid = ProtocolError::InvalidArgument {
        event,
        expected: "a boolean",
    };
    match rest.first() {
        Some(Value::Bool(b)) => Ok(*b),
        // The core may report flags as 0/1
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(invalid),
        },
        _ => Err(invalid),
    }
}

fn integer_value(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && f.abs() <= i64::MAX as f64).then_some(f as i64)
}
