//! Turning startup options into a validated [`ConnectionRequest`].

use std::fmt;

use super::runtime_path::{HostEnvironment, RuntimePathHint};
use crate::error::ConfigurationError;

/// Flags always passed to a spawned editor, after the runtime injection pair.
pub const STARTUP_FLAGS: [&str; 3] = ["--embed", "--cmd", "set termguicolors"];

/// How the bridge reaches the editor core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionMode {
    /// Start the editor as a child process and use its stdin/stdout.
    Spawn,
    /// Use this process's own stdin/stdout.
    Embed,
    /// Connect to an editor already listening on a socket.
    ServerAttach,
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionMode::Spawn => "--spawn",
            ConnectionMode::Embed => "--embed",
            ConnectionMode::ServerAttach => "--server",
        })
    }
}

/// Startup options as given, before any validation.
///
/// Built from the command line and configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Editor executable for the default spawn mode.
    pub nvim_path: String,
    /// `--embed`
    pub embed: bool,
    /// `--server <addr>`
    pub server: Option<String>,
    /// `--spawn <exe> [args..]`: the raw argv, taken verbatim.
    pub spawn: Option<Vec<String>>,
    /// Files to edit.
    pub files: Vec<String>,
    /// Arguments after `--` on the command line.
    pub forwarded: Vec<String>,
    /// Whether `--` appeared at all, even with nothing after it.
    pub forward_marker: bool,
    /// Arguments from the configuration file, placed ahead of `forwarded`.
    pub extra_args: Vec<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            nvim_path: "nvim".to_string(),
            embed: false,
            server: None,
            spawn: None,
            files: Vec::new(),
            forwarded: Vec::new(),
            forward_marker: false,
            extra_args: Vec::new(),
        }
    }
}

impl LaunchOptions {
    /// Modes explicitly requested, in a stable order.
    pub fn requested_modes(&self) -> Vec<ConnectionMode> {
        let mut modes = Vec::new();
        if self.embed {
            modes.push(ConnectionMode::Embed);
        }
        if self.server.is_some() {
            modes.push(ConnectionMode::ServerAttach);
        }
        if self.spawn.is_some() {
            modes.push(ConnectionMode::Spawn);
        }
        modes
    }
}

/// A validated request to connect in exactly one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionRequest {
    Spawn { program: String, args: Vec<String> },
    Embed,
    ServerAttach { address: String },
}

impl ConnectionRequest {
    pub fn mode(&self) -> ConnectionMode {
        match self {
            ConnectionRequest::Spawn { .. } => ConnectionMode::Spawn,
            ConnectionRequest::Embed => ConnectionMode::Embed,
            ConnectionRequest::ServerAttach { .. } => ConnectionMode::ServerAttach,
        }
    }

    /// Validate `options` and build the request.
    ///
    /// Performs no I/O beyond the directory checks `host` answers for
    /// runtime path resolution.
    pub fn from_options(
        options: &LaunchOptions,
        host: &impl HostEnvironment,
    ) -> Result<Self, ConfigurationError> {
        let modes = options.requested_modes();
        if modes.len() > 1 {
            return Err(ConfigurationError::AmbiguousConnectionMode(modes));
        }

        if options.embed {
            reject_positional(options, ConnectionMode::Embed)?;
            return Ok(ConnectionRequest::Embed);
        }

        if let Some(address) = &options.server {
            reject_positional(options, ConnectionMode::ServerAttach)?;
            return Ok(ConnectionRequest::ServerAttach {
                address: address.clone(),
            });
        }

        if let Some(argv) = &options.spawn {
            reject_positional(options, ConnectionMode::Spawn)?;
            let Some((program, args)) = argv.split_first() else {
                return Err(ConfigurationError::InvalidArguments(
                    "--spawn requires at least one positional argument".to_string(),
                ));
            };
            return Ok(ConnectionRequest::Spawn {
                program: program.clone(),
                args: args.to_vec(),
            });
        }

        let hint = RuntimePathHint::from_host(host);
        let injection = hint.resolve(host).map(|c| c.injection_args());
        let trailing: Vec<String> = options
            .extra_args
            .iter()
            .chain(&options.forwarded)
            .cloned()
            .collect();

        Ok(ConnectionRequest::Spawn {
            program: options.nvim_path.clone(),
            args: spawn_arguments(injection.as_ref(), &trailing, &options.files),
        })
    }
}

/// Argument list for the default spawn mode.
///
/// Order: runtime injection pair (when a runtime directory was found), the
/// fixed startup flags, trailing arguments, then files.
pub fn spawn_arguments(
    injection: Option<&[String; 2]>,
    trailing: &[String],
    files: &[String],
) -> Vec<String> {
    let mut args = Vec::with_capacity(2 + STARTUP_FLAGS.len() + trailing.len() + files.len());
    if let Some(pair) = injection {
        args.extend(pair.iter().cloned());
    }
    args.extend(STARTUP_FLAGS.iter().map(|s| s.to_string()));
    args.extend(trailing.iter().cloned());
    args.extend(files.iter().cloned());
    args
}

fn reject_positional(
    options: &LaunchOptions,
    mode: ConnectionMode,
) -> Result<(), ConfigurationError> {
    if !options.files.is_empty() || !options.forwarded.is_empty() || options.forward_marker {
        return Err(ConfigurationError::InvalidArguments(format!(
            "{mode} does not accept positional arguments"
        )));
    }
    Ok(())
}
