//! Command-line interface for par-nvim.
//!
//! `--spawn` is handled before clap sees the arguments: everything after it
//! is the editor's argv, taken verbatim, including anything that looks like
//! one of our own flags.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use par_nvim_config::{Config, ConfigError, LogLevel};

use crate::connector::LaunchOptions;

/// par-nvim - GUI bridge for Neovim
#[derive(Parser, Debug)]
#[command(name = "par-nvim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// nvim executable path
    #[arg(long, value_name = "NVIM_PATH")]
    pub nvim: Option<String>,

    /// Maximize the window on startup
    #[arg(long)]
    pub maximized: bool,

    /// Fullscreen the window on startup (overrides --maximized)
    #[arg(long)]
    pub fullscreen: bool,

    /// Communicate with Neovim over stdin/stdout
    #[arg(long)]
    pub embed: bool,

    /// Connect to an existing Neovim instance (host:port or socket path)
    #[arg(long, value_name = "ADDRESS")]
    pub server: Option<String>,

    /// Call nvim using the given positional arguments: --spawn <EXE> [ARGS]...
    #[arg(long)]
    pub spawn: bool,

    /// Configuration file (default: ~/.config/par-nvim/config.yaml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Set debug log level (overrides config and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,

    /// Edit specified file(s)
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// Additional arguments forwarded to Neovim
    #[arg(last = true, value_name = "NVIM_ARGS")]
    pub forwarded: Vec<String>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Off => LogLevel::Off,
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

/// Window mode requested at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRequest {
    Maximized,
    FullScreen,
}

/// Runtime options passed from CLI to the application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub nvim: Option<String>,
    pub embed: bool,
    pub server: Option<String>,
    /// Editor argv following `--spawn`.
    pub spawn: Option<Vec<String>>,
    pub files: Vec<String>,
    pub forwarded: Vec<String>,
    /// `--` was given, possibly with nothing after it.
    pub forward_marker: bool,
    pub maximized: bool,
    pub fullscreen: bool,
    pub config_path: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
}

impl RuntimeOptions {
    /// Merge with the config file into connection options.
    ///
    /// CLI values win; config `extra_args` go ahead of the CLI's `--` arguments.
    pub fn launch_options(&self, config: &Config) -> Result<LaunchOptions, ConfigError> {
        Ok(LaunchOptions {
            nvim_path: self.nvim.clone().unwrap_or_else(|| config.nvim_path.clone()),
            embed: self.embed,
            server: self.server.clone(),
            spawn: self.spawn.clone(),
            files: self.files.clone(),
            forwarded: self.forwarded.clone(),
            forward_marker: self.forward_marker,
            extra_args: config.extra_args_list()?,
        })
    }

    /// Window mode from flags or config. Fullscreen wins over maximized.
    pub fn window_request(&self, config: &Config) -> Option<WindowRequest> {
        if self.fullscreen || config.fullscreen {
            Some(WindowRequest::FullScreen)
        } else if self.maximized || config.maximized {
            Some(WindowRequest::Maximized)
        } else {
            None
        }
    }
}

/// Process CLI arguments from the environment
pub fn process_cli() -> RuntimeOptions {
    parse_args(std::env::args_os())
}

/// Parse an argv (program name first). Exits on `--help`, `--version` or a
/// usage error, as clap does.
pub fn parse_args<I>(args: I) -> RuntimeOptions
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    match try_parse_args(args) {
        Ok(options) => options,
        Err(e) => e.exit(),
    }
}

pub fn try_parse_args<I>(args: I) -> Result<RuntimeOptions, clap::Error>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let (head, spawn) = split_spawn(args.into_iter().map(Into::into).collect());
    let forward_marker = head.iter().skip(1).any(|a| a == "--");
    let cli = Cli::try_parse_from(head)?;

    Ok(RuntimeOptions {
        nvim: cli.nvim,
        embed: cli.embed,
        server: cli.server,
        spawn: if cli.spawn { spawn } else { None },
        files: cli.files,
        forwarded: cli.forwarded,
        forward_marker,
        maximized: cli.maximized,
        fullscreen: cli.fullscreen,
        config_path: cli.config,
        log_level: cli.log_level.map(LogLevel::from),
    })
}

/// Split at the first `--spawn` that precedes any `--`.
///
/// Returns the arguments for clap (still containing the `--spawn` flag) and
/// the editor argv after it.
fn split_spawn(args: Vec<OsString>) -> (Vec<OsString>, Option<Vec<String>>) {
    let position = args
        .iter()
        .skip(1)
        .take_while(|a| a.as_os_str() != "--")
        .position(|a| a == "--spawn")
        .map(|i| i + 1);

    let Some(index) = position else {
        return (args, None);
    };
    let mut head = args;
    let tail = head.split_off(index + 1);
    let argv = tail
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    (head, Some(argv))
}
