//! Opening the raw byte streams to the editor core.
//!
//! [`Launcher`] is the seam between connection policy (which mode, which
//! arguments) and the operating system. [`SystemLauncher`] starts real
//! processes and opens real sockets.

use std::future::Future;
use std::io::IsTerminal;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::process::{Child, ChildStderr, Command};

use super::address::ServerAddress;
use crate::error::ConnectionError;

/// Byte streams to the core plus the child process, when we own one.
pub struct CoreStreams {
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
    pub writer: Box<dyn AsyncWrite + Send + Unpin>,
    pub child: Option<Child>,
}

impl CoreStreams {
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
            child: None,
        }
    }

    pub fn with_child(mut self, child: Child) -> Self {
        self.child = Some(child);
        self
    }
}

/// Opens transports for each connection mode.
pub trait Launcher {
    /// Start `program` with `args` and talk to it over its stdin/stdout.
    fn spawn(&self, program: &str, args: &[String]) -> Result<CoreStreams, ConnectionError>;

    /// Use this process's own stdin/stdout.
    fn embed(&self) -> Result<CoreStreams, ConnectionError>;

    /// Connect to an already running core.
    fn attach(
        &self,
        address: &ServerAddress,
    ) -> impl Future<Output = Result<CoreStreams, ConnectionError>> + Send;
}

/// Launcher backed by real processes, stdio and sockets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn spawn(&self, program: &str, args: &[String]) -> Result<CoreStreams, ConnectionError> {
        log::info!("Spawning editor: {program} {args:?}");
        let mut command = Command::new(program);
        #[cfg(target_os = "macos")]
        command.envs(super::login_env::login_environment());
        let mut child = command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ConnectionError::SpawnFailure {
                program: program.to_string(),
                source,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(ConnectionError::SpawnFailure {
                program: program.to_string(),
                source: std::io::Error::other("child stdio was not captured"),
            });
        };

        if let Some(stderr) = child.stderr.take() {
            drain_stderr(program.to_string(), stderr);
        }

        Ok(CoreStreams::new(stdout, stdin).with_child(child))
    }

    fn embed(&self) -> Result<CoreStreams, ConnectionError> {
        if std::io::stdin().is_terminal() {
            return Err(ConnectionError::TransportUnavailable(
                "stdin is a terminal".to_string(),
            ));
        }
        if std::io::stdout().is_terminal() {
            return Err(ConnectionError::TransportUnavailable(
                "stdout is a terminal".to_string(),
            ));
        }
        log::info!("Using stdin/stdout as the editor transport");
        Ok(CoreStreams::new(tokio::io::stdin(), tokio::io::stdout()))
    }

    async fn attach(&self, address: &ServerAddress) -> Result<CoreStreams, ConnectionError> {
        log::info!("Connecting to editor at {address}");
        let failure = |e: std::io::Error| ConnectionError::ConnectFailure {
            address: address.to_string(),
            reason: e.to_string(),
        };

        match address {
            ServerAddress::Tcp { host, port } => {
                let stream = tokio::net::TcpStream::connect((host.as_str(), *port))
                    .await
                    .map_err(failure)?;
                if let Err(e) = stream.set_nodelay(true) {
                    log::warn!("Failed to set TCP_NODELAY on {address}: {e}");
                }
                let (reader, writer) = stream.into_split();
                Ok(CoreStreams::new(reader, writer))
            }
            #[cfg(unix)]
            ServerAddress::Local(path) => {
                let stream = tokio::net::UnixStream::connect(path)
                    .await
                    .map_err(failure)?;
                let (reader, writer) = stream.into_split();
                Ok(CoreStreams::new(reader, writer))
            }
            #[cfg(windows)]
            ServerAddress::Local(path) => {
                let pipe = tokio::net::windows::named_pipe::ClientOptions::new()
                    .open(path)
                    .map_err(failure)?;
                let (reader, writer) = tokio::io::split(pipe);
                Ok(CoreStreams::new(reader, writer))
            }
        }
    }
}

/// Forward the editor's stderr into the log until it closes.
fn drain_stderr(program: String, stderr: ChildStderr) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stderr);
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        log::warn!("{program} stderr: {trimmed}");
                    }
                }
                Err(_) => break,
            }
        }
    });
}
