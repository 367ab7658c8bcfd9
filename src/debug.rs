//! Log output for par-nvim.
//!
//! All `log::info!()` etc. calls go through [`LogBridge`]. Records are
//! written to the file named by `PAR_NVIM_LOG` when set, otherwise to
//! stderr. With a log file, setting `RUST_LOG` mirrors records to stderr as
//! well. Nothing is ever written to stdout, which carries RPC traffic in
//! embedded mode.
//!
//! Level precedence: `--log-level`, then `RUST_LOG`, then the config file's
//! `log_level` (applied later via [`apply_config_level`]), then `Info` when a
//! log file was requested, else `Off`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};
use par_nvim_config::LogLevel;
use parking_lot::Mutex;

/// Environment variable naming the log file.
pub const LOG_FILE_ENV: &str = "PAR_NVIM_LOG";

/// Set when the level came from the CLI or `RUST_LOG` and must not be
/// overridden by the config file.
static LEVEL_PINNED: AtomicBool = AtomicBool::new(false);

static LOGGER: OnceLock<LogBridge> = OnceLock::new();

/// `log::Log` implementation writing timestamped lines.
struct LogBridge {
    file: Option<Mutex<File>>,
    stderr: bool,
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        if let Some(file) = &self.file {
            let mut file = file.lock();
            let _ = file.write_all(line.as_bytes());
            let _ = file.flush();
        }
        if self.stderr {
            let _ = std::io::stderr().write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            let _ = file.lock().flush();
        }
    }
}

/// Startup level, and whether it is pinned against the config file.
pub fn resolve_level(
    cli: Option<LogLevel>,
    rust_log: Option<&str>,
    has_log_file: bool,
) -> (LevelFilter, bool) {
    if let Some(level) = cli {
        return (level.to_level_filter(), true);
    }
    if let Some(level) = rust_log.and_then(LogLevel::from_name) {
        return (level.to_level_filter(), true);
    }
    let fallback = if has_log_file {
        LevelFilter::Info
    } else {
        LevelFilter::Off
    };
    (fallback, false)
}

/// Install the logger. Calling it again has no effect.
pub fn init_log_bridge(cli_level: Option<LogLevel>) {
    let log_path = std::env::var_os(LOG_FILE_ENV)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);
    let rust_log = std::env::var("RUST_LOG").ok();

    let file = log_path.as_ref().and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(Mutex::new)
            .ok()
    });
    let stderr = file.is_none() || rust_log.is_some();

    let (level, pinned) = resolve_level(cli_level, rust_log.as_deref(), file.is_some());

    let logger = LOGGER.get_or_init(|| LogBridge { file, stderr });
    if log::set_logger(logger).is_ok() {
        LEVEL_PINNED.store(pinned, Ordering::Relaxed);
        log::set_max_level(level);
    }
}

/// Apply the config file's level unless the CLI or `RUST_LOG` chose one.
pub fn apply_config_level(level: LogLevel) {
    if LEVEL_PINNED.load(Ordering::Relaxed) || level == LogLevel::Off {
        return;
    }
    log::set_max_level(level.to_level_filter());
}

fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}
