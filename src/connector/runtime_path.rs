//! Locating the GUI runtime directory handed to a spawned editor.
//!
//! Candidates are checked in priority order: the `PAR_NVIM_RUNTIME_PATH`
//! environment variable, the same variable captured at build time, then a
//! directory relative to the running binary. The first existing directory
//! wins and is injected as `--cmd "set rtp+=<dir>"`.

use std::path::{Path, PathBuf};

/// Environment variable overriding the runtime directory.
pub const RUNTIME_PATH_ENV: &str = "PAR_NVIM_RUNTIME_PATH";

/// Runtime directory baked in at build time, if any.
pub const COMPILED_RUNTIME_PATH: Option<&str> = option_env!("PAR_NVIM_RUNTIME_PATH");

/// Host queries needed to resolve the runtime path.
///
/// Abstracted so resolution can be tested without touching the real
/// environment or filesystem.
pub trait HostEnvironment {
    /// Value of an environment variable, `None` if unset or not unicode.
    fn var(&self, name: &str) -> Option<String>;

    /// Whether `path` is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Directory containing the running executable.
    fn exe_dir(&self) -> Option<PathBuf>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostEnvironment for SystemHost {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exe_dir(&self) -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
    }
}

/// Where a runtime candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimePathSource {
    Environment,
    CompiledDefault,
    BinaryRelative,
}

/// One candidate runtime directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeCandidate {
    pub source: RuntimePathSource,
    pub dir: PathBuf,
}

impl RuntimeCandidate {
    /// The `--cmd "set rtp+=<dir>"` pair that adds this directory to the
    /// editor's runtime path.
    pub fn injection_args(&self) -> [String; 2] {
        [
            "--cmd".to_string(),
            format!("set rtp+={}", self.dir.display()),
        ]
    }
}

/// Ordered list of runtime directory candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimePathHint {
    candidates: Vec<RuntimeCandidate>,
}

impl RuntimePathHint {
    /// Collect candidates from `host`, using the build-time default.
    pub fn from_host(host: &impl HostEnvironment) -> Self {
        Self::with_compiled_default(host, COMPILED_RUNTIME_PATH)
    }

    /// Collect candidates from `host` with an explicit build-time default.
    pub fn with_compiled_default(
        host: &impl HostEnvironment,
        compiled_default: Option<&str>,
    ) -> Self {
        let mut candidates = Vec::with_capacity(3);

        if let Some(dir) = host.var(RUNTIME_PATH_ENV).filter(|v| !v.is_empty()) {
            candidates.push(RuntimeCandidate {
                source: RuntimePathSource::Environment,
                dir: PathBuf::from(dir),
            });
        }
        if let Some(dir) = compiled_default.filter(|v| !v.is_empty()) {
            candidates.push(RuntimeCandidate {
                source: RuntimePathSource::CompiledDefault,
                dir: PathBuf::from(dir),
            });
        }
        if let Some(dir) = host.exe_dir().and_then(|bin| binary_relative_runtime(&bin)) {
            candidates.push(RuntimeCandidate {
                source: RuntimePathSource::BinaryRelative,
                dir,
            });
        }

        Self { candidates }
    }

    pub fn candidates(&self) -> &[RuntimeCandidate] {
        &self.candidates
    }

    /// First candidate that exists as a directory on `host`.
    pub fn resolve(&self, host: &impl HostEnvironment) -> Option<&RuntimeCandidate> {
        let found = self.candidates.iter().find(|c| host.is_dir(&c.dir));
        match found {
            Some(c) => log::debug!("Using GUI runtime at {:?} ({:?})", c.dir, c.source),
            None => log::debug!("No GUI runtime directory found among {:?}", self.candidates),
        }
        found
    }
}

/// Runtime directory installed next to the binary's parent directory.
fn binary_relative_runtime(bin_dir: &Path) -> Option<PathBuf> {
    let prefix = bin_dir.parent()?;
    #[cfg(target_os = "macos")]
    {
        Some(prefix.join("Resources").join("runtime"))
    }
    #[cfg(not(target_os = "macos"))]
    {
        Some(prefix.join("share").join("par-nvim").join("runtime"))
    }
}
