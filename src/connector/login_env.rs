//! Login shell environment for editors started from the macOS desktop.
//!
//! Apps launched from Finder or the Dock inherit launchd's minimal
//! environment, so a spawned editor would miss the user's `PATH` and
//! friends. Before spawning we ask the login shell for its environment and
//! pass it to the child.

#![cfg_attr(not(target_os = "macos"), allow(dead_code))]

use std::process::{Command, Stdio};

/// Shell tried when `$SHELL` is unset or fails to run.
pub const FALLBACK_SHELL: &str = "/bin/bash";

/// Variables exported by the user's login shell.
///
/// Tries `$SHELL`, then [`FALLBACK_SHELL`]. Empty when neither runs.
pub fn login_environment() -> Vec<(String, String)> {
    let shell = std::env::var("SHELL").unwrap_or_default();
    if !shell.is_empty()
        && let Some(vars) = capture(&shell)
    {
        return vars;
    }
    capture(FALLBACK_SHELL).unwrap_or_default()
}

/// Run `shell -l -c env` and parse what it prints.
///
/// `None` when the shell could not be started. A shell that runs but exits
/// non-zero still yields whatever it printed.
pub fn capture(shell: &str) -> Option<Vec<(String, String)>> {
    let output = Command::new(shell)
        .args(["-l", "-c", "env"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();
    match output {
        Ok(output) => {
            let vars = parse_env_output(&String::from_utf8_lossy(&output.stdout));
            log::debug!("Imported {} variables from {shell} login environment", vars.len());
            Some(vars)
        }
        Err(e) => {
            log::warn!("Failed to run {shell} for the login environment: {e}");
            None
        }
    }
}

/// `NAME=value` lines from `env`. Lines without a name before the first
/// `=` are skipped.
pub fn parse_env_output(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .filter_map(|line| {
            let (name, value) = line.split_once('=')?;
            (!name.is_empty()).then(|| (name.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_output_keeps_named_pairs() {
        let vars = parse_env_output(
            "PATH=/usr/local/bin:/usr/bin\nEMPTY=\n=nameless\nnot a pair\nOPTS=a=b\n",
        );
        assert_eq!(
            vars,
            vec![
                ("PATH".to_string(), "/usr/local/bin:/usr/bin".to_string()),
                ("EMPTY".to_string(), String::new()),
                ("OPTS".to_string(), "a=b".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_shell_yields_nothing() {
        assert_eq!(capture("/nonexistent/par-nvim-test-shell"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_reads_a_real_login_shell() {
        let vars = capture("/bin/sh").unwrap();
        assert!(vars.iter().any(|(name, _)| name == "PATH"));
    }
}
