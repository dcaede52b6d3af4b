/*!
 * Clipboard support for ClipCat
 *
 * Copies the assembled document through whichever clipboard command the
 * host provides, trying them in order of preference.
 */

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use log::{debug, warn};
use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to execute the command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Something that can receive text
pub trait Clipboard {
    /// Copy text to the clipboard
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}

/// Host family, detected once per process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Windows,
    Wsl,
    Linux,
    Android,
    Unknown,
}

/// Command-line clipboard tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardProvider {
    /// tmux paste buffer
    Tmux,
    /// Wayland
    WlCopy,
    /// X11 via xsel
    Xsel,
    /// X11 via xclip
    Xclip,
    /// macOS
    Pbcopy,
    /// Windows and WSL
    ClipExe,
    /// Termux on Android
    Termux,
}

impl ClipboardProvider {
    fn command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Tmux => ("tmux", &["load-buffer", "-w", "-"]),
            Self::WlCopy => ("wl-copy", &[]),
            Self::Xsel => ("xsel", &["-b", "-i"]),
            Self::Xclip => ("xclip", &["-selection", "clipboard", "-in"]),
            Self::Pbcopy => ("pbcopy", &[]),
            Self::ClipExe => ("clip.exe", &[]),
            Self::Termux => ("termux-clipboard-set", &[]),
        }
    }

    /// Providers usable on this host, most preferred first
    pub fn detect() -> Vec<Self> {
        let mut providers = Vec::with_capacity(3);

        if command_exists("tmux") && env::var_os("TMUX").is_some() {
            providers.push(Self::Tmux);
        }

        let candidates: &[Self] = match platform() {
            Platform::MacOS => &[Self::Pbcopy],
            Platform::Windows | Platform::Wsl => &[Self::ClipExe],
            Platform::Linux => &[Self::WlCopy, Self::Xsel, Self::Xclip],
            Platform::Android => &[Self::Termux],
            Platform::Unknown => &[],
        };
        providers.extend(
            candidates
                .iter()
                .copied()
                .filter(|p| command_exists(p.command().0)),
        );

        providers
    }
}

impl Clipboard for ClipboardProvider {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let (cmd, args) = self.command();
        pipe_to_command(cmd, args, text)
    }
}

/// Copy text with the first provider that succeeds
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let providers = ClipboardProvider::detect();
    if providers.is_empty() {
        return Err(ClipboardError::NoClipboardFound);
    }

    let mut last_error = ClipboardError::NoClipboardFound;
    for provider in providers {
        match provider.copy_to_clipboard(text) {
            Ok(()) => {
                debug!("Copied {} bytes with {:?}", text.len(), provider);
                return Ok(());
            }
            Err(e) => {
                warn!("Clipboard provider {:?} failed: {}", provider, e);
                last_error = e;
            }
        }
    }
    Err(last_error)
}

/// Whether an executable with this name is on `PATH`
pub fn command_exists(command: &str) -> bool {
    let Some(paths) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&paths).any(|dir| is_executable(&dir.join(command)))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

static PLATFORM: OnceLock<Platform> = OnceLock::new();

/// Detect the host platform (cached)
pub fn platform() -> Platform {
    *PLATFORM.get_or_init(|| {
        if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "linux") {
            if env::var_os("WSL_DISTRO_NAME").is_some() {
                Platform::Wsl
            } else {
                Platform::Linux
            }
        } else {
            Platform::Unknown
        }
    })
}

/// Spawn a command and write `text` to its stdin
fn pipe_to_command(cmd: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .map_err(|e| ClipboardError::CommandFailed(format!("Failed to spawn {}: {}", cmd, e)))?;

    {
        let stdin = child.stdin.as_mut().ok_or_else(|| {
            ClipboardError::CommandFailed(format!("Failed to open stdin for {}", cmd))
        })?;
        stdin.write_all(text.as_bytes())?;
    }
    // Close stdin so the tool sees EOF
    drop(child.stdin.take());

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(format!(
            "{} exited with status: {}",
            cmd, status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_command_exists() {
        assert!(command_exists("sh"));
        assert!(!command_exists("nonexistentcommandxyz"));
    }

    #[test]
    fn test_platform_is_cached() {
        assert_eq!(platform(), platform());
    }

    #[test]
    fn test_detected_providers_are_installed() {
        for provider in ClipboardProvider::detect() {
            assert!(command_exists(provider.command().0));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_to_command() {
        assert!(pipe_to_command("cat", &[], "payload").is_ok());
        assert!(matches!(
            pipe_to_command("false", &[], ""),
            Err(ClipboardError::CommandFailed(_))
        ));
        assert!(matches!(
            pipe_to_command("nonexistentcommandxyz", &[], ""),
            Err(ClipboardError::CommandFailed(_))
        ));
    }

    #[test]
    #[ignore] // Requires a running tmux session
    fn test_tmux_clipboard() {
        if env::var_os("TMUX").is_none() {
            return;
        }

        ClipboardProvider::Tmux
            .copy_to_clipboard("clipcat tmux test")
            .expect("Failed to copy to tmux clipboard");

        let output = Command::new("tmux")
            .args(["show-buffer"])
            .output()
            .expect("Failed to execute tmux show-buffer");
        assert_eq!(
            String::from_utf8_lossy(&output.stdout).trim(),
            "clipcat tmux test"
        );
    }
}
