//! Clipboard integration utilities.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};

/// Destination for exported documents that should land on a clipboard.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard with fallbacks for headless environments.
pub struct Clipboard {
    primary: Option<arboard::Clipboard>,
}

impl Clipboard {
    /// Attempt to open the system clipboard. When unavailable, copies go through shell utilities.
    pub fn new() -> Self {
        let primary = arboard::Clipboard::new().ok();
        if primary.is_none() {
            tracing::debug!("system clipboard unavailable; shell fallbacks will be used");
        }
        Self { primary }
    }
}

impl ClipboardSink for Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if let Some(primary) = self.primary.as_mut()
            && primary.set_text(text.to_owned()).is_ok()
        {
            return Ok(());
        }

        self.primary = None;
        fallback_copy(text)
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

fn fallback_copy(text: &str) -> Result<()> {
    for command in fallback_commands() {
        match try_command_copy(command, text) {
            Ok(()) => return Ok(()),
            Err(err) => tracing::debug!(error = %err, "clipboard fallback failed"),
        }
    }

    Err(anyhow!("no clipboard backend accepted the text"))
}

fn try_command_copy(command: &[&str], text: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("clipboard command missing program")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to spawn clipboard command: {program}"))?;

    // stdin is dropped before waiting so the child sees end of input.
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };

    let status = child
        .wait()
        .with_context(|| format!("clipboard command did not exit cleanly: {program}"))?;
    written.context("failed to write clipboard contents")?;
    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("{program} exited with status {status}"))
    }
}

#[cfg(target_os = "macos")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["pbcopy"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["wl-copy"], &["xclip", "-selection", "clipboard"], &["xsel", "-b", "-i"]]
}

#[cfg(target_os = "windows")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["clip.exe"]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    Vec::new()
}

/// In-memory clipboard for tests and embedders without a display.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
    pub fail: bool,
}

impl MemoryClipboard {
    /// A clipboard that rejects every write.
    pub fn unavailable() -> Self {
        Self {
            contents: None,
            fail: true,
        }
    }
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.fail {
            return Err(anyhow!("clipboard unavailable"));
        }
        self.contents = Some(text.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clipboard_records_text() -> Result<()> {
        let mut clipboard = MemoryClipboard::default();
        clipboard.set_text("hello")?;
        assert_eq!(clipboard.contents.as_deref(), Some("hello"));
        Ok(())
    }

    #[test]
    fn unavailable_clipboard_rejects_writes() {
        let mut clipboard = MemoryClipboard::unavailable();
        assert!(clipboard.set_text("hello").is_err());
        assert!(clipboard.contents.is_none());
    }

    #[test]
    fn missing_fallback_program_is_an_error() {
        assert!(try_command_copy(&["capsule-no-such-clipboard-tool"], "x").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn fallback_reports_exit_status() {
        assert!(try_command_copy(&["sh", "-c", "cat >/dev/null"], "x").is_ok());
        let err = try_command_copy(&["sh", "-c", "echo noisy >&2; cat >/dev/null; exit 3"], "x")
            .unwrap_err();
        assert!(err.to_string().contains("exited with status"), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn fallback_that_stops_reading_is_an_error() {
        let text = "x".repeat(1 << 20);
        assert!(try_command_copy(&["true"], &text).is_err());
    }
}
