//! Clipboard capability.
//!
//! The provisioner receives a `Box<dyn Clipboard>` at startup. Which
//! provider it gets depends on `output.clipboard` and on whether the crate
//! was built with the `clipboard` feature.

use tracing::warn;

use crate::config::OutputConfig;
use crate::errors::ProvisionResult;

/// Somewhere to put the token besides stdout.
pub trait Clipboard {
    fn copy(&mut self, text: &str) -> ProvisionResult<()>;

    /// Whether `copy` does anything.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Provider used when the clipboard is turned off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn copy(&mut self, _text: &str) -> ProvisionResult<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// The desktop clipboard, via `arboard`.
///
/// On Linux the X11/Wayland selection lives only as long as the process
/// that owns it, so the token is handed to a detached copy of the current
/// executable which holds the selection until something else replaces it.
/// A binary using this provider on Linux must call [`serve_holder`] first
/// thing in `main`.
#[cfg(feature = "clipboard")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[cfg(feature = "clipboard")]
impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> ProvisionResult<()> {
        copy_text(text)
    }
}

/// Environment variable that starts the executable as a clipboard holder.
#[cfg(all(feature = "clipboard", target_os = "linux"))]
pub const HOLDER_ENV: &str = "FLEXPROV_CLIPBOARD_HOLDER";

/// Line the holder prints once it is connected to the display.
#[cfg(all(feature = "clipboard", target_os = "linux"))]
const HOLDER_READY: &str = "ready";

#[cfg(feature = "clipboard")]
fn clipboard_error(e: impl std::fmt::Display) -> crate::errors::ProvisionError {
    crate::errors::ProvisionError::Clipboard(e.to_string())
}

#[cfg(all(feature = "clipboard", not(target_os = "linux")))]
fn copy_text(text: &str) -> ProvisionResult<()> {
    let mut clipboard = arboard::Clipboard::new().map_err(clipboard_error)?;
    clipboard.set_text(text.to_owned()).map_err(clipboard_error)
}

/// The holder outlives this process and exits once the selection is taken
/// over by another program.
#[cfg(all(feature = "clipboard", target_os = "linux"))]
#[allow(clippy::zombie_processes)]
fn copy_text(text: &str) -> ProvisionResult<()> {
    use std::io::{BufRead, BufReader, Write};
    use std::process::{Command, Stdio};

    let exe = std::env::current_exe().map_err(clipboard_error)?;
    let mut holder = Command::new(exe)
        .env(HOLDER_ENV, "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .current_dir("/")
        .spawn()
        .map_err(clipboard_error)?;

    // The token goes over stdin so it never shows up in the process list.
    if let Some(mut stdin) = holder.stdin.take() {
        stdin.write_all(text.as_bytes()).map_err(clipboard_error)?;
    }

    let mut line = String::new();
    if let Some(stdout) = holder.stdout.take() {
        BufReader::new(stdout)
            .read_line(&mut line)
            .map_err(clipboard_error)?;
    }
    if line.trim() != HOLDER_READY {
        return Err(clipboard_error("clipboard holder could not reach the display"));
    }
    tracing::debug!(pid = holder.id(), "Clipboard holder started");
    Ok(())
}

/// Run as the clipboard holder when [`HOLDER_ENV`] is set.
///
/// Returns `None` for a normal start. Otherwise reads the text from stdin,
/// takes the selection and blocks until another program replaces it.
#[cfg(all(feature = "clipboard", target_os = "linux"))]
pub fn serve_holder() -> Option<ProvisionResult<()>> {
    std::env::var_os(HOLDER_ENV)?;
    Some(hold_selection())
}

#[cfg(all(feature = "clipboard", target_os = "linux"))]
fn hold_selection() -> ProvisionResult<()> {
    use std::io::{Read, Write};

    use arboard::SetExtLinux;

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(clipboard_error)?;

    let mut clipboard = arboard::Clipboard::new().map_err(clipboard_error)?;
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{HOLDER_READY}").map_err(clipboard_error)?;
    stdout.flush().map_err(clipboard_error)?;

    clipboard.set().wait().text(text).map_err(clipboard_error)
}

/// Pick the provider for this run.
pub fn from_config(output: &OutputConfig) -> Box<dyn Clipboard> {
    if !output.clipboard {
        return Box::new(NoClipboard);
    }
    system_clipboard()
}

#[cfg(feature = "clipboard")]
fn system_clipboard() -> Box<dyn Clipboard> {
    Box::new(SystemClipboard)
}

#[cfg(not(feature = "clipboard"))]
fn system_clipboard() -> Box<dyn Clipboard> {
    warn!("output.clipboard is set but this build has no clipboard support");
    Box::new(NoClipboard)
}

/// Copy `text`, logging instead of failing when the clipboard is unusable.
pub fn copy_or_warn(clipboard: &mut dyn Clipboard, text: &str) -> bool {
    if !clipboard.is_enabled() {
        return false;
    }
    match clipboard.copy(text) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to copy token to clipboard: {}", e);
            false
        }
    }
}
