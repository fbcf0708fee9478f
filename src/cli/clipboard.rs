//! Copy a password to the system clipboard and clear it after a delay.
//!
//! The countdown can be cut short with Ctrl-C; the clipboard is cleared
//! either way.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::errors::{MskError, Result};

/// How often the countdown checks for cancellation.
const TICK: Duration = Duration::from_millis(100);

/// Copy `password`, wait `clear_after`, then clear the clipboard.
#[cfg(feature = "clipboard")]
pub fn copy_then_clear(
    password: &[u8],
    clear_after: Duration,
    cancel: &CancellationToken,
) -> Result<()> {
    use std::io::Write;

    use console::style;

    let text = std::str::from_utf8(password)
        .map_err(|_| MskError::ClipboardError("password is not valid UTF-8 text".into()))?;

    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| MskError::ClipboardError(format!("clipboard unavailable: {e}")))?;
    clipboard
        .set_text(text)
        .map_err(|e| MskError::ClipboardError(format!("copy failed: {e}")))?;

    super::output::success("Password copied to clipboard (press Ctrl+V to paste)");
    print!(
        "{}",
        style(format!(
            "Clearing clipboard in {} seconds ",
            clear_after.as_secs()
        ))
        .dim()
    );
    let _ = std::io::stdout().flush();

    let cleared_early = countdown(clear_after, cancel, || {
        print!("{}", style(".").dim());
        let _ = std::io::stdout().flush();
    });
    println!();

    clipboard
        .clear()
        .map_err(|e| MskError::ClipboardError(format!("clear failed: {e}")))?;

    if cleared_early {
        super::output::info("Interrupted — clipboard cleared.");
    } else {
        super::output::success("Clipboard cleared.");
    }
    Ok(())
}

/// Fallback when the binary was built without clipboard support.
#[cfg(not(feature = "clipboard"))]
pub fn copy_then_clear(
    _password: &[u8],
    _clear_after: Duration,
    _cancel: &CancellationToken,
) -> Result<()> {
    Err(MskError::ClipboardError(
        "msk was built without clipboard support; use `get --print`".into(),
    ))
}

/// Sleep for `total`, calling `on_second` once per elapsed second.
///
/// Returns `true` if `cancel` fired before the time was up.
#[cfg_attr(not(feature = "clipboard"), allow(dead_code))]
fn countdown(total: Duration, cancel: &CancellationToken, mut on_second: impl FnMut()) -> bool {
    let mut elapsed = Duration::ZERO;
    let mut since_tick = Duration::ZERO;

    while elapsed < total {
        if cancel.is_cancelled() {
            return true;
        }
        let step = TICK.min(total - elapsed);
        std::thread::sleep(step);
        elapsed += step;
        since_tick += step;
        if since_tick >= Duration::from_secs(1) {
            since_tick = Duration::ZERO;
            on_second();
        }
    }
    false
}
