//! Small helpers for logging and post-run conveniences.

use std::process::Command;
use tracing::{info, warn};

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes with an ellipsis and byte count
/// indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
    }
}

/// Open a written report in the platform's default viewer.
///
/// Best-effort: a viewer that fails to launch is a warning, never an error.
pub fn open_in_viewer(path: &str) {
    match viewer_command(path).spawn() {
        Ok(_) => info!(%path, "Opened report in system viewer"),
        Err(e) => warn!(%path, error = %e, "Could not open report in system viewer"),
    }
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "windows")]
fn viewer_command(path: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", path]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(path: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // 'é' is two bytes; cutting mid-char must not panic.
        let s = "é".repeat(10);
        let result = truncate_for_log(&s, 3);
        assert!(result.starts_with("é"));
    }
}
