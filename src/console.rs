//! User-facing console lines, prefixed with `[codecov]` and colored by
//! severity.
//!
//! Color is disabled when `NO_COLOR` is set (any value) or stderr is not a
//! terminal; `COLOR` forces it on.

use std::io::IsTerminal;
use std::sync::OnceLock;

use owo_colors::OwoColorize;

const PREFIX: &str = "[codecov]";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Severity {
    Error,
    Warning,
    Info,
    Detail,
    Success,
}

fn should_colorize() -> bool {
    static SHOULD_COLORIZE: OnceLock<bool> = OnceLock::new();
    *SHOULD_COLORIZE.get_or_init(|| {
        if std::env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if std::env::var_os("COLOR").is_some() {
            return true;
        }
        std::io::stderr().is_terminal()
    })
}

fn paint(severity: Severity, text: &str, colorize: bool) -> String {
    if !colorize {
        return text.to_string();
    }
    match severity {
        Severity::Error => text.red().to_string(),
        Severity::Warning => text.yellow().to_string(),
        Severity::Info => text.cyan().to_string(),
        Severity::Detail => text.dimmed().to_string(),
        Severity::Success => text.green().to_string(),
    }
}

fn emit(severity: Severity, msg: &str) {
    eprintln!(
        "{}",
        paint(severity, &format!("{PREFIX} {msg}"), should_colorize())
    );
}

/// Errors.
pub fn red(msg: &str) {
    emit(Severity::Error, msg);
}

/// Warnings.
pub fn yellow(msg: &str) {
    emit(Severity::Warning, msg);
}

/// Informational progress.
pub fn cyan(msg: &str) {
    emit(Severity::Info, msg);
}

/// Low-importance detail.
pub fn dim(msg: &str) {
    emit(Severity::Detail, msg);
}

/// Success.
pub fn green(msg: &str) {
    emit(Severity::Success, msg);
}

/// Verbose output, printed only when `enabled`.
pub fn debug(msg: &str, enabled: bool) {
    if enabled {
        let ts = chrono::Local::now().format("%H:%M:%S%.3f");
        emit(Severity::Detail, &format!("[{ts}] {msg}"));
    }
}
