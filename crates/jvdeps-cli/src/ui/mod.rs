//! Terminal output: status messages on stderr, results on stdout.

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{print_summary, print_unit, render_resolution, summary_line};
pub use messages::{error, info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(false);

/// Check if color output should be enabled.
///
/// `NO_COLOR` disables and `FORCE_COLOR` forces colors; otherwise colors are
/// used when stderr is a terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Decide once, early in `main`, whether output is colored.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

/// Apply `style` only when colors are enabled.
pub(crate) fn paint(text: &str, style: impl FnOnce(&str) -> String) -> String {
    if colors_enabled() {
        style(text)
    } else {
        text.to_string()
    }
}
