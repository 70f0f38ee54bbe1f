//! Terminal status output. Everything goes to stderr so stack documents on
//! stdout stay machine-readable.

use std::io::Write;
use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

const LABEL_WIDTH: usize = 12;

fn emit(style: Style, label: &str, message: &str) {
    let mut err = std::io::stderr().lock();
    let _ = writeln!(err, "{:>LABEL_WIDTH$} {message}", style.apply_to(label));
}

/// `   Generated 3 stack(s), 3 recorded` with a bold green label.
pub fn status(label: &str, message: &str) {
    emit(Style::new().green().bold(), label, message);
}

/// Same layout as [`status`], yellow label.
pub fn status_warn(label: &str, message: &str) {
    emit(Style::new().yellow().bold(), label, message);
}

/// Spinner for runs of unknown length, such as a resolver pass. Call
/// [`ProgressBar::finish_and_clear`] before printing results.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
