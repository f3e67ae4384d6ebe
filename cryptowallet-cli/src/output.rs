//! Output formatting utilities

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDateTime;
use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use cryptowallet_core::domain::{Page, Tone, TransactionStatus};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Print any serializable value as pretty JSON
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn format_time(at: &NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn active_label(active: bool) -> ColoredString {
    if active {
        "active".green()
    } else {
        "inactive".dimmed()
    }
}

pub fn status_label(status: TransactionStatus) -> ColoredString {
    let style = status.style();
    match style.tone {
        Tone::Success => style.label.green(),
        Tone::Warning => style.label.yellow(),
        Tone::Danger => style.label.red(),
    }
}

/// "Showing 11 to 20 of 42" plus the page buttons around the current page
pub fn page_footer<T>(page: &Page<T>) -> String {
    let showing = match page.showing() {
        Some((start, end)) => format!("Showing {} to {} of {}", start, end, page.total_elements),
        None => "No results".to_string(),
    };
    if page.total_pages <= 1 {
        return showing;
    }
    let buttons: Vec<String> = page
        .window()
        .map(|i| {
            if i == page.number {
                format!("[{}]", i + 1)
            } else {
                (i + 1).to_string()
            }
        })
        .collect();
    format!("{}  |  page {}", showing, buttons.join(" "))
}

/// Run `fut` behind a spinner on stderr when attached to a terminal
pub async fn spin<T>(message: &str, fut: impl Future<Output = T>) -> T {
    let spinner = if atty::is(atty::Stream::Stderr) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    } else {
        None
    };

    let result = fut.await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    result
}
