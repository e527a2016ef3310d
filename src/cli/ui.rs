use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Creates a standard spinner ProgressBar.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue.bold} {msg}")
            .unwrap()
            .tick_strings(&[
                "▹▹▹▹▹",
                "▸▹▹▹▹",
                "▹▸▹▹▹",
                "▹▹▸▹▹",
                "▹▹▹▸▹",
                "▹▹▹▹▸",
                "▪▪▪▪▪",
            ]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Spinner for one remote call; a hidden bar when progress output is disabled.
pub fn spinner(enabled: bool, message: &str) -> ProgressBar {
    if enabled {
        create_spinner(message)
    } else {
        ProgressBar::hidden()
    }
}

pub fn format_header(text: &str) -> String {
    format!("{}", text.blue().bold())
}

pub fn format_highlight(text: &str) -> String {
    format!("{}", text.cyan())
}

pub fn format_success(text: &str) -> String {
    format!("{}", text.green())
}

pub fn format_warning(text: &str) -> String {
    format!("{}", text.yellow())
}

pub fn format_error(text: &str) -> String {
    format!("{}", text.red())
}

/// Colours a CloudFormation stack or change-set status by outcome.
pub fn format_status(status: &str) -> String {
    if status.ends_with("_FAILED") || status == "FAILED" || status.contains("ROLLBACK") {
        format_error(status)
    } else if status.ends_with("_IN_PROGRESS") || status.ends_with("_PENDING") {
        format_warning(status)
    } else if status.ends_with("_COMPLETE") {
        format_success(status)
    } else {
        status.to_string()
    }
}

/// Blank line between the sections of consecutive templates.
pub fn print_separator(index: usize, total: usize) {
    if index + 1 < total {
        println!();
    }
}


#[cfg(test)]
pub fn strip_colors(text: &str) -> String {
    let ansi = regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap();
    ansi.replace_all(text, "").into_owned()
}
