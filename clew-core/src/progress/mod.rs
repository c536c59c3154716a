//! Progress reporting helpers
//!
//! Thin wrappers over indicatif so every stage renders the same bar and
//! honors the `CLEW_SILENT` environment variable.

use indicatif::{ProgressBar, ProgressStyle};

/// Whether progress bars should be drawn at all.
pub fn progress_enabled() -> bool {
    std::env::var("CLEW_SILENT").is_err()
}

/// A counting bar for a known number of items.
pub fn item_bar(total: u64, message: &str) -> ProgressBar {
    if !progress_enabled() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg} ({per_sec}, ETA: {eta})")
            .unwrap()
            .progress_chars("##-"),
    );
    pb.set_message(message.to_string());
    pb
}

/// A spinner for work with no known total, e.g. an external aligner run.
pub fn spinner(message: &str) -> ProgressBar {
    if !progress_enabled() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_bar_tracks_position() {
        let pb = item_bar(10, "reads");
        pb.inc(3);
        assert_eq!(pb.position(), 3);
        pb.finish();
    }

    #[test]
    fn test_hidden_when_silent() {
        std::env::set_var("CLEW_SILENT", "1");
        let pb = item_bar(10, "reads");
        assert!(pb.is_hidden());
        std::env::remove_var("CLEW_SILENT");
    }
}
