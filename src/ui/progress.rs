use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress over the sessions of a build, with status lines printed above the bar.
pub struct SessionProgress {
    bar: ProgressBar,
}

impl SessionProgress {
    pub fn new(total: u64, label: &str) -> Self {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{spinner:.blue} [{elapsed_precise}] {prefix:.bold} {bar:30.cyan/blue} {pos}/{len} {msg}",
        )
        .map(|s| s.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_prefix(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    pub fn start(&self, session_id: &str) {
        self.bar.set_message(session_id.to_string());
    }

    pub fn advance(&self) {
        self.bar.inc(1);
    }

    fn print_status(&self, status: &str, message: &str, color: Color) {
        self.bar.println(format!("{} {}", status.color(color).bold(), message.normal()));
    }

    pub fn print_success(&self, message: &str) {
        self.print_status("OK", message, Color::Green);
    }

    pub fn print_warning(&self, message: &str) {
        self.print_status("WARN", message, Color::Yellow);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
