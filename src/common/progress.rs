use indicatif::{ProgressBar, ProgressStyle};

use crate::ui::is_json;

pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    // Spinners would interleave with JSON lines
    if is_json() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠉⠙⠚⠒⠂⠲⠴⠤⠄⠦⠖⠐⠓⠋ ");
    pb.set_style(style);
    pb.set_message(message.into());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Finish a spinner and print a success message with a checkmark
/// This clears the spinner line entirely and prints a clean message
pub fn finish_spinner_with_success(pb: ProgressBar, message: impl Into<String>) {
    pb.finish_and_clear();
    if !is_json() {
        println!("✓ {}", message.into());
    }
}
