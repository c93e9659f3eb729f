//! Progress indicators
//!
//! Progress bars for bulk imports. Hidden when stderr is not a terminal.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar counting imported records.
/// An invisible bar still tracks position and length.
pub fn import_progress(total: u64, visible: bool) -> ProgressBar {
    if !visible {
        let pb = ProgressBar::hidden();
        pb.set_length(total);
        return pb;
    }
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len} records ({eta})")
    {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb.set_message("Importing");
    pb
}

/// Finish a progress bar with a success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}
