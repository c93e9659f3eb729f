//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use owo_colors::OwoColorize;
use urbancover_coverage::Severity;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Format a distance in kilometers, switching to meters below 1 km
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0} m", km * 1000.0)
    } else {
        format!("{:.2} km", km)
    }
}

/// Format a 0-100 coverage score, colored by band
pub fn format_score(score: f64) -> String {
    let text = format!("{:.1}", score);
    if score >= 70.0 {
        text.green().to_string()
    } else if score >= 40.0 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

/// Format a severity label, colored
pub fn format_severity(severity: Severity) -> String {
    match severity {
        Severity::Critical => severity.to_string().red().bold().to_string(),
        Severity::Warning => severity.to_string().yellow().to_string(),
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_distance_meters() {
        assert_eq!(format_distance(0.25), "250 m");
    }

    #[test]
    fn test_format_distance_km() {
        assert_eq!(format_distance(3.456), "3.46 km");
    }

    #[test]
    fn test_format_score_keeps_value() {
        assert!(format_score(85.0).contains("85.0"));
        assert!(format_score(12.5).contains("12.5"));
    }

    #[test]
    fn test_format_severity_keeps_label() {
        assert!(format_severity(Severity::Critical).contains("Critical"));
        assert!(format_severity(Severity::Warning).contains("Warning"));
    }

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn test_format_duration_mins() {
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(1, "facility", "facilities"), "1 facility");
        assert_eq!(format_count(5, "facility", "facilities"), "5 facilities");
    }
}
