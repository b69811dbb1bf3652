//! Terminal UI utilities

use colored::Colorize;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use pixkit_lib::{PixError, SessionSnapshot};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print a section header
pub fn header(text: &str) {
    println!("\n{}", text.bold().underline());
}

/// Print a key-value pair
pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", key.cyan(), value);
}

/// Render `data` as terminal text, two columns per module
pub fn render_qr(data: &str) -> pixkit_lib::Result<String> {
    use qrcode::QrCode;

    let code = QrCode::new(data).map_err(|e| PixError::Render(e.to_string()))?;
    Ok(code
        .render::<char>()
        .quiet_zone(false)
        .module_dimensions(2, 1)
        .build())
}

/// Display a QR code in the terminal
pub fn qr_code(data: &str) -> pixkit_lib::Result<()> {
    let string = render_qr(data)?;
    println!("\n{}\n", string);
    Ok(())
}

/// Clear the terminal
pub fn clear() -> std::io::Result<()> {
    Term::stdout().clear_screen()
}

/// Print a separator line
pub fn separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// Print JSON prettily
pub fn json(value: &serde_json::Value) {
    if let Ok(pretty) = serde_json::to_string_pretty(value) {
        println!("{}", pretty);
    }
}

/// Progress bar that drains as a session counts down
pub fn countdown(total_seconds: u32) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(u64::from(total_seconds));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold} [{bar:40.green/white}] {msg}")?
            .progress_chars("██░"),
    );
    pb.set_prefix("Expires in");
    Ok(pb)
}

/// Move a countdown bar to the state in `snapshot`
pub fn update_countdown(pb: &ProgressBar, snapshot: &SessionSnapshot) {
    pb.set_position(u64::from(snapshot.remaining_seconds));
    pb.set_message(format!(
        "{} ({})",
        snapshot.remaining_display,
        snapshot.transaction_id
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_qr() {
        let rendered = render_qr("000201").unwrap();
        assert!(!rendered.is_empty());
    }

    #[test]
    fn test_clear_without_terminal_is_ok() {
        // test output is captured, so stdout is not a terminal
        assert!(clear().is_ok());
    }

    #[test]
    fn test_oversized_data_is_a_render_error() {
        let err = render_qr(&"9".repeat(8000)).unwrap_err();
        assert!(matches!(err, PixError::Render(_)));
        assert!(!err.is_fatal());
    }
}
