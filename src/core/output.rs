//! Colored status output for acquisition runs
//!
//! Uses owo-colors for terminal colors. Spinners live in `internal::progress`.

use owo_colors::OwoColorize;

/// Print an action header (blue, bold)
/// Example: "==> Acquiring debugpy 1.8.19 for linux"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print an action with artifact counter
/// Example: "(1/5) debugpy==1.8.19 cp314"
pub fn action_numbered(current: usize, total: usize, message: &str) {
    println!(
        "{} {}",
        format!("({}/{})", current, total).cyan(),
        message.bold()
    );
}

/// Print a sub-step (cyan arrow)
/// Example: "  -> trying manylinux_2_34_x86_64"
pub fn sub_action(step: &str) {
    println!("  {} {}", "->".cyan(), step);
}

/// Print a detail line (dimmed)
/// Example: "     debugpy/__init__.py"
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print a success message (green)
pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}
