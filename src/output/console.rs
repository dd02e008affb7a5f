//! Console output utilities.

use console::{style, StyledObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    fn label(self) -> StyledObject<&'static str> {
        match self {
            Level::Info => style("INFO").cyan().bold(),
            Level::Success => style("OK").green().bold(),
            Level::Warning => style("WARN").yellow().bold(),
            Level::Error => style("ERROR").red().bold(),
        }
    }
}

fn emit(level: Level, message: &str) {
    match level {
        Level::Error => eprintln!("{} {}", level.label(), message),
        _ => println!("{} {}", level.label(), message),
    }
}

pub fn print_info(message: &str) {
    emit(Level::Info, message);
}

pub fn print_success(message: &str) {
    emit(Level::Success, message);
}

pub fn print_warning(message: &str) {
    emit(Level::Warning, message);
}

/// Print an error message to stderr.
pub fn print_error(message: &str) {
    emit(Level::Error, message);
}

/// Print the application banner with the crate version.
pub fn print_banner() {
    println!();
    println!(
        "{} {}",
        style("subscrforge collector").cyan().bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
    );
    println!("{}", style("Creators, posts, plans and newsletters from FANBOX").dim());
}

/// Print the effective fetch settings.
pub fn print_config_summary(mode: &str, target: Option<&str>, cache: &str, rate_limit: &str) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Mode:       {}", mode);
    println!("  Target:     {}", target.unwrap_or("-"));
    println!("  Cache:      {}", cache);
    println!("  Rate limit: {}", rate_limit);
    println!();
}
