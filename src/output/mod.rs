//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Spinners for paginated fetches
//! - Entity reports

pub mod console;
pub mod progress;
pub mod report;

pub use console::{
    print_banner, print_config_summary, print_error, print_info, print_success, print_warning,
};
pub use progress::FetchProgress;
pub use report::{
    print_creator, print_membership, print_message, print_post, print_summary, print_user,
};
