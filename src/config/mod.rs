//! Configuration module for the collector.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Parsing duration and rate limit strings
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod parse;
pub mod validation;

pub use loader::{
    AccountConfig, CacheSetting, ClientConfig, Config, OutputConfig, DEFAULT_CACHE_MAX_AGE,
};
pub use modes::FetchMode;
pub use parse::{parse_duration, parse_rate_limit, RateLimit};
pub use validation::{parse_creator_id, parse_post_id, validate_config};
