//! subscrforge collector - typed clients for subscription-based content platforms.
//!
//! This library fetches creators, posts, plans, newsletters and the current
//! user from subscription platforms with cookie credentials.
//!
//! # Features
//!
//! - pixivFANBOX client with namespaced sub-clients
//! - On-disk response caching, forced or following `Cache-Control`
//! - Token bucket rate limiting shared by every request of a client
//! - Post bodies normalised into ordered, typed segments rendered as HTML
//! - Currency-safe prices
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use subscrforge_collector::{Config, Fanbox, FanboxClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let mut client = FanboxClient::new(
//!         Fanbox::new(config.account.session_id.clone()),
//!         &config.client,
//!     )?;
//!     let user = client.connect().await?;
//!     println!("Signed in as {}", user.name);
//!
//!     for plan in client.plans()?.list_by_creator("creator").await? {
//!         println!("{} {}", plan.name, plan.price);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod fs;
pub mod models;
pub mod output;
pub mod platforms;
pub mod transport;

// Re-exports for convenience
pub use client::{Client, EventHooks, Platform, Session};
pub use config::{Config, FetchMode};
pub use error::{Error, Result};
pub use models::{
    Creator, DirectMessage, Membership, Post, PostBody, Price, Segment, SegmentKind, User,
};
pub use platforms::fanbox::{Fanbox, FanboxClient};
pub use transport::{ClientTransport, Response};
