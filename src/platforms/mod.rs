//! Platform implementations.

pub mod fanbox;

pub use fanbox::{Fanbox, FanboxClient};
