//! Data models shared by all platforms.
//!
//! - [`post`]: post bodies made of typed segments
//! - [`markup`]: the element tree post bodies render to
//! - [`price`]: currency-tagged money values
//! - [`entities`]: users, creators, posts, memberships and messages

pub mod entities;
pub mod markup;
pub mod post;
pub mod price;

pub use entities::{Creator, DirectMessage, Membership, Post, User};
pub use markup::{Element, Node, RenderOptions};
pub use post::{File, Image, Paragraph, PostBody, Segment, SegmentKind, Video};
pub use price::Price;
