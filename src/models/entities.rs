//! Platform-agnostic entities returned by every platform client.

use chrono::{DateTime, Utc};
use url::Url;

use crate::models::post::PostBody;
use crate::models::price::Price;

/// The authenticated account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub avatar: Option<Url>,
    pub(crate) platform: &'static str,
}

impl User {
    /// Name of the platform client that produced this value.
    pub fn client_name(&self) -> &str {
        self.platform
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Creator {
    pub id: String,
    pub name: String,
    pub avatar: Option<Url>,
    pub homepage: Url,
    pub description: Option<String>,
    pub cover: Option<Url>,
    pub profile_links: Vec<String>,
    pub is_nsfw: bool,
    pub is_following: bool,
    pub is_member: bool,
    /// The creator has paused their page.
    pub is_stopped: bool,
    pub has_booth_shop: bool,
    pub(crate) platform: &'static str,
}

impl Creator {
    pub fn client_name(&self) -> &str {
        self.platform
    }
}

/// A paid support tier offered by a creator.
#[derive(Debug, Clone, PartialEq)]
pub struct Membership {
    pub id: String,
    pub name: String,
    /// Creator ID.
    pub creator: String,
    pub price: Price,
    pub image: Option<Url>,
    pub description: Option<String>,
    pub(crate) platform: &'static str,
}

impl Membership {
    pub fn client_name(&self) -> &str {
        self.platform
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub title: String,
    /// Creator ID.
    pub creator: String,
    /// Empty when the viewer has no access to the post.
    pub body: PostBody,
    pub published_time: DateTime<Utc>,
    pub updated_time: Option<DateTime<Utc>>,
    pub cover: Option<Url>,
    /// Whether the viewer can read the full body.
    pub is_privileged: bool,
    pub is_nsfw: bool,
    pub excerpt: Option<String>,
    pub(crate) platform: &'static str,
}

impl Post {
    pub fn client_name(&self) -> &str {
        self.platform
    }
}

/// A message sent by a creator to supporters (FANBOX newsletters).
#[derive(Debug, Clone, PartialEq)]
pub struct DirectMessage {
    pub id: String,
    /// Creator ID.
    pub creator: String,
    pub sent_time: DateTime<Utc>,
    pub updated_time: Option<DateTime<Utc>>,
    pub message: Option<String>,
    pub is_read: bool,
    pub(crate) platform: &'static str,
}

impl DirectMessage {
    pub fn client_name(&self) -> &str {
        self.platform
    }
}
