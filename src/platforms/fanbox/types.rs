//! Raw FANBOX API payloads and their mapping to the shared entities.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use crate::error::Result;
use crate::models::{Creator, DirectMessage, Membership, Post, Price, User};
use crate::platforms::fanbox::body::build_body;
use crate::platforms::fanbox::PLATFORM_NAME;

/// Every API response wraps its payload in `body`.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub body: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// Page metadata embedded in `<meta name="metadata">` of www.fanbox.cc.
#[derive(Debug, Deserialize)]
pub struct PageMetadata {
    pub context: PageContext,
}

#[derive(Debug, Deserialize)]
pub struct PageContext {
    #[serde(default)]
    pub user: Option<ContextUser>,
}

/// The signed-in user; anonymous visitors have a null `userId`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextUser {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCreator {
    pub creator_id: String,
    pub user: RawUser,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub profile_links: Vec<String>,
    #[serde(default)]
    pub has_adult_content: bool,
    #[serde(default)]
    pub is_followed: bool,
    #[serde(default)]
    pub is_supported: bool,
    #[serde(default)]
    pub is_stopped: bool,
    #[serde(default)]
    pub has_booth_shop: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    pub id: String,
    pub title: String,
    pub creator_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Null when the viewer cannot read the post.
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    pub published_datetime: DateTime<Utc>,
    #[serde(default)]
    pub updated_datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub is_restricted: bool,
    #[serde(default)]
    pub has_adult_content: bool,
}

/// One page of `post.listCreator`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPostPage {
    pub items: Vec<RawPost>,
    #[serde(default)]
    pub next_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlan {
    pub id: String,
    pub title: String,
    pub fee: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    pub creator_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NewsletterCreator {
    Id(String),
    Creator {
        #[serde(rename = "creatorId")]
        creator_id: String,
    },
}

impl NewsletterCreator {
    fn into_id(self) -> String {
        match self {
            NewsletterCreator::Id(id) => id,
            NewsletterCreator::Creator { creator_id } => creator_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNewsletter {
    pub id: String,
    pub creator: NewsletterCreator,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_read: bool,
}

// Post body payloads, selected by the post `type`.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleBody {
    #[serde(default)]
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub image_map: HashMap<String, RawImage>,
    #[serde(default)]
    pub file_map: HashMap<String, RawFile>,
    #[serde(default)]
    pub url_embed_map: HashMap<String, RawUrlEmbed>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub styles: Vec<RawStyle>,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub url_embed_id: Option<String>,
}

/// Inline style span; `offset` and `length` count characters.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStyle {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImage {
    pub id: String,
    pub original_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub extension: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFile {
    pub id: String,
    pub name: String,
    pub extension: String,
    #[serde(default)]
    pub size: Option<u64>,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUrlEmbed {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageBody {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub images: Vec<RawImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileBody {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub files: Vec<RawFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub text: Option<String>,
}

/// Parse an optional URL field. Empty strings count as absent.
fn optional_url(value: Option<&str>) -> Result<Option<Url>> {
    match value {
        Some(url) if !url.is_empty() => Ok(Some(Url::parse(url)?)),
        _ => Ok(None),
    }
}

impl RawUser {
    pub fn into_user(self) -> Result<User> {
        Ok(User {
            avatar: optional_url(self.icon_url.as_deref())?,
            id: self.user_id,
            name: self.name,
            platform: PLATFORM_NAME,
        })
    }
}

impl ContextUser {
    /// The signed-in user, if the page was rendered for one.
    pub fn into_user(self) -> Result<Option<User>> {
        let Some(id) = self.user_id else {
            return Ok(None);
        };
        Ok(Some(User {
            avatar: optional_url(self.icon_url.as_deref())?,
            id,
            name: self.name.unwrap_or_default(),
            platform: PLATFORM_NAME,
        }))
    }
}

impl RawCreator {
    pub fn into_creator(self) -> Result<Creator> {
        let homepage = Url::parse(&format!("https://www.fanbox.cc/@{}", self.creator_id))?;
        Ok(Creator {
            avatar: optional_url(self.user.icon_url.as_deref())?,
            name: self.user.name,
            homepage,
            description: self.description,
            cover: optional_url(self.cover_image_url.as_deref())?,
            profile_links: self.profile_links,
            is_nsfw: self.has_adult_content,
            is_following: self.is_followed,
            is_member: self.is_supported,
            is_stopped: self.is_stopped,
            has_booth_shop: self.has_booth_shop,
            id: self.creator_id,
            platform: PLATFORM_NAME,
        })
    }
}

impl RawPost {
    pub fn into_post(self) -> Result<Post> {
        let body = build_body(&self.kind, self.body)?;
        Ok(Post {
            id: self.id,
            title: self.title,
            creator: self.creator_id,
            body,
            published_time: self.published_datetime,
            updated_time: self.updated_datetime,
            cover: optional_url(self.cover_image_url.as_deref())?,
            is_privileged: !self.is_restricted,
            is_nsfw: self.has_adult_content,
            excerpt: self.excerpt.filter(|e| !e.is_empty()),
            platform: PLATFORM_NAME,
        })
    }
}

impl RawPlan {
    pub fn into_membership(self) -> Result<Membership> {
        Ok(Membership {
            price: Price::new(self.fee, "JPY")?,
            image: optional_url(self.cover_image_url.as_deref())?,
            id: self.id,
            name: self.title,
            creator: self.creator_id,
            description: self.description,
            platform: PLATFORM_NAME,
        })
    }
}

impl RawNewsletter {
    pub fn into_message(self) -> DirectMessage {
        DirectMessage {
            id: self.id,
            creator: self.creator.into_id(),
            sent_time: self.created_at,
            updated_time: self.updated_at,
            message: self.body,
            is_read: self.is_read,
            platform: PLATFORM_NAME,
        }
    }
}
