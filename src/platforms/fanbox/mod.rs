//! pixivFANBOX platform.
//!
//! Authenticated with the `FANBOXSESSID` cookie of a signed-in browser.
//!
//! ```no_run
//! use subscrforge_collector::config::ClientConfig;
//! use subscrforge_collector::platforms::fanbox::{Fanbox, FanboxClient};
//!
//! # async fn run() -> subscrforge_collector::Result<()> {
//! let mut client = FanboxClient::new(Fanbox::new("12345678_abcdef"), &ClientConfig::default())?;
//! client.connect().await?;
//! if let Some(post) = client.posts()?.get("1234567").await? {
//!     println!("{}", post.body.render());
//! }
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod clients;
pub mod types;

use std::sync::LazyLock;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, USER_AGENT};
use scraper::{Html, Selector};
use url::Url;

use crate::client::{Client, Platform, Session};
use crate::error::{Error, Result};
use crate::models::User;
use crate::platforms::fanbox::types::PageMetadata;

pub use clients::{CreatorRef, Creators, Newsletters, Plans, Posts};

pub const PLATFORM_NAME: &str = "Fanbox";

/// Cookie holding the session credential.
pub const SESSION_COOKIE: &str = "FANBOXSESSID";

static API_BASE_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://api.fanbox.cc/").unwrap());

static WEB_BASE_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://www.fanbox.cc/").unwrap());

static METADATA_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="metadata"]"#).unwrap());

/// A client for pixivFANBOX.
pub type FanboxClient = Client<Fanbox>;

/// FANBOX credentials and endpoints.
#[derive(Debug, Clone)]
pub struct Fanbox {
    session_id: String,
    user_agent: Option<String>,
    api_base: Url,
    web_base: Url,
}

impl Fanbox {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_agent: None,
            api_base: API_BASE_URL.clone(),
            web_base: WEB_BASE_URL.clone(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Point the client at other API and web hosts.
    pub fn with_base_urls(mut self, api_base: Url, web_base: Url) -> Self {
        self.api_base = api_base;
        self.web_base = web_base;
        self
    }

    pub fn web_base(&self) -> &Url {
        &self.web_base
    }
}

#[async_trait]
impl Platform for Fanbox {
    fn name(&self) -> &'static str {
        PLATFORM_NAME
    }

    fn base_url(&self) -> Url {
        self.api_base.clone()
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let origin = self.web_base.origin().ascii_serialization();
        headers.insert(
            ORIGIN,
            HeaderValue::from_str(&origin)
                .map_err(|e| Error::Validation(format!("Invalid origin '{}': {}", origin, e)))?,
        );
        if let Some(user_agent) = &self.user_agent {
            headers.insert(
                USER_AGENT,
                HeaderValue::from_str(user_agent).map_err(|e| Error::ConfigValidation {
                    field: "user_agent".to_string(),
                    message: e.to_string(),
                })?,
            );
        }
        Ok(headers)
    }

    fn cookies(&self) -> Vec<(String, String)> {
        if self.session_id.is_empty() {
            return Vec::new();
        }
        vec![(SESSION_COOKIE.to_string(), self.session_id.clone())]
    }

    async fn retrieve_user(&self, session: &Session) -> Result<User> {
        let rejected = || Error::RetrieveUser {
            credential: "session_id".to_string(),
        };

        let response = match session.get(self.web_base.as_str(), &[]).await {
            Ok(response) => response,
            Err(Error::Status { status, .. })
                if status.is_redirection()
                    || status == reqwest::StatusCode::UNAUTHORIZED
                    || status == reqwest::StatusCode::FORBIDDEN =>
            {
                return Err(rejected())
            }
            Err(e) => return Err(e),
        };

        let Some(metadata) = extract_metadata(&response.text()) else {
            tracing::debug!("No metadata found in {}", response.url());
            return Err(rejected());
        };
        let metadata: PageMetadata = serde_json::from_str(&metadata)?;

        metadata
            .context
            .user
            .map(|user| user.into_user())
            .transpose()?
            .flatten()
            .ok_or_else(rejected)
    }
}

/// The decoded `content` of `<meta name="metadata">`.
fn extract_metadata(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let meta = document.select(&METADATA_SELECTOR).next()?;
    meta.value().attr("content").map(str::to_string)
}
