//! Connected HTTP session for one platform.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Request;
use url::Url;

use crate::client::hooks::EventHooks;
use crate::error::{Error, Result};
use crate::transport::{ClientTransport, Response};

/// Sends requests relative to a platform base URL, with the platform's
/// headers and cookies, through the shared transport and hooks.
#[derive(Clone)]
pub struct Session {
    transport: Arc<ClientTransport>,
    base_url: Url,
    headers: HeaderMap,
    hooks: EventHooks,
}

impl Session {
    pub fn new(
        transport: Arc<ClientTransport>,
        base_url: Url,
        mut headers: HeaderMap,
        cookies: &[(String, String)],
        hooks: EventHooks,
    ) -> Result<Self> {
        if !cookies.is_empty() {
            let cookie = cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            let value = HeaderValue::from_str(&cookie)
                .map_err(|e| Error::Validation(format!("Invalid cookie value: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        Ok(Self {
            transport,
            base_url,
            headers,
            hooks,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &ClientTransport {
        &self.transport
    }

    /// Resolve a path against the base URL. Absolute URLs are kept as is.
    pub fn url(&self, target: &str) -> Result<Url> {
        Ok(self.base_url.join(target)?)
    }

    /// GET `target` (relative to the base URL, or absolute) with query
    /// parameters.
    pub async fn get(&self, target: &str, query: &[(&str, &str)]) -> Result<Response> {
        let mut url = self.url(target)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let request = self
            .transport
            .client()
            .get(url)
            .headers(self.headers.clone())
            .build()?;
        self.send(request).await
    }

    /// Run hooks around a prepared request.
    pub async fn send(&self, request: Request) -> Result<Response> {
        self.hooks.run_request(&request)?;
        let response = self.transport.handle(request).await?;
        self.hooks.run_response(&response)?;
        Ok(response)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("hooks", &self.hooks)
            .finish()
    }
}
