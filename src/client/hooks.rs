//! Request and response hooks run by every session.

use std::fmt;
use std::sync::Arc;

use console::style;
use reqwest::Request;

use crate::error::Result;
use crate::transport::Response;

/// Called before a request is handed to the transport.
pub type RequestHook = Arc<dyn Fn(&Request) -> Result<()> + Send + Sync>;

/// Called after a response is received, in registration order.
pub type ResponseHook = Arc<dyn Fn(&Response) -> Result<()> + Send + Sync>;

/// Ordered hook lists. An error returned by any hook aborts the request.
#[derive(Clone, Default)]
pub struct EventHooks {
    on_request: Vec<RequestHook>,
    on_response: Vec<ResponseHook>,
}

impl EventHooks {
    pub fn builder() -> EventHooksBuilder {
        EventHooksBuilder::default()
    }

    /// Request logging, response logging and status checking.
    pub fn defaults() -> Self {
        Self::builder().with_defaults().build()
    }

    pub fn on_request(&self) -> &[RequestHook] {
        &self.on_request
    }

    pub fn on_response(&self) -> &[ResponseHook] {
        &self.on_response
    }

    pub(crate) fn run_request(&self, request: &Request) -> Result<()> {
        self.on_request.iter().try_for_each(|hook| hook(request))
    }

    pub(crate) fn run_response(&self, response: &Response) -> Result<()> {
        self.on_response.iter().try_for_each(|hook| hook(response))
    }
}

impl fmt::Debug for EventHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHooks")
            .field("on_request", &self.on_request.len())
            .field("on_response", &self.on_response.len())
            .finish()
    }
}

/// Assembles [`EventHooks`] explicitly, in call order.
#[derive(Default)]
pub struct EventHooksBuilder {
    hooks: EventHooks,
}

impl EventHooksBuilder {
    pub fn on_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Request) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.on_request.push(Arc::new(hook));
        self
    }

    pub fn on_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Response) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.on_response.push(Arc::new(hook));
        self
    }

    /// Register [`log_request`], [`log_response`] and [`raise_for_status`].
    pub fn with_defaults(self) -> Self {
        self.on_request(log_request)
            .on_response(log_response)
            .on_response(raise_for_status)
    }

    pub fn build(self) -> EventHooks {
        self.hooks
    }
}

pub fn log_request(request: &Request) -> Result<()> {
    tracing::debug!(
        "Request <{}> sent.",
        style(format!("{} {}", request.method(), request.url())).underlined()
    );
    Ok(())
}

/// Fail on 4xx and 5xx statuses with [`crate::Error::Status`].
pub fn raise_for_status(response: &Response) -> Result<()> {
    response.clone().error_for_status().map(|_| ())
}

pub fn log_response(response: &Response) -> Result<()> {
    let status = response.status();
    let text = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    );
    let text = match status.as_u16() / 100 {
        2 => style(text).green(),
        3 => style(text).blue(),
        4 => style(text).red(),
        5 => style(text).magenta(),
        _ => style(text),
    };

    tracing::debug!(
        "Request <{}> responded with status [{}]{}.",
        style(response.url()).underlined(),
        text,
        if response.from_cache() { " (cached)" } else { "" }
    );
    Ok(())
}
