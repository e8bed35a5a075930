//! Requests the core hands to the shell, and what comes back.
//!
//! Everything is checked while the request is built, so the shell only ever sees a well-formed
//! URL, header lines without line breaks, and a body on methods that allow one.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Largest body the core will hand over; image uploads are the only big ones.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatedUrl(String);

impl ValidatedUrl {
    /// Accepts absolute `http`/`https` URLs with a host and no embedded credentials.
    pub fn new(url: impl Into<String>) -> Result<Self, HttpError> {
        let raw = url.into();
        let reject = |reason: &str| HttpError::InvalidUrl {
            url: raw.clone(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(raw.trim()).map_err(|e| reject(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(reject("only http and https are supported"));
        }
        if parsed.host_str().is_none() {
            return Err(reject("missing host"));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(reject("credentials belong in headers"));
        }
        Ok(Self(parsed.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Header lines in insertion order; names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HttpHeaders(Vec<(String, String)>);

impl HttpHeaders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, replacing an earlier value for it.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), HttpError> {
        let (name, value) = (name.into(), value.into());
        let token = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
        if name.is_empty() || !name.chars().all(token) {
            return Err(HttpError::InvalidHeader {
                name,
                reason: "not a header token".to_string(),
            });
        }
        if value.contains(['\r', '\n', '\0']) {
            return Err(HttpError::InvalidHeader {
                name,
                reason: "value spans more than one line".to_string(),
            });
        }
        self.0.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.0.push((name, value));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Bodies the backend accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    Json,
    Multipart { boundary: String },
}

impl ContentType {
    #[must_use]
    pub fn header_value(&self) -> String {
        match self {
            ContentType::Json => "application/json".to_string(),
            ContentType::Multipart { boundary } => {
                format!("multipart/form-data; boundary={boundary}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    method: HttpMethod,
    url: ValidatedUrl,
    headers: HttpHeaders,
    #[serde(with = "serde_bytes")]
    body: Vec<u8>,
    request_id: String,
}

impl HttpRequest {
    fn to(method: HttpMethod, url: impl Into<String>) -> Result<Self, HttpError> {
        Ok(Self {
            method,
            url: ValidatedUrl::new(url)?,
            headers: HttpHeaders::new(),
            body: Vec::new(),
            request_id: uuid::Uuid::new_v4().to_string(),
        })
    }

    pub fn get(url: impl Into<String>) -> Result<Self, HttpError> {
        Self::to(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Result<Self, HttpError> {
        Self::to(HttpMethod::Post, url)
    }

    pub fn delete(url: impl Into<String>) -> Result<Self, HttpError> {
        Self::to(HttpMethod::Delete, url)
    }

    pub fn with_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, HttpError> {
        self.headers.insert(name, value)?;
        Ok(self)
    }

    /// Only POST carries a body here.
    pub fn with_body(mut self, content_type: &ContentType, body: Vec<u8>) -> Result<Self, HttpError> {
        if self.method != HttpMethod::Post {
            return Err(HttpError::BodyNotAllowed {
                method: self.method,
            });
        }
        if body.len() > MAX_BODY_BYTES {
            return Err(HttpError::BodyTooLarge {
                size: body.len(),
                max: MAX_BODY_BYTES,
            });
        }
        self.headers
            .insert("Content-Type", content_type.header_value())?;
        self.body = body;
        Ok(self)
    }

    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, HttpError> {
        let body = serde_json::to_vec(value).map_err(|e| HttpError::SerializationError {
            message: e.to_string(),
        })?;
        self.with_body(&ContentType::Json, body)
    }

    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    #[must_use]
    pub fn url(&self) -> &ValidatedUrl {
        &self.url
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl Operation for HttpRequest {
    type Output = HttpResult;
}

/// Build failures come from the core; transport failures are reported by the shell.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum HttpError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("{} requests carry no body", .method.as_str())]
    BodyNotAllowed { method: HttpMethod },

    #[error("body of {size} bytes is over the {max} byte limit")]
    BodyTooLarge { size: usize, max: usize },

    #[error("serialization error: {message}")]
    SerializationError { message: String },

    #[error("connection failed to {host}: {message}")]
    ConnectionError { host: String, message: String },

    #[error("timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    #[serde(with = "serde_bytes")]
    body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn from_status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

pub type HttpResult = Result<HttpResponse, HttpError>;

pub struct Http<Ev> {
    context: CapabilityContext<HttpRequest, Ev>,
}

impl<Ev> Clone for Http<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Http<Ev> {
    type Operation = HttpRequest;
    type MappedSelf<MappedEv> = Http<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Http::new(self.context.map_event(f))
    }
}

impl<Ev> Http<Ev>
where
    Ev: 'static,
{
    #[must_use]
    pub fn new(context: CapabilityContext<HttpRequest, Ev>) -> Self {
        Self { context }
    }

    pub fn send<F>(&self, request: HttpRequest, callback: F)
    where
        F: FnOnce(HttpResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        tracing::debug!(
            method = request.method().as_str(),
            url = request.url().as_str(),
            request_id = request.request_id(),
            "http request"
        );

        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(request).await;
            ctx.update_app(callback(result));
        });
    }
}
