//! Request and response logging stages.
//!
//! [`RequestLogger`] emits one `incoming request` event per request with the
//! method, path and body, then rewinds the body for the handler.
//! [`ResponseLogger`] is driven by [`ResponseCapture`](super::capture::ResponseCapture)
//! on the success path only and emits one `outgoing response` event with the
//! final status and the captured body.
//!
//! Logged bodies pass through a [`Redactor`] that masks configured JSON
//! fields. The bytes delivered to the handler or the client are never
//! modified.

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::Value;

use super::writer::ResponseWriter;
use super::{Handler, PipelineRequest};
use crate::error::ServiceError;

pub const EMPTY_REQUEST_BODY: &str = "(empty)";
pub const NO_RESPONSE_BODY: &str = "(no body)";
pub const UNREADABLE_REQUEST_BODY: &str = "(unreadable)";
pub const MASK: &str = "***MASKED***";

/// Masks sensitive JSON fields in logged bodies.
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    fields: Vec<String>,
}

impl Redactor {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|f| f.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Render a body for logging, or `None` if it is empty or whitespace.
    #[must_use]
    pub fn render(&self, body: &[u8]) -> Option<String> {
        let text = String::from_utf8_lossy(body);
        if text.trim().is_empty() {
            return None;
        }
        if self.fields.is_empty() {
            return Some(text.into_owned());
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(mut value) => {
                self.mask(&mut value);
                Some(value.to_string())
            }
            Err(_) => Some(text.into_owned()),
        }
    }

    fn mask(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, entry) in map.iter_mut() {
                    if self.fields.contains(&key.to_ascii_lowercase()) {
                        *entry = Value::String(MASK.into());
                    } else {
                        self.mask(entry);
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.mask(item)),
            _ => {}
        }
    }
}

pub struct RequestLogger<H> {
    inner: H,
    redactor: Redactor,
}

impl<H> RequestLogger<H> {
    pub const fn new(inner: H, redactor: Redactor) -> Self {
        Self { inner, redactor }
    }
}

#[async_trait]
impl<H: Handler> Handler for RequestLogger<H> {
    async fn handle(
        &self,
        req: &mut PipelineRequest,
        res: &mut dyn ResponseWriter,
    ) -> Result<(), ServiceError> {
        req.body_mut().rewind();
        let read = req.body_mut().read_to_end().await;
        req.body_mut().rewind();

        let rendered = match &read {
            Ok(body) => self.redactor.render(body),
            Err(_) => Some(UNREADABLE_REQUEST_BODY.to_string()),
        };
        tracing::info!(
            method = %req.method(),
            path = %req.uri().path(),
            body = rendered.as_deref().unwrap_or(EMPTY_REQUEST_BODY),
            "incoming request"
        );
        read?;

        self.inner.handle(req, res).await
    }
}

pub struct ResponseLogger {
    redactor: Redactor,
}

impl ResponseLogger {
    #[must_use]
    pub const fn new(redactor: Redactor) -> Self {
        Self { redactor }
    }

    pub fn log(&self, status: StatusCode, body: &[u8]) {
        let rendered = self.redactor.render(body);
        tracing::info!(
            status = status.as_u16(),
            body = rendered.as_deref().unwrap_or(NO_RESPONSE_BODY),
            "outgoing response"
        );
    }
}
