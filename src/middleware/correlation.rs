//! Correlation id resolution and propagation.
//!
//! Every request gets exactly one [`CorrelationId`]. It is reused from the
//! inbound `X-Correlation-Id` header when present so traces can span
//! services, and generated (UUID v4) otherwise. [`resolve`] stores it in the
//! request extensions, which makes any later call return the same value.
//!
//! [`CorrelationStage`] sets the response header and runs the rest of the
//! chain inside a `request` span carrying the id, so every log line emitted
//! while serving the request (pipeline, controllers, services) is tagged
//! without passing the id around.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use bytes::Bytes;
use tracing::Instrument;

use super::writer::ResponseWriter;
use super::{Handler, PipelineRequest};
use crate::error::ServiceError;

pub static CORRELATION_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

/// The raw header bytes, echoed unchanged, plus a lossy UTF-8 rendering
/// for logs and payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId {
    raw: Bytes,
    text: Arc<str>,
}

impl CorrelationId {
    #[must_use]
    pub fn generate() -> Self {
        let text = uuid::Uuid::new_v4().to_string();
        Self {
            raw: Bytes::from(text.clone()),
            text: text.into(),
        }
    }

    /// Reuse the inbound header value verbatim. An empty value counts as absent.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(&CORRELATION_HEADER)?;
        let raw = value.as_bytes();
        if raw.is_empty() {
            return None;
        }
        Some(Self {
            raw: Bytes::copy_from_slice(raw),
            text: String::from_utf8_lossy(raw).into(),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    #[must_use]
    pub fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_maybe_shared(self.raw.clone()).ok()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Return the request's correlation id, creating and storing it on first use.
pub fn resolve(req: &mut PipelineRequest) -> CorrelationId {
    if let Some(id) = req.extensions().get::<CorrelationId>() {
        return id.clone();
    }
    let id = CorrelationId::from_headers(req.headers()).unwrap_or_else(CorrelationId::generate);
    req.extensions_mut().insert(id.clone());
    id
}

/// Write the id to the outgoing `X-Correlation-Id` header.
pub fn stamp(res: &mut dyn ResponseWriter, id: &CorrelationId) {
    if let Some(value) = id.header_value() {
        res.headers_mut().insert(CORRELATION_HEADER.clone(), value);
    }
}

/// The logging scope for one request.
#[must_use]
pub fn request_span(id: &CorrelationId) -> tracing::Span {
    tracing::info_span!(parent: None, "request", correlation_id = %id)
}

pub struct CorrelationStage<H> {
    inner: H,
}

impl<H> CorrelationStage<H> {
    pub const fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<H: Handler> Handler for CorrelationStage<H> {
    async fn handle(
        &self,
        req: &mut PipelineRequest,
        res: &mut dyn ResponseWriter,
    ) -> Result<(), ServiceError> {
        let id = resolve(req);
        stamp(res, &id);
        self.inner.handle(req, res).instrument(request_span(&id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::body::RequestBody;
    use crate::middleware::writer::OutboundResponse;

    fn request(header: Option<&str>) -> PipelineRequest {
        let mut builder = http::Request::builder().uri("/api/employee");
        if let Some(value) = header {
            builder = builder.header("x-correlation-id", value);
        }
        builder.body(RequestBody::empty()).unwrap()
    }

    struct Echo;

    #[async_trait]
    impl Handler for Echo {
        async fn handle(
            &self,
            req: &mut PipelineRequest,
            res: &mut dyn ResponseWriter,
        ) -> Result<(), ServiceError> {
            let id = req.extensions().get::<CorrelationId>().cloned();
            let text = id.map(|id| id.to_string()).unwrap_or_default();
            res.write(text.as_bytes())?;
            Ok(())
        }
    }

    #[test]
    fn inbound_header_is_reused_verbatim() {
        let mut req = request(Some("trace-abc-123"));
        assert_eq!(resolve(&mut req).as_str(), "trace-abc-123");
    }

    #[test]
    fn missing_header_generates_uuid() {
        let mut req = request(None);
        let id = resolve(&mut req);
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn empty_header_counts_as_absent() {
        let mut req = request(Some(""));
        let id = resolve(&mut req);
        assert_eq!(id.as_str().len(), 36);
    }

    #[test]
    fn non_ascii_header_is_reused_byte_for_byte() {
        let mut req = http::Request::builder()
            .uri("/api/employee")
            .header("x-correlation-id", HeaderValue::from_bytes(b"trace-\xC3\xA9").unwrap())
            .body(RequestBody::empty())
            .unwrap();
        let id = resolve(&mut req);
        assert_eq!(id.as_bytes(), b"trace-\xC3\xA9");
        assert_eq!(id.as_str(), "trace-\u{e9}");

        let mut out = OutboundResponse::new();
        stamp(&mut out, &id);
        assert_eq!(out.headers()["x-correlation-id"].as_bytes(), b"trace-\xC3\xA9");
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let mut req = request(None);
        let first = resolve(&mut req);
        let second = resolve(&mut req);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn stage_stamps_header_and_exposes_id_downstream() {
        let stage = CorrelationStage::new(Echo);
        let mut req = request(Some("from-upstream"));
        let mut out = OutboundResponse::new();
        stage.handle(&mut req, &mut out).await.unwrap();

        assert_eq!(out.headers()["x-correlation-id"], "from-upstream");
        assert_eq!(out.body(), b"from-upstream");
    }
}
