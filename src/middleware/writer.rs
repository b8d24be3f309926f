//! Response-writing surface shared by every pipeline stage.
//!
//! Handlers never build an `axum::response::Response` themselves. They
//! receive a `&mut dyn ResponseWriter` and set status, headers and body
//! through it. The pipeline decides which implementation they get:
//!
//! - [`OutboundResponse`] is the real output channel. Its first body write
//!   (or an explicit [`start`](ResponseWriter::start)) commits status and
//!   headers, after which they can no longer change.
//! - [`BufferingWriter`] borrows another writer, passes status and headers
//!   through, and keeps body bytes in memory until the owner decides to
//!   flush or discard them.

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use bytes::{Bytes, BytesMut};

pub trait ResponseWriter: Send {
    fn status(&self) -> StatusCode;

    fn set_status(&mut self, status: StatusCode);

    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Append bytes to the response body.
    fn write(&mut self, chunk: &[u8]) -> std::io::Result<()>;

    /// Commit status and headers. Idempotent.
    fn start(&mut self);

    fn has_started(&self) -> bool;
}

/// The real outbound channel for one request.
#[derive(Debug)]
pub struct OutboundResponse {
    status: StatusCode,
    headers: HeaderMap,
    committed: Option<(StatusCode, HeaderMap)>,
    body: BytesMut,
}

impl Default for OutboundResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl OutboundResponse {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            committed: None,
            body: BytesMut::new(),
        }
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Status and headers as the client sees them: the committed snapshot
    /// once the response has started, the pending values otherwise.
    #[must_use]
    pub fn head(&self) -> (StatusCode, &HeaderMap) {
        match &self.committed {
            Some((status, headers)) => (*status, headers),
            None => (self.status, &self.headers),
        }
    }

    #[must_use]
    pub fn into_response(self) -> Response {
        let (status, headers) = self
            .committed
            .unwrap_or((self.status, self.headers));
        let mut response = Response::new(Body::from(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl ResponseWriter for OutboundResponse {
    fn status(&self) -> StatusCode {
        self.head().0
    }

    fn set_status(&mut self, status: StatusCode) {
        if self.committed.is_some() {
            tracing::debug!(%status, "status change ignored, response already started");
        }
        self.status = status;
    }

    fn headers(&self) -> &HeaderMap {
        self.head().1
    }

    // Mutations after start land in the pending map and never reach the client.
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.start();
        self.body.extend_from_slice(chunk);
        Ok(())
    }

    fn start(&mut self) {
        if self.committed.is_none() {
            self.committed = Some((self.status, self.headers.clone()));
        }
    }

    fn has_started(&self) -> bool {
        self.committed.is_some()
    }
}

/// In-memory substitute for another writer's body.
pub struct BufferingWriter<'a> {
    inner: &'a mut dyn ResponseWriter,
    buffer: BytesMut,
}

impl<'a> BufferingWriter<'a> {
    pub fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self {
            inner,
            buffer: BytesMut::new(),
        }
    }

    #[must_use]
    pub fn captured(&self) -> &[u8] {
        &self.buffer
    }

    /// Give back the wrapped writer together with everything buffered so far.
    pub fn into_parts(self) -> (&'a mut dyn ResponseWriter, Bytes) {
        (self.inner, self.buffer.freeze())
    }
}

impl ResponseWriter for BufferingWriter<'_> {
    fn status(&self) -> StatusCode {
        self.inner.status()
    }

    fn set_status(&mut self, status: StatusCode) {
        self.inner.set_status(status);
    }

    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    fn start(&mut self) {
        self.inner.start();
    }

    fn has_started(&self) -> bool {
        self.inner.has_started()
    }
}
