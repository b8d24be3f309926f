//! Rewindable request body.
//!
//! The inbound body arrives as a stream that can only be consumed once.
//! [`RequestBody`] buffers it on first read (bounded by a byte limit) and
//! keeps a read position, so a logging stage can read the whole payload,
//! [`rewind`](RequestBody::rewind), and leave it intact for the handler.

use axum::body::Body;
use bytes::Bytes;
use http_body_util::LengthLimitError;

use crate::error::ServiceError;

enum Source {
    Pending(Body),
    Buffered(Bytes),
}

pub struct RequestBody {
    source: Source,
    position: usize,
    limit: usize,
}

impl RequestBody {
    #[must_use]
    pub fn new(body: Body, limit: usize) -> Self {
        Self {
            source: Source::Pending(body),
            position: 0,
            limit,
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let limit = bytes.len();
        Self {
            source: Source::Buffered(bytes),
            position: 0,
            limit,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// Pull the whole stream into memory. Later calls are no-ops.
    pub async fn buffer(&mut self) -> Result<Bytes, ServiceError> {
        let limit = self.limit;
        let bytes = match &mut self.source {
            Source::Buffered(bytes) => return Ok(bytes.clone()),
            Source::Pending(body) => {
                let body = std::mem::take(body);
                axum::body::to_bytes(body, limit)
                    .await
                    .map_err(|e| read_error(e, limit))?
            }
        };
        self.source = Source::Buffered(bytes.clone());
        Ok(bytes)
    }

    /// Read from the current position to the end, advancing the position.
    pub async fn read_to_end(&mut self) -> Result<Bytes, ServiceError> {
        let position = self.position;
        let bytes = self.buffer().await?;
        let rest = bytes.slice(position.min(bytes.len())..);
        self.position = bytes.len();
        Ok(rest)
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }
}

/// Only an exceeded limit is the client's fault; any other stream error
/// (a disconnect mid-body, a transport fault) is unclassified.
fn read_error(err: axum::Error, limit: usize) -> ServiceError {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return ServiceError::invalid_argument(format!(
                "request body exceeds the limit of {limit} bytes"
            ));
        }
        source = e.source();
    }
    ServiceError::internal(err)
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.source {
            Source::Pending(_) => "pending",
            Source::Buffered(_) => "buffered",
        };
        f.debug_struct("RequestBody")
            .field("state", &state)
            .field("position", &self.position)
            .field("limit", &self.limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rewind_makes_body_readable_again() {
        let mut body = RequestBody::new(Body::from("{\"name\":\"Ada\"}"), 1024);
        let first = body.read_to_end().await.unwrap();
        assert_eq!(body.read_to_end().await.unwrap(), Bytes::new());

        body.rewind();
        let second = body.read_to_end().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(&second[..], b"{\"name\":\"Ada\"}");
    }

    #[tokio::test]
    async fn oversized_body_is_an_invalid_argument() {
        let mut body = RequestBody::new(Body::from(vec![b'x'; 64]), 16);
        let err = body.read_to_end().await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "request body exceeds the limit of 16 bytes");
    }

    #[tokio::test]
    async fn broken_stream_is_unclassified() {
        let stream = futures_util::stream::iter(vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"{\"name\":")),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "client went away",
            )),
        ]);
        let mut body = RequestBody::new(Body::from_stream(stream), 1024);
        let err = body.read_to_end().await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)), "{err:?}");
    }

    #[tokio::test]
    async fn empty_body_reads_as_empty() {
        let mut body = RequestBody::empty();
        assert!(body.read_to_end().await.unwrap().is_empty());
        assert_eq!(body.position(), 0);
    }
}
