//! Response body capture around the downstream chain.
//!
//! [`ResponseCapture`] hands the inner handler a [`BufferingWriter`] in place
//! of the real writer, so the body can be logged before it is released.
//!
//! On success the buffer goes to the [`ResponseLogger`] and is then copied
//! to the real writer in one piece. On failure the buffer is dropped, which
//! returns the real writer to the caller before the error travels further
//! up; only if the real writer has already started is the buffered output
//! copied, since the client is already seeing a partial response. Panics get
//! the same treatment and are then resumed.

use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures_util::FutureExt;

use super::logging::ResponseLogger;
use super::writer::{BufferingWriter, ResponseWriter};
use super::{Handler, PipelineRequest};
use crate::error::ServiceError;

pub struct ResponseCapture<H> {
    inner: H,
    logger: ResponseLogger,
}

impl<H> ResponseCapture<H> {
    pub const fn new(inner: H, logger: ResponseLogger) -> Self {
        Self { inner, logger }
    }
}

#[async_trait]
impl<H: Handler> Handler for ResponseCapture<H> {
    async fn handle(
        &self,
        req: &mut PipelineRequest,
        res: &mut dyn ResponseWriter,
    ) -> Result<(), ServiceError> {
        let mut buffer = BufferingWriter::new(res);
        let outcome = AssertUnwindSafe(self.inner.handle(req, &mut buffer))
            .catch_unwind()
            .await;
        let (real, captured) = buffer.into_parts();

        match outcome {
            Ok(Ok(())) => {
                self.logger.log(real.status(), &captured);
                // The write commits the head, so a failed flush leaves it open
                // for the error response.
                real.write(&captured)?;
                Ok(())
            }
            Ok(Err(err)) => {
                release_on_failure(real, &captured);
                Err(err)
            }
            Err(panic) => {
                release_on_failure(real, &captured);
                std::panic::resume_unwind(panic)
            }
        }
    }
}

fn release_on_failure(real: &mut dyn ResponseWriter, captured: &[u8]) {
    if !real.has_started() {
        tracing::debug!(
            discarded_bytes = captured.len(),
            "downstream failed, captured body discarded"
        );
        return;
    }
    tracing::warn!(
        bytes = captured.len(),
        "downstream failed after the response started, flushing captured body"
    );
    if let Err(e) = real.write(captured) {
        tracing::warn!(error = %e, "failed to flush captured body");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::body::RequestBody;
    use crate::middleware::exception::{ErrorPayload, ExceptionTranslator, GENERIC_ERROR_MESSAGE};
    use crate::middleware::logging::Redactor;
    use crate::middleware::writer::OutboundResponse;
    use axum::http::StatusCode;

    enum Behaviour {
        Succeed,
        Fail,
        StartThenFail,
        Panic,
    }

    struct Scripted(Behaviour);

    #[async_trait]
    impl Handler for Scripted {
        async fn handle(
            &self,
            _req: &mut PipelineRequest,
            res: &mut dyn ResponseWriter,
        ) -> Result<(), ServiceError> {
            res.set_status(StatusCode::CREATED);
            res.write(b"partial")?;
            match self.0 {
                Behaviour::Succeed => Ok(()),
                Behaviour::Fail => Err(ServiceError::internal("boom")),
                Behaviour::StartThenFail => {
                    res.start();
                    Err(ServiceError::internal("boom"))
                }
                Behaviour::Panic => panic!("handler exploded"),
            }
        }
    }

    fn capture(behaviour: Behaviour) -> ResponseCapture<Scripted> {
        ResponseCapture::new(Scripted(behaviour), ResponseLogger::new(Redactor::default()))
    }

    fn request() -> PipelineRequest {
        http::Request::builder()
            .uri("/")
            .body(RequestBody::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn success_copies_buffer_to_real_writer() {
        let mut out = OutboundResponse::new();
        capture(Behaviour::Succeed)
            .handle(&mut request(), &mut out)
            .await
            .unwrap();
        assert!(out.has_started());
        assert_eq!(out.status(), StatusCode::CREATED);
        assert_eq!(out.body(), b"partial");
    }

    #[tokio::test]
    async fn failure_discards_buffer_and_leaves_real_writer_untouched() {
        let mut out = OutboundResponse::new();
        let err = capture(Behaviour::Fail)
            .handle(&mut request(), &mut out)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(!out.has_started());
        assert!(out.body().is_empty());
    }

    #[tokio::test]
    async fn failure_after_start_flushes_buffer() {
        let mut out = OutboundResponse::new();
        let result = capture(Behaviour::StartThenFail)
            .handle(&mut request(), &mut out)
            .await;
        assert!(result.is_err());
        assert_eq!(out.body(), b"partial");
    }

    /// Fails its first body write without committing anything.
    struct RefusesFirstWrite {
        inner: OutboundResponse,
        refused: bool,
    }

    impl ResponseWriter for RefusesFirstWrite {
        fn status(&self) -> StatusCode {
            self.inner.status()
        }

        fn set_status(&mut self, status: StatusCode) {
            self.inner.set_status(status);
        }

        fn headers(&self) -> &axum::http::HeaderMap {
            self.inner.headers()
        }

        fn headers_mut(&mut self) -> &mut axum::http::HeaderMap {
            self.inner.headers_mut()
        }

        fn write(&mut self, chunk: &[u8]) -> std::io::Result<()> {
            if !self.refused {
                self.refused = true;
                return Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "client stream closed",
                ));
            }
            self.inner.write(chunk)
        }

        fn start(&mut self) {
            self.inner.start();
        }

        fn has_started(&self) -> bool {
            self.inner.has_started()
        }
    }

    #[tokio::test]
    async fn failed_flush_reaches_translator_with_head_uncommitted() {
        let translator = ExceptionTranslator::new(capture(Behaviour::Succeed));
        let mut req = http::Request::builder()
            .uri("/")
            .header("x-correlation-id", "flush-1")
            .body(RequestBody::empty())
            .unwrap();
        let mut out = RefusesFirstWrite {
            inner: OutboundResponse::new(),
            refused: false,
        };

        translator.run(&mut req, &mut out).await;

        let response = out.inner.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let payload: ErrorPayload = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.status_code, 500);
        assert_eq!(payload.message, GENERIC_ERROR_MESSAGE);
        assert_eq!(payload.correlation_id, "flush-1");
    }

    #[tokio::test]
    async fn panic_is_resumed_with_real_writer_released() {
        let mut out = OutboundResponse::new();
        let stage = capture(Behaviour::Panic);
        let caught = AssertUnwindSafe(stage.handle(&mut request(), &mut out))
            .catch_unwind()
            .await;
        assert!(caught.is_err());
        assert!(out.body().is_empty());
        assert!(!out.has_started());
    }
}
