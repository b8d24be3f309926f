//! Diagnostic request pipeline.
//!
//! Every request handled by the server runs through the same chain of
//! stages, outermost first:
//!
//! ```text
//! ExceptionTranslator -> CorrelationStage -> RequestLogger -> ResponseCapture -> application
//! ```
//!
//! - [`exception`] -- terminal failure boundary, writes the JSON error contract.
//! - [`correlation`] -- resolves the `X-Correlation-Id` and the request span.
//! - [`logging`] -- request/response log entries and body redaction.
//! - [`capture`] -- buffers the response body so it can be logged.
//! - [`writer`] -- the [`ResponseWriter`] surface stages and handlers write to.
//! - [`body`] -- the rewindable [`RequestBody`].
//!
//! Stages are plain structs wrapping an inner [`Handler`], so any subset can
//! be composed by hand; [`Pipeline`] assembles the full chain and adapts it
//! to axum.

pub mod body;
pub mod capture;
pub mod correlation;
pub mod exception;
pub mod logging;
pub mod writer;

use async_trait::async_trait;
use axum::extract::Request;
use axum::response::Response;

use crate::error::ServiceError;
use body::RequestBody;
use capture::ResponseCapture;
use correlation::CorrelationStage;
use exception::ExceptionTranslator;
use logging::{Redactor, RequestLogger, ResponseLogger};
use writer::{OutboundResponse, ResponseWriter};

pub type PipelineRequest = http::Request<RequestBody>;

// async_trait keeps Handler object-safe; ResponseWriter is passed as a trait object.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(
        &self,
        req: &mut PipelineRequest,
        res: &mut dyn ResponseWriter,
    ) -> Result<(), ServiceError>;
}

pub type DiagnosticChain<H> =
    ExceptionTranslator<CorrelationStage<RequestLogger<ResponseCapture<H>>>>;

pub struct Pipeline<H> {
    chain: DiagnosticChain<H>,
    max_body: usize,
}

impl<H: Handler> Pipeline<H> {
    pub fn new(app: H, redactor: Redactor, max_body: usize) -> Self {
        let capture = ResponseCapture::new(app, ResponseLogger::new(redactor.clone()));
        let chain = ExceptionTranslator::new(CorrelationStage::new(RequestLogger::new(
            capture, redactor,
        )));
        Self { chain, max_body }
    }

    /// Serve one axum request through the full chain.
    pub async fn serve(&self, request: Request) -> Response {
        let (parts, body) = request.into_parts();
        let mut req = http::Request::from_parts(parts, RequestBody::new(body, self.max_body));
        let mut out = OutboundResponse::new();
        self.chain.run(&mut req, &mut out).await;
        out.into_response()
    }
}
