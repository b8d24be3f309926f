//! Terminal failure boundary for the pipeline.
//!
//! [`ExceptionTranslator`] runs everything below it and never fails itself.
//! Any [`ServiceError`] or panic that escapes is logged at error level under
//! the request's correlation span, classified into an [`ErrorKind`], and
//! written to the real writer as an [`ErrorPayload`]:
//!
//! | Failure | Status | Message |
//! |---------|--------|---------|
//! | `NotFound` | 404 | failure message |
//! | `InvalidArgument`, `ArgumentNull` | 400 | failure message |
//! | anything else, panics | 500 | [`GENERIC_ERROR_MESSAGE`] |

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};

use super::correlation::{self, CorrelationId};
use super::writer::ResponseWriter;
use super::{Handler, PipelineRequest};
use crate::error::ServiceError;

pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub correlation_id: String,
    pub status_code: u16,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Unclassified,
}

impl ErrorKind {
    #[must_use]
    pub fn classify(err: &ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => Self::NotFound,
            ServiceError::InvalidArgument(_) | ServiceError::ArgumentNull { .. } => {
                Self::InvalidArgument
            }
            ServiceError::Io(_) | ServiceError::Internal(_) => Self::Unclassified,
        }
    }

    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The client-facing message. Unclassified failures never expose their detail.
    #[must_use]
    pub fn message(self, detail: &str) -> String {
        match self {
            Self::NotFound | Self::InvalidArgument => detail.to_string(),
            Self::Unclassified => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// What escaped the downstream chain.
enum Failure {
    Error(ServiceError),
    Panic(String),
}

impl Failure {
    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panic(detail)
    }

    fn kind(&self) -> ErrorKind {
        match self {
            Self::Error(err) => ErrorKind::classify(err),
            Self::Panic(_) => ErrorKind::Unclassified,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Error(err) => err.to_string(),
            Self::Panic(detail) => format!("panic: {detail}"),
        }
    }
}

pub struct ExceptionTranslator<H> {
    inner: H,
}

impl<H> ExceptionTranslator<H> {
    pub const fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H: Handler> ExceptionTranslator<H> {
    /// Run the chain. Infallible: every failure becomes an error response.
    pub async fn run(&self, req: &mut PipelineRequest, res: &mut dyn ResponseWriter) {
        let outcome = AssertUnwindSafe(self.inner.handle(req, &mut *res))
            .catch_unwind()
            .await;

        let failure = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => Failure::Error(err),
            Err(panic) => Failure::from_panic(&*panic),
        };

        let id = correlation::resolve(req);
        translate(&id, &failure, res);
    }
}

fn translate(id: &CorrelationId, failure: &Failure, res: &mut dyn ResponseWriter) {
    let span = correlation::request_span(id);
    let _entered = span.enter();

    let kind = failure.kind();
    let detail = failure.detail();
    match failure {
        Failure::Error(ServiceError::Internal(source)) => tracing::error!(
            error = %detail,
            source = ?source,
            "unhandled exception while executing the request"
        ),
        _ => tracing::error!(
            error = %detail,
            "unhandled exception while executing the request"
        ),
    }

    let payload = ErrorPayload {
        correlation_id: id.to_string(),
        status_code: kind.status().as_u16(),
        message: kind.message(&detail),
    };

    if res.has_started() {
        tracing::warn!(
            status = payload.status_code,
            "response already started, error payload appended to partial body"
        );
    }

    correlation::stamp(res, id);
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    res.set_status(kind.status());

    let body = match serde_json::to_vec(&payload) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize error payload");
            return;
        }
    };
    if let Err(e) = res.write(&body) {
        tracing::error!(error = %e, "failed to write error payload");
    }
}
