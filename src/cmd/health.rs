//! `roster health`: query a running instance's `GET /health`.
//!
//! Prints the [`HealthResponse`] summary, or the raw body with `--json`.
//! A non-2xx status or an unreachable server is an error.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::HealthArgs;
use crate::error::RosterError;
use crate::health::HealthResponse;

const TIMEOUT: Duration = Duration::from_secs(10);

pub async fn execute(args: HealthArgs) -> Result<(), RosterError> {
    let body = fetch(health_uri(&args.url)?).await?;

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    match serde_json::from_slice::<HealthResponse>(&body) {
        Ok(health) => print!("{}", health.summary(&args.url)),
        Err(e) => {
            eprintln!("Failed to parse health response: {e}");
            println!("{}", String::from_utf8_lossy(&body));
        }
    }
    Ok(())
}

fn health_uri(base: &str) -> Result<hyper::Uri, RosterError> {
    format!("{}/health", base.trim_end_matches('/'))
        .parse()
        .map_err(|e: hyper::http::uri::InvalidUri| RosterError::UriParse {
            source: Box::new(e),
        })
}

fn request_failed(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> RosterError {
    RosterError::HttpRequest {
        source: source.into(),
    }
}

async fn fetch(uri: hyper::Uri) -> Result<Bytes, RosterError> {
    let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
    let req = hyper::Request::get(uri)
        .body(Empty::<Bytes>::new())
        .map_err(request_failed)?;

    let response = tokio::time::timeout(TIMEOUT, client.request(req))
        .await
        .map_err(|_| request_failed(format!("health check timed out after {}s", TIMEOUT.as_secs())))?
        .map_err(request_failed)?;

    let status = response.status();
    if !status.is_success() {
        return Err(RosterError::HealthCheckFailed(status));
    }
    Ok(response
        .into_body()
        .collect()
        .await
        .map_err(request_failed)?
        .to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_path_is_appended_once() {
        assert_eq!(
            health_uri("http://localhost:3000/").unwrap().path(),
            "/health"
        );
        assert_eq!(health_uri("http://10.0.0.5:8080").unwrap().to_string(), "http://10.0.0.5:8080/health");
    }

    #[test]
    fn malformed_url_is_a_uri_error() {
        assert!(matches!(
            health_uri("http://exa mple"),
            Err(RosterError::UriParse { .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_instance_is_a_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetch(health_uri(&format!("http://{addr}")).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::HttpRequest { .. }));
    }
}
