//! Integration tests for the HTTP server, health endpoint, and graceful shutdown.

use std::net::SocketAddr;

use roster::config::model::Config;
use roster::directory::{Employee, Manager};
use roster::health::HealthResponse;
use roster::middleware::exception::ErrorPayload;
use roster::server;

fn test_config() -> Config {
    Config {
        managers: vec![Manager {
            id: 1,
            name: "Ada".into(),
        }],
        employees: vec![Employee {
            id: 1,
            name: "Grace".into(),
            age: 34,
            salary: 5200.0,
            manager_id: Some(1),
        }],
        ..Config::default()
    }
}

async fn start_test_server() -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let state = server::build_state(&test_config(), 1_048_576);
    let router = server::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

#[tokio::test]
async fn health_endpoint_returns_healthy() {
    let (addr, shutdown) = start_test_server().await;

    let url = format!("http://{addr}/health");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key("x-correlation-id"));

    let health: HealthResponse = resp.json().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.directory.employees, 1);
    assert_eq!(health.directory.managers, 1);
    assert_eq!(health.stats.requests_handled, 0);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn stats_count_handled_and_failed_requests() {
    let (addr, shutdown) = start_test_server().await;

    reqwest::get(format!("http://{addr}/api/employee")).await.unwrap();
    reqwest::get(format!("http://{addr}/api/employee/99")).await.unwrap();

    let health: HealthResponse = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.stats.requests_handled, 2);
    assert_eq!(health.stats.requests_failed, 0);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn correlation_header_round_trips_over_the_wire() {
    let (addr, shutdown) = start_test_server().await;

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/api/employee/42"))
        .header("X-Correlation-Id", "wire-7f3a")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    assert_eq!(resp.headers()["x-correlation-id"], "wire-7f3a");
    let payload: ErrorPayload = resp.json().await.unwrap();
    assert_eq!(payload.correlation_id, "wire-7f3a");
    assert_eq!(payload.message, "Employee with id 42 not found");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn unmatched_route_returns_404_without_body() {
    let (addr, shutdown) = start_test_server().await;

    let resp = reqwest::get(format!("http://{addr}/nonexistent")).await.unwrap();
    assert_eq!(resp.status(), 404);
    assert!(resp.headers().contains_key("x-correlation-id"));
    assert!(resp.bytes().await.unwrap().is_empty());

    let _ = shutdown.send(());
}

#[tokio::test]
async fn graceful_shutdown_works() {
    let (addr, shutdown) = start_test_server().await;

    // Verify server is running
    let url = format!("http://{addr}/health");
    assert!(reqwest::get(&url).await.is_ok());

    let _ = shutdown.send(());

    // Give it a moment to shut down
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let result = reqwest::get(&url).await;
    assert!(result.is_err());
}
