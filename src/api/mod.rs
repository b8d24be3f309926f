//! The directory HTTP API, served as the innermost pipeline [`Handler`].
//!
//! [`Api`] matches the request against [`routing::ROUTES`] and dispatches
//! to the controller functions in [`employees`] and [`managers`].
//! Controllers report failures as [`ServiceError`]; an unmatched route is a
//! plain 404 with no body.

pub mod employees;
pub mod managers;
pub mod routing;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::directory::repository::Directory;
use crate::directory::service::{EmployeeService, ManagerService};
use crate::error::ServiceError;
use crate::health::{self, Stats};
use crate::middleware::writer::ResponseWriter;
use crate::middleware::{Handler, PipelineRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    ListEmployees,
    GetEmployee,
    CreateEmployee,
    UpdateEmployee,
    DeleteEmployee,
    ListManagers,
}

pub struct Api {
    employees: EmployeeService,
    managers: ManagerService,
    directory: Directory,
    stats: Arc<Stats>,
}

impl Api {
    #[must_use]
    pub fn new(directory: Directory, stats: Arc<Stats>) -> Self {
        Self {
            employees: EmployeeService::new(directory.clone()),
            managers: ManagerService::new(directory.clone()),
            directory,
            stats,
        }
    }
}

#[async_trait]
impl Handler for Api {
    async fn handle(
        &self,
        req: &mut PipelineRequest,
        res: &mut dyn ResponseWriter,
    ) -> Result<(), ServiceError> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let Some((route, params)) = routing::match_route(routing::ROUTES, &path, method.as_str())
        else {
            tracing::warn!(%method, %path, "no route matched");
            res.set_status(StatusCode::NOT_FOUND);
            return Ok(());
        };

        match route.endpoint {
            Endpoint::Health => {
                let report = health::report(&self.directory, &self.stats).await;
                write_json(res, StatusCode::OK, &report)
            }
            Endpoint::ListEmployees => employees::list(&self.employees, res).await,
            Endpoint::GetEmployee => {
                employees::get(&self.employees, path_id(&params)?, res).await
            }
            Endpoint::CreateEmployee => employees::create(&self.employees, req, res).await,
            Endpoint::UpdateEmployee => {
                employees::update(&self.employees, path_id(&params)?, req, res).await
            }
            Endpoint::DeleteEmployee => {
                employees::delete(&self.employees, path_id(&params)?, res).await
            }
            Endpoint::ListManagers => managers::list(&self.managers, res).await,
        }
    }
}

fn path_id(params: &HashMap<String, String>) -> Result<i64, ServiceError> {
    let raw = params.get("id").map_or("", String::as_str);
    raw.parse()
        .map_err(|_| ServiceError::invalid_argument(format!("Invalid id '{raw}'")))
}

/// Serialize `value` as the response body with a JSON content type.
pub fn write_json<T: Serialize + ?Sized>(
    res: &mut dyn ResponseWriter,
    status: StatusCode,
    value: &T,
) -> Result<(), ServiceError> {
    let body = serde_json::to_vec(value).map_err(ServiceError::internal)?;
    res.set_status(status);
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    res.write(&body)?;
    Ok(())
}

/// Read the request body as JSON. A blank body or a JSON `null` is `None`.
pub async fn read_json<T: DeserializeOwned>(
    req: &mut PipelineRequest,
) -> Result<Option<T>, ServiceError> {
    let body = req.body_mut().read_to_end().await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<Option<T>>(&body)
        .map_err(|e| ServiceError::invalid_argument(format!("invalid request body: {e}")))
}
