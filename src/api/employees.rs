//! `/api/employee` controller.

use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};

use super::{read_json, write_json};
use crate::directory::service::EmployeeService;
use crate::directory::{EmployeeCreate, EmployeeDto, EmployeeUpdate};
use crate::error::ServiceError;
use crate::middleware::writer::ResponseWriter;
use crate::middleware::PipelineRequest;

fn require_positive(id: i64) -> Result<(), ServiceError> {
    if id <= 0 {
        tracing::error!(id, "invalid id supplied");
        return Err(ServiceError::invalid_argument("Id must be greater than 0"));
    }
    Ok(())
}

pub async fn list(
    service: &EmployeeService,
    res: &mut dyn ResponseWriter,
) -> Result<(), ServiceError> {
    let employees: Vec<EmployeeDto> = service.list().await.iter().map(EmployeeDto::from).collect();
    write_json(res, StatusCode::OK, &employees)
}

pub async fn get(
    service: &EmployeeService,
    id: i64,
    res: &mut dyn ResponseWriter,
) -> Result<(), ServiceError> {
    tracing::info!(id, "getting employee");
    require_positive(id)?;
    let employee = service.get(id).await?;
    write_json(res, StatusCode::OK, &EmployeeDto::from(&employee))
}

pub async fn create(
    service: &EmployeeService,
    req: &mut PipelineRequest,
    res: &mut dyn ResponseWriter,
) -> Result<(), ServiceError> {
    let payload = read_json::<EmployeeCreate>(req).await?;
    let created = service.create(payload).await?;

    let location = HeaderValue::from_str(&format!("/api/employee/{}", created.id))
        .map_err(ServiceError::internal)?;
    res.headers_mut().insert(LOCATION, location);
    write_json(res, StatusCode::CREATED, &EmployeeDto::from(&created))
}

pub async fn update(
    service: &EmployeeService,
    id: i64,
    req: &mut PipelineRequest,
    res: &mut dyn ResponseWriter,
) -> Result<(), ServiceError> {
    require_positive(id)?;
    let Some(payload) = read_json::<EmployeeUpdate>(req).await? else {
        return Err(ServiceError::ArgumentNull {
            param: "employee",
            message: "Employee cannot be null".into(),
        });
    };
    let updated = service.update(id, payload).await?;
    write_json(res, StatusCode::OK, &EmployeeDto::from(&updated))
}

pub async fn delete(
    service: &EmployeeService,
    id: i64,
    res: &mut dyn ResponseWriter,
) -> Result<(), ServiceError> {
    require_positive(id)?;
    service.delete(id).await?;
    res.set_status(StatusCode::NO_CONTENT);
    Ok(())
}
