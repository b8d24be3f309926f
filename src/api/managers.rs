//! `/api/manager` controller.

use axum::http::StatusCode;

use super::write_json;
use crate::directory::service::ManagerService;
use crate::error::ServiceError;
use crate::middleware::writer::ResponseWriter;

pub async fn list(
    service: &ManagerService,
    res: &mut dyn ResponseWriter,
) -> Result<(), ServiceError> {
    let managers = service.list().await;
    write_json(res, StatusCode::OK, &managers)
}
