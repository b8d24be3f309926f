//! Business rules over the directory repositories.
//!
//! Failures are raised as [`ServiceError`] and left for the pipeline's
//! exception boundary to translate; nothing here writes a response.

use crate::error::ServiceError;

use super::repository::Directory;
use super::{Employee, EmployeeCreate, EmployeeUpdate, Manager};

#[derive(Clone)]
pub struct EmployeeService {
    directory: Directory,
}

impl EmployeeService {
    #[must_use]
    pub const fn new(directory: Directory) -> Self {
        Self { directory }
    }

    pub async fn list(&self) -> Vec<Employee> {
        tracing::info!("fetching all employees");
        let employees = self.directory.employees.all().await;
        tracing::info!(count = employees.len(), "fetched employees");
        employees
    }

    pub async fn get(&self, id: i64) -> Result<Employee, ServiceError> {
        tracing::info!(id, "fetching employee");
        let employee = self.find(id).await?;
        tracing::info!(id, "employee fetched");
        Ok(employee)
    }

    /// Create an employee. A missing payload is an argument-null failure.
    pub async fn create(&self, employee: Option<EmployeeCreate>) -> Result<Employee, ServiceError> {
        let Some(employee) = employee else {
            tracing::error!("attempted to create employee but input was null");
            return Err(ServiceError::ArgumentNull {
                param: "employee",
                message: "Employee cannot be null".into(),
            });
        };
        self.check_manager(employee.manager_id).await?;

        let created = self.directory.employees.insert(employee.into()).await?;
        tracing::info!(id = created.id, "employee created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, update: EmployeeUpdate) -> Result<Employee, ServiceError> {
        if id <= 0 {
            tracing::warn!(id, "invalid employee id for update");
            return Err(ServiceError::invalid_argument("Invalid employee id"));
        }
        let mut existing = self.find(id).await?;
        self.check_manager(update.manager_id).await?;

        existing.apply(update);
        if !self.directory.employees.update(existing.clone()).await {
            // removed concurrently between find and update
            return Err(not_found(id));
        }
        tracing::info!(id, "employee updated");
        Ok(existing)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        tracing::info!(id, "deleting employee");
        if id <= 0 {
            tracing::warn!(id, "invalid employee id for delete");
            return Err(ServiceError::invalid_argument("Invalid employee id"));
        }
        if self.directory.employees.remove(id).await.is_none() {
            tracing::warn!(id, "employee not found for delete");
            return Err(not_found(id));
        }
        tracing::info!(id, "employee deleted");
        Ok(())
    }

    async fn find(&self, id: i64) -> Result<Employee, ServiceError> {
        self.directory.employees.get(id).await.ok_or_else(|| {
            tracing::warn!(id, "employee not found");
            not_found(id)
        })
    }

    async fn check_manager(&self, manager_id: Option<i64>) -> Result<(), ServiceError> {
        match manager_id {
            Some(id) if self.directory.managers.get(id).await.is_none() => {
                tracing::warn!(manager_id = id, "unknown manager");
                Err(ServiceError::invalid_argument(format!(
                    "Manager with id {id} does not exist"
                )))
            }
            _ => Ok(()),
        }
    }
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::not_found(format!("Employee with id {id} not found"))
}

#[derive(Clone)]
pub struct ManagerService {
    directory: Directory,
}

impl ManagerService {
    #[must_use]
    pub const fn new(directory: Directory) -> Self {
        Self { directory }
    }

    pub async fn list(&self) -> Vec<Manager> {
        self.directory.managers.all().await
    }
}
