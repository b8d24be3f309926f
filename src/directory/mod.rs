//! Employee/manager directory: models, storage, and business rules.
//!
//! This is the application layer the pipeline wraps. [`repository`] holds
//! the generic in-memory store; [`service`] enforces the rules that raise
//! the `NotFound` and argument failures the pipeline translates.

pub mod repository;
pub mod service;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Employee {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub age: i32,
    #[serde(default)]
    pub salary: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Manager {
    #[serde(default)]
    pub id: i64,
    pub name: String,
}

/// Outbound employee representation. Salary is never exposed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub manager_id: Option<i64>,
}

impl From<&Employee> for EmployeeDto {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name.clone(),
            age: employee.age,
            manager_id: employee.manager_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCreate {
    pub name: String,
    pub age: i32,
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub manager_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    pub name: String,
    pub age: i32,
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub manager_id: Option<i64>,
}

impl From<EmployeeCreate> for Employee {
    fn from(create: EmployeeCreate) -> Self {
        Self {
            id: 0,
            name: create.name,
            age: create.age,
            salary: create.salary,
            manager_id: create.manager_id,
        }
    }
}

impl Employee {
    pub fn apply(&mut self, update: EmployeeUpdate) {
        self.name = update.name;
        self.age = update.age;
        self.salary = update.salary;
        self.manager_id = update.manager_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dto_hides_salary() {
        let employee = Employee {
            id: 3,
            name: "Grace".into(),
            age: 41,
            salary: 9000.0,
            manager_id: Some(1),
        };
        let json = serde_json::to_value(EmployeeDto::from(&employee)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 3, "name": "Grace", "age": 41, "managerId": 1})
        );
    }

    #[test]
    fn create_payload_is_camel_case() {
        let create: EmployeeCreate =
            serde_json::from_str(r#"{"name":"Ada","age":36,"managerId":2}"#).unwrap();
        let employee = Employee::from(create);
        assert_eq!(employee.manager_id, Some(2));
        assert_eq!(employee.id, 0);
    }
}
