//! Configuration validation with detailed error reporting.
//!
//! [`validate`] checks a parsed [`Config`] for duplicate or out-of-range
//! ids, empty names, implausible ages and salaries, employees pointing at
//! unknown managers, and blank redact field names. All problems are
//! returned at once as [`ValidationError`] values with suggestions where a
//! fix is obvious.

use std::collections::HashSet;

use super::model::Config;
use crate::error::ValidationError;

/// Largest id accepted for a seeded row.
pub const MAX_SEED_ID: i64 = i64::MAX - 1;

fn error(location: String, field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        location,
        field: field.into(),
        message: message.into(),
        suggestion: None,
    }
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (i, field) in config.diagnostics.redact_fields.iter().enumerate() {
        if field.trim().is_empty() {
            errors.push(error(
                format!("diagnostics.redact_fields[{i}]"),
                "redact_fields",
                "field name cannot be empty",
            ));
        }
    }

    let mut manager_ids = HashSet::new();
    for (i, manager) in config.managers.iter().enumerate() {
        let location = format!("managers[{i}]");
        if manager.id <= 0 {
            errors.push(error(location.clone(), "id", "id must be greater than 0"));
        } else if manager.id > MAX_SEED_ID {
            errors.push(error(
                location.clone(),
                "id",
                format!("id must be at most {MAX_SEED_ID}"),
            ));
        } else if !manager_ids.insert(manager.id) {
            errors.push(error(
                location.clone(),
                "id",
                format!("duplicate manager id {}", manager.id),
            ));
        }
        if manager.name.trim().is_empty() {
            errors.push(error(location, "name", "name cannot be empty"));
        }
    }

    let mut employee_ids = HashSet::new();
    for (i, employee) in config.employees.iter().enumerate() {
        let location = format!("employees[{i}]");
        if employee.id <= 0 {
            errors.push(error(location.clone(), "id", "id must be greater than 0"));
        } else if employee.id > MAX_SEED_ID {
            errors.push(error(
                location.clone(),
                "id",
                format!("id must be at most {MAX_SEED_ID}"),
            ));
        } else if !employee_ids.insert(employee.id) {
            errors.push(error(
                location.clone(),
                "id",
                format!("duplicate employee id {}", employee.id),
            ));
        }
        if employee.name.trim().is_empty() {
            errors.push(error(location.clone(), "name", "name cannot be empty"));
        }
        if employee.age <= 0 {
            errors.push(error(location.clone(), "age", "age must be greater than 0"));
        }
        if employee.salary < 0.0 {
            errors.push(error(location.clone(), "salary", "salary cannot be negative"));
        }
        if let Some(manager_id) = employee.manager_id {
            if !manager_ids.contains(&manager_id) {
                errors.push(ValidationError {
                    location,
                    field: "manager_id".into(),
                    message: format!("unknown manager {manager_id}"),
                    suggestion: Some(format!("define manager {manager_id} under `managers`")),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let mut lines = vec![format!(
        "  {} managers, {} employees\n",
        config.managers.len(),
        config.employees.len()
    )];

    for manager in &config.managers {
        let reports = config
            .employees
            .iter()
            .filter(|e| e.manager_id == Some(manager.id))
            .count();
        lines.push(format!(
            "  #{} {}  -> {} direct reports",
            manager.id, manager.name, reports
        ));
    }
    lines.push(format!(
        "    redacted in logs: {}",
        config.diagnostics.redact_fields.join(", ")
    ));

    format!("{} is valid\n{}", path, lines.join("\n"))
}
