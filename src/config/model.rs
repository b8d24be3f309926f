//! Serde data structures for the Roster configuration file.
//!
//! [`Config`] is the root: [`Diagnostics`] settings for the pipeline plus
//! the manager and employee seed data. Every struct uses
//! `deny_unknown_fields` for strict parsing.

use serde::{Deserialize, Serialize};

use crate::directory::{Employee, Manager};

fn default_redact_fields() -> Vec<String> {
    vec!["password".to_string(), "salary".to_string()]
}

fn is_default_diagnostics(v: &Diagnostics) -> bool {
    v.redact_fields == default_redact_fields()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "is_default_diagnostics")]
    pub diagnostics: Diagnostics,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managers: Vec<Manager>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub employees: Vec<Employee>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Diagnostics {
    /// JSON field names masked in logged bodies (case-insensitive).
    #[serde(default = "default_redact_fields")]
    pub redact_fields: Vec<String>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            redact_fields: default_redact_fields(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.diagnostics.redact_fields, ["password", "salary"]);
        assert!(config.employees.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_str::<Config>(r#"{"diagnostic": {}}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }
}
