//! Specificity-based route matching for the directory API.
//!
//! [`match_route`] scores each route against the request path and method:
//! exact segments score 10, parameterized segments (`:param`) score 5.
//! The highest-scoring match wins, with captured parameters returned.

use std::collections::HashMap;

use super::Endpoint;

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub path: &'static str,
    pub methods: &'static [&'static str],
    pub endpoint: Endpoint,
}

/// Every route served by [`Api`](super::Api). Anything else is a 404.
pub const ROUTES: &[Route] = &[
    Route {
        path: "/health",
        methods: &["GET"],
        endpoint: Endpoint::Health,
    },
    Route {
        path: "/api/employee",
        methods: &["GET"],
        endpoint: Endpoint::ListEmployees,
    },
    Route {
        path: "/api/employee",
        methods: &["POST"],
        endpoint: Endpoint::CreateEmployee,
    },
    Route {
        path: "/api/employee/:id",
        methods: &["GET"],
        endpoint: Endpoint::GetEmployee,
    },
    Route {
        path: "/api/employee/:id",
        methods: &["PUT"],
        endpoint: Endpoint::UpdateEmployee,
    },
    Route {
        path: "/api/employee/:id",
        methods: &["DELETE"],
        endpoint: Endpoint::DeleteEmployee,
    },
    Route {
        path: "/api/manager",
        methods: &["GET"],
        endpoint: Endpoint::ListManagers,
    },
];

#[must_use]
pub fn match_route<'r>(
    routes: &'r [Route],
    path: &str,
    method: &str,
) -> Option<(&'r Route, HashMap<String, String>)> {
    let request_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut best_match: Option<(&Route, HashMap<String, String>)> = None;
    let mut best_specificity: i32 = -1;

    for route in routes {
        if !method_matches(route.methods, method) {
            continue;
        }

        let route_segments: Vec<&str> = route.path.split('/').filter(|s| !s.is_empty()).collect();
        if route_segments.len() != request_segments.len() {
            continue;
        }

        let mut params = HashMap::new();
        let mut matched = true;
        let mut specificity: i32 = 0;

        for (rs, qs) in route_segments.iter().zip(request_segments.iter()) {
            if let Some(param_name) = rs.strip_prefix(':') {
                params.insert(param_name.to_string(), (*qs).to_string());
                specificity += 5;
            } else if rs.eq_ignore_ascii_case(qs) {
                specificity += 10;
            } else {
                matched = false;
                break;
            }
        }

        if matched && specificity > best_specificity {
            best_match = Some((route, params));
            best_specificity = specificity;
        }
    }

    best_match
}

fn method_matches(methods: &[&str], method: &str) -> bool {
    methods
        .iter()
        .any(|m| *m == "*" || m.eq_ignore_ascii_case(method))
}
