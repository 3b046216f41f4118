//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0, address parses)
//! - Detect malformed and conflicting routes before the server starts
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Route checks build a throwaway route table, so the rules are exactly
//!   the ones the running server applies

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::routing::{Method, RouteError, RouteTable};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} must be host:port")]
    InvalidBindAddress(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("routes[{index}]: unsupported method {method:?}")]
    UnknownMethod { index: usize, method: String },

    #[error("routes[{index}]: {source}")]
    Route { index: usize, source: RouteError },
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !is_host_port(&config.listener.bind_address) {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "timeouts.request_secs",
        });
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero {
            field: "limits.max_body_bytes",
        });
    }

    errors.extend(route_errors(config));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_host_port(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}

fn route_errors(config: &ServerConfig) -> Vec<ValidationError> {
    let mut table = RouteTable::new();
    let mut errors = Vec::new();

    for (index, route) in config.routes.iter().enumerate() {
        let method = match route.method.parse::<Method>() {
            Ok(method) => method,
            Err(_) => {
                errors.push(ValidationError::UnknownMethod {
                    index,
                    method: route.method.clone(),
                });
                continue;
            }
        };
        if let Err(source) = table.register(method, &route.path, vec![index]) {
            errors.push(ValidationError::Route { index, source });
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    fn route(method: &str, path: &str) -> RouteConfig {
        RouteConfig {
            method: method.to_string(),
            path: path.to_string(),
            name: None,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "nowhere".to_string();
        config.timeouts.request_secs = 0;
        config.limits.max_body_bytes = 0;
        config.routes = vec![
            route("GET", "/a/prefix:key1/b"),
            route("GET", "/a/prefix:key2/b"),
            route("FETCH", "/x"),
            route("post", "no-slash"),
            route("GET", "/a/prefix:key1/b"),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 7);
        assert_eq!(
            errors[0],
            ValidationError::InvalidBindAddress("nowhere".to_string())
        );
        assert!(matches!(
            errors[3],
            ValidationError::Route {
                index: 1,
                source: RouteError::Conflict { .. }
            }
        ));
        assert!(matches!(errors[4], ValidationError::UnknownMethod { index: 2, .. }));
        assert!(matches!(
            errors[5],
            ValidationError::Route {
                index: 3,
                source: RouteError::Malformed { .. }
            }
        ));
        assert!(matches!(
            errors[6],
            ValidationError::Route {
                index: 4,
                source: RouteError::Duplicate { .. }
            }
        ));
    }

    #[test]
    fn test_bind_address_forms() {
        assert!(is_host_port("0.0.0.0:8080"));
        assert!(is_host_port("localhost:0"));
        assert!(is_host_port("[::1]:9000"));
        assert!(!is_host_port(""));
        assert!(!is_host_port(":8080"));
        assert!(!is_host_port("localhost:http"));
    }

    #[test]
    fn test_same_path_different_methods_is_fine() {
        let mut config = ServerConfig::default();
        config.routes = vec![route("GET", "/users/:id"), route("DELETE", "/users/:id")];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_error_message_names_route_index() {
        let mut config = ServerConfig::default();
        config.routes = vec![route("GET", "/a"), route("GET", "/a")];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors[0].to_string(),
            "routes[1]: route /a has been registered"
        );
    }
}
