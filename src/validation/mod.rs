//! # Configuration Validation
//!
//! Whole-configuration validation run before any deployment. Checks are
//! accumulated rather than short-circuited so an operator sees every
//! problem in one pass. A configuration that fails validation never
//! reaches history and never becomes active.

use serde::{Deserialize, Serialize};

use crate::domain::net::{is_host_token, is_valid_hostname, is_valid_network};
use crate::domain::{Configuration, Route, ANY};

/// Bounds on settings values; out-of-range values are rejected with a
/// descriptive error, never silently clamped.
const MAX_WEBSOCKET_TIMEOUT_SECS: u64 = 86_400;
const MAX_LOG_RETENTION_DAYS: u32 = 3_650;

/// Itemized pass/fail verdict for a candidate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self { valid: errors.is_empty(), errors }
    }
}

/// Validate a complete configuration snapshot.
pub fn validate(config: &Configuration) -> ValidationReport {
    let mut errors = Vec::new();

    validate_domains(config, &mut errors);
    validate_routes(config, &mut errors);
    validate_settings(config, &mut errors);

    ValidationReport::from_errors(errors)
}

fn validate_domains(config: &Configuration, errors: &mut Vec<String>) {
    for (name, subnet) in &config.domains {
        if !is_valid_hostname(name) {
            errors.push(format!("domain '{}': not a valid hostname", name));
        }
        if !is_valid_network(subnet) {
            errors.push(format!(
                "domain '{}': subnet '{}' is not valid CIDR or IP notation",
                name, subnet
            ));
        }
    }
}

fn validate_routes(config: &Configuration, errors: &mut Vec<String>) {
    for (domain, paths) in &config.routes {
        // Referential integrity: every route's domain must exist
        if !config.domains.contains_key(domain) {
            errors.push(format!(
                "routes reference domain '{}' which is not defined",
                domain
            ));
        }

        for (path, route) in paths {
            let key = format!("{}{}", domain, path);
            if !path.starts_with('/') {
                errors.push(format!("route '{}': path must start with '/'", key));
            }
            validate_route_fields(&key, route, errors);
        }
    }
}

fn validate_route_fields(key: &str, route: &Route, errors: &mut Vec<String>) {
    if !route.device_ip.is_empty() && !is_host_token(&route.device_ip) {
        errors.push(format!(
            "route '{}': device address '{}' is not an IP or hostname",
            key, route.device_ip
        ));
    }

    let mut seen_ports = std::collections::BTreeSet::new();
    for port in &route.ports {
        if *port == 0 {
            errors.push(format!("route '{}': port 0 is out of range", key));
        }
        if !seen_ports.insert(*port) {
            errors.push(format!("route '{}': duplicate port {}", key, port));
        }
    }

    for entry in &route.allowed_ips {
        if entry == ANY {
            continue;
        }
        if !is_valid_network(entry) {
            errors.push(format!(
                "route '{}': allowed address '{}' is not valid CIDR or IP notation",
                key, entry
            ));
        }
    }
}

fn validate_settings(config: &Configuration, errors: &mut Vec<String>) {
    let options = &config.options;
    if options.websocket_timeout == 0 || options.websocket_timeout > MAX_WEBSOCKET_TIMEOUT_SECS {
        errors.push(format!(
            "options: websocket_timeout {} must be between 1 and {} seconds",
            options.websocket_timeout, MAX_WEBSOCKET_TIMEOUT_SECS
        ));
    }
    if options.log_retention_days == 0 || options.log_retention_days > MAX_LOG_RETENTION_DAYS {
        errors.push(format!(
            "options: log_retention_days {} must be between 1 and {} days",
            options.log_retention_days, MAX_LOG_RETENTION_DAYS
        ));
    }
}
