//! # Domain Model
//!
//! Core data model for the routing table: domains, per-path device routes,
//! global settings, and the immutable revision snapshots minted by
//! deployments. The wire layout mirrors the gateway's on-disk JSON format:
//! `hostdomains` maps a hostname to its access-control subnet and
//! `hostingdevice` nests routes under `domain` then `path`, which makes the
//! `(domain, path)` identity key structurally unique.

pub mod access;
pub mod net;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wildcard literal accepted in route allow-lists
pub const ANY: &str = "any";

fn default_path() -> String {
    "/".to_string()
}

fn default_schema_version() -> String {
    "1.0.0".to_string()
}

fn default_websocket_timeout() -> u64 {
    600
}

fn default_log_retention_days() -> u32 {
    30
}

/// A forwarding rule scoped to a domain, keyed externally by `(domain, path)`.
///
/// An empty `device_ip` means "deny"; an empty port list means "any port";
/// an empty allow-list (or one containing the literal `any`) means the
/// domain subnet alone decides admission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "deviceip", default)]
    pub device_ip: String,

    #[serde(rename = "port", default)]
    pub ports: Vec<u16>,

    #[serde(rename = "sitename", default)]
    pub site_name: String,

    #[serde(rename = "ips", default)]
    pub allowed_ips: Vec<String>,
}

impl Route {
    /// True when the rule forwards nowhere and therefore denies traffic.
    pub fn is_deny(&self) -> bool {
        self.device_ip.is_empty()
    }
}

/// Partial update for a route; `domain` and `path` are immutable once
/// created, so they never appear here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutePatch {
    #[serde(rename = "deviceip")]
    pub device_ip: Option<String>,

    #[serde(rename = "port")]
    pub ports: Option<Vec<u16>>,

    #[serde(rename = "sitename")]
    pub site_name: Option<String>,

    #[serde(rename = "ips")]
    pub allowed_ips: Option<Vec<String>>,
}

impl RoutePatch {
    /// Apply the present fields onto an existing route.
    pub fn apply_to(&self, route: &mut Route) {
        if let Some(device_ip) = &self.device_ip {
            route.device_ip = device_ip.clone();
        }
        if let Some(ports) = &self.ports {
            route.ports = ports.clone();
        }
        if let Some(site_name) = &self.site_name {
            route.site_name = site_name.clone();
        }
        if let Some(allowed_ips) = &self.allowed_ips {
            route.allowed_ips = allowed_ips.clone();
        }
    }
}

/// A route flattened together with its identity key, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub domain: String,

    #[serde(default = "default_path")]
    pub path: String,

    #[serde(flatten)]
    pub route: Route,
}

/// External endpoints consumed by the gateway's side channels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "logserver", default)]
    pub log_server: String,
}

/// Global gateway options. Unknown keys are preserved in `extra` so newer
/// operators can round-trip settings this build does not understand yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default = "default_websocket_timeout")]
    pub websocket_timeout: u64,

    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u32,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            websocket_timeout: default_websocket_timeout(),
            log_retention_days: default_log_retention_days(),
            extra: BTreeMap::new(),
        }
    }
}

/// The singleton settings record: log-server endpoint plus global options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub endpoint: Endpoint,

    #[serde(default)]
    pub options: Options,
}

/// The full aggregate the gateway runs on: all domains, all routes, the
/// settings record, and the administrative-user map. This is the unit of
/// validation, versioning, and deployment, never a single entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default = "default_schema_version")]
    pub version: String,

    /// Hostname -> access-control subnet (CIDR)
    #[serde(rename = "hostdomains", default)]
    pub domains: BTreeMap<String, String>,

    /// Domain -> path -> route
    #[serde(rename = "hostingdevice", default)]
    pub routes: BTreeMap<String, BTreeMap<String, Route>>,

    /// Username -> password hash; opaque to this core, authentication is
    /// handled by an external collaborator
    #[serde(rename = "adminuser", default)]
    pub admin_users: BTreeMap<String, String>,

    #[serde(default)]
    pub endpoint: Endpoint,

    #[serde(default)]
    pub options: Options,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            version: default_schema_version(),
            domains: BTreeMap::new(),
            routes: BTreeMap::new(),
            admin_users: BTreeMap::new(),
            endpoint: Endpoint::default(),
            options: Options::default(),
        }
    }
}

impl Configuration {
    /// Number of routes registered under a domain.
    pub fn route_count(&self, domain: &str) -> usize {
        self.routes.get(domain).map_or(0, |paths| paths.len())
    }

    /// Total number of routes across all domains.
    pub fn total_routes(&self) -> usize {
        self.routes.values().map(|paths| paths.len()).sum()
    }

    /// Look up a route by its identity key.
    pub fn route(&self, domain: &str, path: &str) -> Option<&Route> {
        self.routes.get(domain).and_then(|paths| paths.get(path))
    }

    /// Flatten the nested route map into keyed entries, ordered by
    /// `(domain, path)`.
    pub fn route_entries(&self) -> Vec<RouteEntry> {
        self.routes
            .iter()
            .flat_map(|(domain, paths)| {
                paths.iter().map(move |(path, route)| RouteEntry {
                    domain: domain.clone(),
                    path: path.clone(),
                    route: route.clone(),
                })
            })
            .collect()
    }

    /// View of the settings record.
    pub fn settings(&self) -> Settings {
        Settings { endpoint: self.endpoint.clone(), options: self.options.clone() }
    }

    /// Replace the settings record.
    pub fn set_settings(&mut self, settings: Settings) {
        self.endpoint = settings.endpoint;
        self.options = settings.options;
    }
}

/// Metadata attached to an immutable configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionMetadata {
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub description: String,
}

/// An immutable, numbered snapshot of a configuration recorded in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    #[serde(flatten)]
    pub metadata: RevisionMetadata,
    pub config: Configuration,
}
