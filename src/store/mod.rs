//! # Entity Store
//!
//! The mutable working configuration. Mutations are serialized behind a
//! single writer lock and each one persists the full working set to disk
//! with atomic replace semantics, so a restarting process resumes exactly
//! where the operators left off. A mutation either fully applies (memory
//! and disk) or leaves the store unchanged.
//!
//! Per-entity invariants enforced here: domain names are unique and
//! DNS-valid, subnets parse, a domain cannot be removed while routes
//! reference it (refuse, never cascade), and `(domain, path)` is unique
//! with both halves immutable after creation.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::net::{is_valid_hostname, is_valid_network};
use crate::domain::{Configuration, Route, RouteEntry, RoutePatch, Settings};
use crate::errors::{Error, Result};
use crate::storage;

const WORKING_CONFIG_FILE: &str = "config.json";

/// A domain together with the derived route count the UI disables
/// deletion on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainEntry {
    pub domain: String,
    pub subnet: String,
    #[serde(rename = "pathCount")]
    pub path_count: usize,
}

/// Working-configuration store backed by `config.json` in the data
/// directory.
pub struct ConfigStore {
    path: PathBuf,
    working: RwLock<Configuration>,
}

impl ConfigStore {
    /// Open the store, loading the persisted working configuration or
    /// starting from an empty one.
    pub fn open(data_dir: &Path) -> Result<Self> {
        storage::ensure_dir(data_dir)?;
        let path = data_dir.join(WORKING_CONFIG_FILE);

        let working = if path.exists() {
            let config: Configuration = storage::read_json(&path)?;
            debug!(
                domains = config.domains.len(),
                routes = config.total_routes(),
                "loaded working configuration"
            );
            config
        } else {
            info!(path = %path.display(), "no working configuration found, starting empty");
            let config = Configuration::default();
            storage::atomic_write_json(&path, &config)?;
            config
        };

        Ok(Self { path, working: RwLock::new(working) })
    }

    /// Immutable point-in-time copy of the full configuration.
    pub async fn snapshot(&self) -> Configuration {
        self.working.read().await.clone()
    }

    /// Swap in a whole working configuration (two-phase edit model: not
    /// validated on save, only on deploy).
    pub async fn replace(&self, config: Configuration) -> Result<()> {
        let mut guard = self.working.write().await;
        storage::atomic_write_json(&self.path, &config)?;
        *guard = config;
        Ok(())
    }

    pub async fn add_domain(&self, name: &str, subnet: &str) -> Result<DomainEntry> {
        check_domain_fields(name, subnet)?;

        self.mutate(|config| {
            if config.domains.contains_key(name) {
                return Err(Error::conflict(format!("domain '{}' already exists", name)));
            }
            config.domains.insert(name.to_string(), subnet.to_string());
            Ok(())
        })
        .await?;

        info!(domain = name, subnet, "domain added");
        Ok(DomainEntry { domain: name.to_string(), subnet: subnet.to_string(), path_count: 0 })
    }

    pub async fn update_domain(&self, name: &str, subnet: &str) -> Result<DomainEntry> {
        if !is_valid_network(subnet) {
            return Err(Error::invalid_argument(format!(
                "subnet '{}' is not valid CIDR or IP notation",
                subnet
            )));
        }

        let path_count = self
            .mutate(|config| {
                match config.domains.get_mut(name) {
                    Some(existing) => *existing = subnet.to_string(),
                    None => return Err(Error::not_found("domain", name)),
                }
                Ok(config.route_count(name))
            })
            .await?;

        info!(domain = name, subnet, "domain updated");
        Ok(DomainEntry { domain: name.to_string(), subnet: subnet.to_string(), path_count })
    }

    pub async fn remove_domain(&self, name: &str) -> Result<()> {
        self.mutate(|config| {
            if !config.domains.contains_key(name) {
                return Err(Error::not_found("domain", name));
            }
            let referencing = config.route_count(name);
            if referencing > 0 {
                return Err(Error::conflict(format!(
                    "domain '{}' still has {} route(s); remove them first",
                    name, referencing
                )));
            }
            config.domains.remove(name);
            config.routes.remove(name);
            Ok(())
        })
        .await?;

        info!(domain = name, "domain removed");
        Ok(())
    }

    pub async fn get_domain(&self, name: &str) -> Result<DomainEntry> {
        let config = self.working.read().await;
        let subnet =
            config.domains.get(name).ok_or_else(|| Error::not_found("domain", name))?;
        Ok(DomainEntry {
            domain: name.to_string(),
            subnet: subnet.clone(),
            path_count: config.route_count(name),
        })
    }

    pub async fn list_domains(&self) -> Vec<DomainEntry> {
        let config = self.working.read().await;
        config
            .domains
            .iter()
            .map(|(name, subnet)| DomainEntry {
                domain: name.clone(),
                subnet: subnet.clone(),
                path_count: config.route_count(name),
            })
            .collect()
    }

    pub async fn add_route(&self, domain: &str, path: &str, route: Route) -> Result<RouteEntry> {
        let path = normalize_path(path);

        let stored = self
            .mutate(|config| {
                if !config.domains.contains_key(domain) {
                    return Err(Error::not_found("domain", domain));
                }
                let paths = config.routes.entry(domain.to_string()).or_default();
                if paths.contains_key(&path) {
                    return Err(Error::conflict(format!(
                        "route '{}{}' already exists",
                        domain, path
                    )));
                }
                paths.insert(path.clone(), route.clone());
                Ok(route.clone())
            })
            .await?;

        info!(domain, path = %path, device_ip = %stored.device_ip, "route added");
        Ok(RouteEntry { domain: domain.to_string(), path, route: stored })
    }

    /// Patch a route's mutable fields. `domain` and `path` are the identity
    /// key and cannot change; editing them is delete + add.
    pub async fn update_route(
        &self,
        domain: &str,
        path: &str,
        patch: RoutePatch,
    ) -> Result<RouteEntry> {
        let path = normalize_path(path);

        let updated = self
            .mutate(|config| {
                let route = config
                    .routes
                    .get_mut(domain)
                    .and_then(|paths| paths.get_mut(&path))
                    .ok_or_else(|| {
                        Error::not_found("route", format!("{}{}", domain, path))
                    })?;
                patch.apply_to(route);
                Ok(route.clone())
            })
            .await?;

        info!(domain, path = %path, "route updated");
        Ok(RouteEntry { domain: domain.to_string(), path, route: updated })
    }

    pub async fn remove_route(&self, domain: &str, path: &str) -> Result<()> {
        let path = normalize_path(path);

        self.mutate(|config| {
            let paths = config
                .routes
                .get_mut(domain)
                .ok_or_else(|| Error::not_found("route", format!("{}{}", domain, path)))?;
            if paths.remove(&path).is_none() {
                return Err(Error::not_found("route", format!("{}{}", domain, path)));
            }
            if paths.is_empty() {
                config.routes.remove(domain);
            }
            Ok(())
        })
        .await?;

        info!(domain, path = %path, "route removed");
        Ok(())
    }

    pub async fn get_route(&self, domain: &str, path: &str) -> Result<RouteEntry> {
        let path = normalize_path(path);
        let config = self.working.read().await;
        let route = config
            .route(domain, &path)
            .ok_or_else(|| Error::not_found("route", format!("{}{}", domain, path)))?;
        Ok(RouteEntry { domain: domain.to_string(), path, route: route.clone() })
    }

    pub async fn list_routes(&self, domain: Option<&str>) -> Vec<RouteEntry> {
        let config = self.working.read().await;
        let mut entries = config.route_entries();
        if let Some(domain) = domain {
            entries.retain(|entry| entry.domain == domain);
        }
        entries
    }

    pub async fn settings(&self) -> Settings {
        self.working.read().await.settings()
    }

    pub async fn update_settings(&self, settings: Settings) -> Result<Settings> {
        self.mutate(|config| {
            config.set_settings(settings.clone());
            Ok(())
        })
        .await?;
        info!("settings updated");
        Ok(settings)
    }

    /// Run a mutation against a copy of the working set, persist the copy,
    /// then swap it in. Readers never observe a half-applied change and a
    /// persistence failure leaves the store untouched.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Configuration) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.working.write().await;
        let mut candidate = guard.clone();
        let output = op(&mut candidate)?;
        storage::atomic_write_json(&self.path, &candidate)?;
        *guard = candidate;
        Ok(output)
    }
}

fn check_domain_fields(name: &str, subnet: &str) -> Result<()> {
    if !is_valid_hostname(name) {
        return Err(Error::invalid_argument(format!("'{}' is not a valid hostname", name)));
    }
    if !is_valid_network(subnet) {
        return Err(Error::invalid_argument(format!(
            "subnet '{}' is not valid CIDR or IP notation",
            subnet
        )));
    }
    Ok(())
}

/// Route paths are stored rooted; a bare segment from a URL parameter is
/// treated as `/`-prefixed.
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ANY;

    async fn open_store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn sample_route() -> Route {
        Route {
            device_ip: "10.0.0.5".into(),
            ports: vec![8080],
            site_name: "app".into(),
            allowed_ips: vec![ANY.into()],
        }
    }

    #[tokio::test]
    async fn test_add_domain_conflicts_and_bad_input() {
        let (_dir, store) = open_store().await;

        store.add_domain("example.com", "192.168.1.0/24").await.unwrap();

        let err = store.add_domain("example.com", "10.0.0.0/8").await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let err = store.add_domain("ok.example", "not-a-subnet").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = store.add_domain("bad host!", "10.0.0.0/8").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_update_domain_not_found() {
        let (_dir, store) = open_store().await;
        let err = store.update_domain("missing.example", "10.0.0.0/8").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_remove_domain_refuses_while_referenced() {
        let (_dir, store) = open_store().await;
        store.add_domain("example.com", "192.168.1.0/24").await.unwrap();
        store.add_route("example.com", "/app", sample_route()).await.unwrap();

        let err = store.remove_domain("example.com").await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        store.remove_route("example.com", "/app").await.unwrap();
        store.remove_domain("example.com").await.unwrap();
        assert!(store.list_domains().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_route_requires_domain_and_unique_key() {
        let (_dir, store) = open_store().await;

        let err = store.add_route("example.com", "/app", sample_route()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        store.add_domain("example.com", "192.168.1.0/24").await.unwrap();
        store.add_route("example.com", "/app", sample_route()).await.unwrap();

        let err = store.add_route("example.com", "/app", sample_route()).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_route_patches_without_touching_key() {
        let (_dir, store) = open_store().await;
        store.add_domain("example.com", "192.168.1.0/24").await.unwrap();
        store.add_route("example.com", "/app", sample_route()).await.unwrap();

        let patch = RoutePatch { device_ip: Some("10.0.0.9".into()), ..RoutePatch::default() };
        let entry = store.update_route("example.com", "/app", patch).await.unwrap();
        assert_eq!(entry.route.device_ip, "10.0.0.9");
        assert_eq!(entry.route.ports, vec![8080]);
        assert_eq!(entry.domain, "example.com");
        assert_eq!(entry.path, "/app");
    }

    #[tokio::test]
    async fn test_remove_route_not_found() {
        let (_dir, store) = open_store().await;
        let err = store.remove_route("example.com", "/app").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_bare_path_is_rooted() {
        let (_dir, store) = open_store().await;
        store.add_domain("example.com", "192.168.1.0/24").await.unwrap();
        store.add_route("example.com", "app", sample_route()).await.unwrap();

        let entry = store.get_route("example.com", "/app").await.unwrap();
        assert_eq!(entry.path, "/app");
    }

    #[tokio::test]
    async fn test_snapshot_is_detached() {
        let (_dir, store) = open_store().await;
        store.add_domain("example.com", "192.168.1.0/24").await.unwrap();

        let snapshot = store.snapshot().await;
        store.add_domain("other.example", "10.0.0.0/8").await.unwrap();

        assert_eq!(snapshot.domains.len(), 1);
        assert_eq!(store.snapshot().await.domains.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_store_unchanged() {
        let (_dir, store) = open_store().await;
        store.add_domain("example.com", "192.168.1.0/24").await.unwrap();
        store.add_route("example.com", "/app", sample_route()).await.unwrap();

        let before = store.snapshot().await;
        let _ = store.add_route("example.com", "/app", sample_route()).await.unwrap_err();
        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = ConfigStore::open(dir.path()).unwrap();
            store.add_domain("example.com", "192.168.1.0/24").await.unwrap();
            store.add_route("example.com", "/app", sample_route()).await.unwrap();
        }

        let reopened = ConfigStore::open(dir.path()).unwrap();
        let config = reopened.snapshot().await;
        assert_eq!(config.domains.get("example.com").unwrap(), "192.168.1.0/24");
        assert!(config.route("example.com", "/app").is_some());
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let (_dir, store) = open_store().await;
        let mut settings = store.settings().await;
        settings.endpoint.log_server = "http://logs.local:9000".into();
        settings.options.websocket_timeout = 120;

        store.update_settings(settings.clone()).await.unwrap();
        assert_eq!(store.settings().await, settings);
    }
}
