//! Access-control evaluation over a configuration snapshot.
//!
//! The domain subnet and the per-route allow-list are independent layers;
//! admission is their intersection (most restrictive wins): a client must
//! sit inside the domain's `subnet` AND be matched by the route's `ips`
//! allow-list. An empty allow-list, or one containing the literal `any`,
//! delegates the decision to the domain subnet alone. The enforcement
//! engine and the tests share this one implementation.

use std::net::IpAddr;

use super::net::parse_network;
use super::{Configuration, ANY};

/// Outcome of an admission check for a `(domain, path)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    /// Client address falls outside the domain's subnet
    DeniedBySubnet,
    /// Client address not matched by the route's allow-list
    DeniedByAllowList,
    /// Route forwards nowhere (empty device address)
    DeniedByRoute,
    /// No such domain or route in the table
    NoRoute,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        self == AccessDecision::Allowed
    }
}

/// True when the address is inside the network literal. Unparseable
/// literals never match; the validator rejects them before deployment.
fn network_matches(literal: &str, addr: IpAddr) -> bool {
    parse_network(literal).is_some_and(|net| net.contains(&addr))
}

/// True when the allow-list admits the address. Empty or `any` means
/// unrestricted.
pub fn allow_list_permits(allowed_ips: &[String], addr: IpAddr) -> bool {
    if allowed_ips.is_empty() || allowed_ips.iter().any(|entry| entry == ANY) {
        return true;
    }
    allowed_ips.iter().any(|entry| network_matches(entry, addr))
}

/// Evaluate admission for a client address against a `(domain, path)` route.
pub fn evaluate(
    config: &Configuration,
    domain: &str,
    path: &str,
    client: IpAddr,
) -> AccessDecision {
    let Some(subnet) = config.domains.get(domain) else {
        return AccessDecision::NoRoute;
    };
    let Some(route) = config.route(domain, path) else {
        return AccessDecision::NoRoute;
    };

    if !network_matches(subnet, client) {
        return AccessDecision::DeniedBySubnet;
    }
    if !allow_list_permits(&route.allowed_ips, client) {
        return AccessDecision::DeniedByAllowList;
    }
    if route.is_deny() {
        return AccessDecision::DeniedByRoute;
    }
    AccessDecision::Allowed
}
