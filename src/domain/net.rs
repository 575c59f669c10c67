//! Network literal parsing shared by the validator and the access-control
//! evaluator. A "network literal" is either CIDR notation (`10.0.0.0/24`)
//! or a bare address, which is treated as a host-length prefix.

use std::net::IpAddr;

use ipnet::IpNet;
use once_cell::sync::Lazy;
use regex::Regex;

/// RFC 1123 hostname labels, dot-separated, 253 chars max overall.
static HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)*[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$")
        .expect("hostname regex")
});

/// Parse CIDR notation or a bare IP address into a network.
pub fn parse_network(value: &str) -> Option<IpNet> {
    if let Ok(net) = value.parse::<IpNet>() {
        return Some(net);
    }
    value.parse::<IpAddr>().ok().map(IpNet::from)
}

/// True when the value parses as CIDR or a bare IP.
pub fn is_valid_network(value: &str) -> bool {
    parse_network(value).is_some()
}

/// True when the value is a DNS-valid hostname.
pub fn is_valid_hostname(value: &str) -> bool {
    !value.is_empty() && value.len() <= 253 && HOSTNAME_RE.is_match(value)
}

/// True when the value can name a forwarding target: an IP address or a
/// resolvable-looking hostname token.
pub fn is_host_token(value: &str) -> bool {
    value.parse::<IpAddr>().is_ok() || is_valid_hostname(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_network_accepts_cidr_and_bare_ips() {
        assert!(parse_network("192.168.1.0/24").is_some());
        assert!(parse_network("10.0.0.5").is_some());
        assert!(parse_network("2001:db8::/48").is_some());
        assert!(parse_network("2001:db8::1").is_some());
    }

    #[test]
    fn test_parse_network_rejects_garbage() {
        assert!(parse_network("").is_none());
        assert!(parse_network("not-a-subnet").is_none());
        assert!(parse_network("192.168.1.0/33").is_none());
        assert!(parse_network("300.1.1.1").is_none());
    }

    #[test]
    fn test_bare_ip_is_host_prefix() {
        let net = parse_network("10.0.0.5").unwrap();
        assert_eq!(net.prefix_len(), 32);
        assert!(net.contains(&"10.0.0.5".parse::<IpAddr>().unwrap()));
        assert!(!net.contains(&"10.0.0.6".parse::<IpAddr>().unwrap()));
    }

    #[test]
    fn test_hostname_validation() {
        assert!(is_valid_hostname("example.com"));
        assert!(is_valid_hostname("sub.domain.example.co.jp"));
        assert!(is_valid_hostname("localhost"));
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("-leading.example.com"));
        assert!(!is_valid_hostname("spaces not allowed"));
        assert!(!is_valid_hostname(&"a".repeat(254)));
    }

    #[test]
    fn test_host_token() {
        assert!(is_host_token("10.0.0.5"));
        assert!(is_host_token("device.local"));
        assert!(!is_host_token("under_score not ok"));
    }
}
