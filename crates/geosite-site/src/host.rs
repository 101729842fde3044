//! Request host handling.

use crate::error::ResolveError;

/// Which kind of page a host addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Root domain (or its `www.` alias): list of states.
    Root,
    /// `<st>.<root>`: list of cities in a state.
    State,
    /// `<service>-<city>-<st>.<root>`: city home or a named page.
    City,
}

impl Scope {
    /// Lowercase name for logs and headers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::State => "state",
            Self::City => "city",
        }
    }
}

/// A request host split into its parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostInfo {
    /// Host as received, lowercased (port kept).
    pub host: String,
    /// Host without port.
    pub hostname: String,
    /// Last `root_labels` labels of the hostname.
    pub root_domain: String,
    /// Labels in front of the root domain.
    pub subdomain_labels: Vec<String>,
}

impl HostInfo {
    /// Parse a `Host` value.
    ///
    /// The root domain is the last `root_labels` labels; hosts with fewer labels
    /// are their own root domain.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidHost`] for empty hosts or hosts with
    /// empty labels.
    pub fn parse(host: &str, root_labels: usize) -> Result<Self, ResolveError> {
        let host = host.trim().to_lowercase();
        let hostname = match host.rsplit_once(':') {
            Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name.to_owned(),
            _ => host.clone(),
        };

        let labels: Vec<&str> = hostname.split('.').collect();
        if hostname.is_empty() || labels.iter().any(|label| label.is_empty()) {
            return Err(ResolveError::InvalidHost(host));
        }

        let split = labels.len().saturating_sub(root_labels.max(1));
        let root_domain = labels[split..].join(".");
        let subdomain_labels = labels[..split].iter().map(|l| (*l).to_owned()).collect();

        Ok(Self {
            host,
            hostname,
            root_domain,
            subdomain_labels,
        })
    }

    /// Whether the host is the root domain or `www.` + root domain.
    #[must_use]
    pub fn is_root(&self) -> bool {
        match self.subdomain_labels.as_slice() {
            [] => true,
            [only] => only.as_str() == "www",
            _ => false,
        }
    }

    /// The single subdomain label, if there is exactly one.
    #[must_use]
    pub fn sole_label(&self) -> Option<&str> {
        match self.subdomain_labels.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_city_host_with_port() {
        let info = HostInfo::parse("Roof-Austin-TX.Example.com:8001", 2).unwrap();

        assert_eq!(info.host, "roof-austin-tx.example.com:8001");
        assert_eq!(info.hostname, "roof-austin-tx.example.com");
        assert_eq!(info.root_domain, "example.com");
        assert_eq!(info.subdomain_labels, vec!["roof-austin-tx"]);
        assert!(!info.is_root());
        assert_eq!(info.sole_label(), Some("roof-austin-tx"));
    }

    #[test]
    fn test_parse_root_and_www() {
        assert!(HostInfo::parse("example.com", 2).unwrap().is_root());
        assert!(HostInfo::parse("www.example.com", 2).unwrap().is_root());
        assert!(!HostInfo::parse("tx.example.com", 2).unwrap().is_root());
    }

    #[test]
    fn test_parse_three_label_root() {
        let info = HostInfo::parse("tx.example.co.uk", 3).unwrap();

        assert_eq!(info.root_domain, "example.co.uk");
        assert_eq!(info.sole_label(), Some("tx"));
    }

    #[test]
    fn test_parse_short_host_is_own_root() {
        let info = HostInfo::parse("localhost:8001", 2).unwrap();

        assert_eq!(info.root_domain, "localhost");
        assert!(info.is_root());
    }

    #[test]
    fn test_parse_nested_subdomain() {
        let info = HostInfo::parse("a.tx.example.com", 2).unwrap();

        assert_eq!(info.subdomain_labels, vec!["a", "tx"]);
        assert_eq!(info.sole_label(), None);
        assert!(!info.is_root());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            HostInfo::parse("", 2),
            Err(ResolveError::InvalidHost(_))
        ));
        assert!(matches!(
            HostInfo::parse("a..com", 2),
            Err(ResolveError::InvalidHost(_))
        ));
        assert!(matches!(
            HostInfo::parse(":8001", 2),
            Err(ResolveError::InvalidHost(_))
        ));
    }

    #[test]
    fn test_scope_names() {
        assert_eq!(Scope::Root.as_str(), "root");
        assert_eq!(Scope::City.as_str(), "city");
    }
}
