// ABOUTME: Endpoint identity and the per-run index that deduplicates (host, scheme) pairs
// ABOUTME: Keeps discovery order so output stays stable between runs on the same files

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A connectable `(host, scheme)` pair. Two endpoints are the same
/// bookmark no matter which file produced them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Endpoint {
    pub host: String,
    pub scheme: String,
}

impl Endpoint {
    pub fn new(host: &str, scheme: &str) -> Self {
        Self {
            host: host.to_string(),
            scheme: scheme.to_string(),
        }
    }
}

/// An endpoint plus the port it was first seen with, if any.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Bookmark {
    #[serde(flatten)]
    pub endpoint: Endpoint,
    pub port: Option<String>,
}

impl Bookmark {
    pub fn url(&self) -> String {
        match &self.port {
            Some(port) => format!("{}://{}:{}", self.endpoint.scheme, self.endpoint.host, port),
            None => format!("{}://{}", self.endpoint.scheme, self.endpoint.host),
        }
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

#[derive(Debug, Default)]
pub struct HostIndex {
    seen: HashSet<Endpoint>,
    bookmarks: Vec<Bookmark>,
}

impl HostIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an endpoint. Returns false if the pair was already present,
    /// in which case the earlier port is kept.
    pub fn add(&mut self, host: &str, scheme: &str, port: Option<&str>) -> bool {
        let endpoint = Endpoint::new(host, scheme);
        if self.seen.contains(&endpoint) {
            return false;
        }

        self.seen.insert(endpoint.clone());
        self.bookmarks.push(Bookmark {
            endpoint,
            port: port.map(str::to_string),
        });
        true
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn into_bookmarks(self) -> Vec<Bookmark> {
        self.bookmarks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut index = HostIndex::new();

        assert!(index.add("web1", "ssh", None));
        assert!(!index.add("web1", "ssh", None));
        assert!(index.add("web1", "mosh", None));
        assert!(index.add("web2", "ssh", None));

        assert_eq!(index.len(), 3);
        let endpoints: Vec<Endpoint> = index.into_bookmarks().into_iter().map(|b| b.endpoint).collect();
        assert_eq!(
            endpoints,
            vec![
                Endpoint::new("web1", "ssh"),
                Endpoint::new("web1", "mosh"),
                Endpoint::new("web2", "ssh"),
            ]
        );
    }

    #[test]
    fn test_first_port_wins() {
        let mut index = HostIndex::new();
        index.add("git.internal", "ssh", Some("2222"));
        index.add("git.internal", "ssh", Some("22"));
        index.add("git.internal", "ssh", None);

        let bookmarks = index.into_bookmarks();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].port.as_deref(), Some("2222"));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut index = HostIndex::new();
        for host in ["zeta", "alpha", "mid", "alpha"] {
            index.add(host, "ssh", None);
        }

        let hosts: Vec<String> = index
            .into_bookmarks()
            .into_iter()
            .map(|b| b.endpoint.host)
            .collect();
        assert_eq!(hosts, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_bookmark_url() {
        let plain = Bookmark {
            endpoint: Endpoint::new("example.com", "mosh"),
            port: None,
        };
        let ported = Bookmark {
            endpoint: Endpoint::new("example.com", "ssh"),
            port: Some("2222".to_string()),
        };

        assert_eq!(plain.url(), "mosh://example.com");
        assert_eq!(ported.to_string(), "ssh://example.com:2222");
    }
}
