// ABOUTME: Top-level host discovery driver combining ssh_config and known_hosts sources
// ABOUTME: Produces deduplicated bookmarks or ranked suggestions, isolating failures per file

use crate::filter::HostFilters;
use crate::index::{Bookmark, HostIndex};
use crate::protocol::{ProtocolOverride, resolve_schemes};
use crate::ssh::{DEFAULT_SCHEME, parse_known_hosts, parse_ssh_config, parse_ssh_config_with};
use crate::suggest::{Suggester, Suggestion};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Ordered input files. Config files are always read before known_hosts files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sources {
    pub ssh_config_files: Vec<PathBuf>,
    pub known_hosts_files: Vec<PathBuf>,
}

pub struct Discovery {
    sources: Sources,
    policy: Option<Box<dyn ProtocolOverride>>,
    filters: HostFilters,
}

impl Discovery {
    pub fn new(sources: Sources) -> Self {
        Self {
            sources,
            policy: None,
            filters: HostFilters::new(),
        }
    }

    pub fn with_override<P>(mut self, policy: P) -> Self
    where
        P: ProtocolOverride + 'static,
    {
        self.policy = Some(Box::new(policy));
        self
    }

    pub fn with_filters(mut self, filters: HostFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Every endpoint found in the sources, deduplicated by `(host, scheme)`
    /// and kept in discovery order.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        let mut index = HostIndex::new();
        let mut visited = HashSet::new();

        for path in &self.sources.ssh_config_files {
            let mut entries = match parse_ssh_config_with(path, visited.clone()) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Could not read SSH config file {} ({:#}), continuing", path.display(), e);
                    continue;
                }
            };

            for block in entries.by_ref() {
                let schemes = resolve_schemes(&block.hosts, &block.scheme, self.policy.as_deref());
                for scheme in &schemes {
                    for host in &block.hosts {
                        self.record(&mut index, host, scheme, None, path);
                    }
                }
            }
            visited = entries.into_visited();
        }

        for path in &self.sources.known_hosts_files {
            let entries = match parse_known_hosts(path) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Could not read known_hosts file {} ({:#}), continuing", path.display(), e);
                    continue;
                }
            };

            for entry in entries {
                let hosts = [entry.host];
                let schemes = resolve_schemes(&hosts, DEFAULT_SCHEME, self.policy.as_deref());
                for scheme in &schemes {
                    self.record(&mut index, &hosts[0], scheme, entry.port.as_deref(), path);
                }
            }
        }

        if index.is_empty() {
            tracing::warn!("No hosts found in any source file");
        } else {
            tracing::info!("Discovered {} endpoint(s)", index.len());
        }
        index.into_bookmarks()
    }

    fn record(&self, index: &mut HostIndex, host: &str, scheme: &str, port: Option<&str>, source: &Path) {
        if !self.filters.eligible(host, source) {
            tracing::debug!("Skipping ineligible host {} from {}", host, source.display());
            return;
        }

        if index.add(host, scheme, port) {
            tracing::debug!(?port, "Making host entry for {}://{}", scheme, host);
        }
    }

    /// Hosts containing `query`, best match first. Schemes come straight
    /// from the files; the protocol override is not consulted here.
    pub fn suggest(&self, query: &str, case_sensitive: bool, max_results: usize) -> Vec<Suggestion> {
        let mut suggester = Suggester::new(query, case_sensitive);

        for path in &self.sources.ssh_config_files {
            match parse_ssh_config(path) {
                Ok(entries) => {
                    for block in entries {
                        for host in &block.hosts {
                            if self.filters.eligible(host, path) {
                                suggester.offer(host, &block.scheme);
                            }
                        }
                    }
                }
                Err(e) => tracing::warn!("Could not read SSH config file {} ({:#}), continuing", path.display(), e),
            }
        }

        for path in &self.sources.known_hosts_files {
            match parse_known_hosts(path) {
                Ok(entries) => {
                    for entry in entries {
                        if self.filters.eligible(&entry.host, path) {
                            suggester.offer(&entry.host, DEFAULT_SCHEME);
                        }
                    }
                }
                Err(e) => tracing::warn!("Could not read known_hosts file {} ({:#}), continuing", path.display(), e),
            }
        }

        if suggester.is_empty() {
            tracing::debug!("No host matches {:?}", query);
        } else {
            tracing::debug!("Ranking {} candidate(s) for {:?}", suggester.len(), query);
        }
        suggester.suggestions(max_results)
    }
}
