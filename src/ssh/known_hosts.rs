// ABOUTME: Lazy known_hosts reader extracting nameable hosts and bracketed [host]:port entries
// ABOUTME: IP literals and hashed entries are dropped since they cannot be turned into bookmarks

use super::lines::LineScanner;
use anyhow::Result;
use regex::Regex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static PORTED_HOST: OnceLock<Regex> = OnceLock::new();
static IPV4_LITERAL: OnceLock<Regex> = OnceLock::new();
static IPV6_LITERAL: OnceLock<Regex> = OnceLock::new();

fn ported_host() -> &'static Regex {
    PORTED_HOST.get_or_init(|| {
        Regex::new(r"^\[(\S*[a-zA-Z]\S*)\]:([0-9]+)$").expect("Failed to compile [host]:port regex")
    })
}

fn ipv4_literal() -> &'static Regex {
    IPV4_LITERAL.get_or_init(|| Regex::new(r"^[0-9.]+$").expect("Failed to compile IPv4 regex"))
}

fn ipv6_literal() -> &'static Regex {
    // Deliberately loose: any run of lowercase hex digits and colons counts
    IPV6_LITERAL
        .get_or_init(|| Regex::new(r"^[a-f0-9:]+(%.*)?$").expect("Failed to compile IPv6 regex"))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnownHostsEntry {
    pub host: String,
    pub port: Option<String>,
}

impl KnownHostsEntry {
    pub fn new(host: &str, port: Option<&str>) -> Self {
        Self {
            host: host.to_string(),
            port: port.map(str::to_string),
        }
    }
}

/// Classify a single comma-separated token from the host list.
pub fn parse_host_token(token: &str) -> Option<KnownHostsEntry> {
    if let Some(caps) = ported_host().captures(token) {
        return Some(KnownHostsEntry::new(&caps[1], Some(&caps[2])));
    }

    let rejected = token.is_empty()
        || token.contains(' ')
        || token.starts_with('[')
        || token.starts_with('|')
        || ipv4_literal().is_match(token)
        || ipv6_literal().is_match(token);

    if rejected {
        None
    } else {
        Some(KnownHostsEntry::new(token, None))
    }
}

/// All usable entries on one known_hosts line.
pub fn parse_known_hosts_line(line: &str) -> Vec<KnownHostsEntry> {
    let line = line.trim();

    // Skip empty lines and comments
    if line.is_empty() || line.starts_with('#') {
        return Vec::new();
    }

    let mut fields = line.split_whitespace();
    let mut host_list = fields.next();
    // @cert-authority / @revoked push the host list one field to the right
    if host_list.is_some_and(|field| field.starts_with('@')) {
        host_list = fields.next();
    }

    match host_list {
        // Hashed entries can't be matched against anything meaningful
        Some(list) if !list.starts_with('|') => list.split(',').filter_map(parse_host_token).collect(),
        _ => Vec::new(),
    }
}

/// Lazy sequence of [`KnownHostsEntry`] values from one known_hosts file.
pub struct KnownHostsEntries {
    path: PathBuf,
    lines: LineScanner,
    pending: VecDeque<KnownHostsEntry>,
}

impl Iterator for KnownHostsEntries {
    type Item = KnownHostsEntry;

    fn next(&mut self) -> Option<KnownHostsEntry> {
        loop {
            if let Some(entry) = self.pending.pop_front() {
                return Some(entry);
            }

            match self.lines.next()? {
                Ok(line) => self.pending.extend(parse_known_hosts_line(&line)),
                Err(e) => {
                    tracing::warn!("Stopped reading {}: {}", self.path.display(), e);
                    return None;
                }
            }
        }
    }
}

pub fn parse_known_hosts(path: &Path) -> Result<KnownHostsEntries> {
    let lines = LineScanner::open(path)?;
    if lines.is_missing() {
        tracing::info!("Skipping missing known_hosts file {}", path.display());
    } else {
        tracing::info!("Parsing known_hosts file {}", path.display());
    }

    Ok(KnownHostsEntries {
        path: path.to_path_buf(),
        lines,
        pending: VecDeque::new(),
    })
}
