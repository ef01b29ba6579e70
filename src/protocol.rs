// ABOUTME: URL scheme resolution for discovered hosts with a pluggable override policy
// ABOUTME: Ships a pattern-based mosh policy that swaps or adds mosh for matching hosts

use anyhow::{Context, Result};
use regex::Regex;

pub const MOSH_SCHEME: &str = "mosh";

/// Policy hook deciding which schemes a group of hosts should be emitted
/// with. `None` or an empty list means "keep the default scheme".
pub trait ProtocolOverride {
    fn resolve(&self, hosts: &[String], scheme: &str) -> Option<Vec<String>>;
}

impl<F> ProtocolOverride for F
where
    F: Fn(&[String], &str) -> Option<Vec<String>>,
{
    fn resolve(&self, hosts: &[String], scheme: &str) -> Option<Vec<String>> {
        self(hosts, scheme)
    }
}

/// Final scheme list for one host group. The override is consulted exactly once.
pub fn resolve_schemes<O>(hosts: &[String], default_scheme: &str, policy: Option<&O>) -> Vec<String>
where
    O: ProtocolOverride + ?Sized,
{
    policy
        .and_then(|p| p.resolve(hosts, default_scheme))
        .filter(|schemes| !schemes.is_empty())
        .unwrap_or_else(|| vec![default_scheme.to_string()])
}

/// A host name pattern: plain substring, or a regex when written as `/.../`.
#[derive(Debug, Clone)]
pub enum MatchExpr {
    Substring(String),
    Pattern(Regex),
}

impl MatchExpr {
    pub fn parse(spec: &str) -> Result<Self> {
        match spec
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            Some(pattern) => Regex::new(pattern)
                .map(MatchExpr::Pattern)
                .with_context(|| format!("Invalid host regex: {spec}")),
            None => Ok(MatchExpr::Substring(spec.to_string())),
        }
    }

    pub fn is_match(&self, host: &str) -> bool {
        match self {
            MatchExpr::Substring(s) => host.contains(s.as_str()),
            MatchExpr::Pattern(re) => re.is_match(host),
        }
    }
}

/// Emit `mosh` for host groups that match any positive pattern and no
/// negative pattern. With `keep_ssh` the default scheme is kept alongside.
#[derive(Debug, Clone, Default)]
pub struct MoshPolicy {
    pub patterns: Vec<MatchExpr>,
    pub exclude_patterns: Vec<MatchExpr>,
    pub keep_ssh: bool,
}

impl MoshPolicy {
    pub fn from_specs(patterns: &[String], exclude_patterns: &[String], keep_ssh: bool) -> Result<Self> {
        Ok(Self {
            patterns: patterns.iter().map(|p| MatchExpr::parse(p)).collect::<Result<_>>()?,
            exclude_patterns: exclude_patterns
                .iter()
                .map(|p| MatchExpr::parse(p))
                .collect::<Result<_>>()?,
            keep_ssh,
        })
    }

    pub fn is_active(&self) -> bool {
        !self.patterns.is_empty()
    }

    fn any_host_matches(exprs: &[MatchExpr], hosts: &[String]) -> bool {
        exprs.iter().any(|e| hosts.iter().any(|h| e.is_match(h)))
    }
}

impl ProtocolOverride for MoshPolicy {
    fn resolve(&self, hosts: &[String], scheme: &str) -> Option<Vec<String>> {
        if !Self::any_host_matches(&self.patterns, hosts)
            || Self::any_host_matches(&self.exclude_patterns, hosts)
        {
            return None;
        }

        if self.keep_ssh && scheme != MOSH_SCHEME {
            Some(vec![scheme.to_string(), MOSH_SCHEME.to_string()])
        } else {
            Some(vec![MOSH_SCHEME.to_string()])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn hosts(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_no_override_returns_default() {
        let schemes = resolve_schemes::<MoshPolicy>(&hosts(&["web1"]), "ssh", None);
        assert_eq!(schemes, vec!["ssh"]);
    }

    #[test]
    fn test_override_called_once_per_group() {
        let calls = Cell::new(0);
        let policy = |_: &[String], _: &str| -> Option<Vec<String>> {
            calls.set(calls.get() + 1);
            Some(vec!["mosh".to_string()])
        };

        let schemes = resolve_schemes(&hosts(&["a", "b", "c"]), "ssh", Some(&policy));
        assert_eq!(schemes, vec!["mosh"]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_empty_override_falls_back() {
        let policy = |_: &[String], _: &str| -> Option<Vec<String>> { Some(Vec::new()) };
        assert_eq!(resolve_schemes(&hosts(&["a"]), "ssh", Some(&policy)), vec!["ssh"]);

        let declined = |_: &[String], _: &str| -> Option<Vec<String>> { None };
        assert_eq!(resolve_schemes(&hosts(&["a"]), "mosh", Some(&declined)), vec!["mosh"]);
    }

    #[test]
    fn test_match_expr_parsing() {
        assert!(matches!(MatchExpr::parse("example").unwrap(), MatchExpr::Substring(_)));
        assert!(matches!(MatchExpr::parse("/^db[0-9]+/").unwrap(), MatchExpr::Pattern(_)));
        assert!(MatchExpr::parse("/(unclosed/").is_err());

        let re = MatchExpr::parse(r"/^db[0-9]+\./").unwrap();
        assert!(re.is_match("db12.example.com"));
        assert!(!re.is_match("web.db1.example.com"));
    }

    #[test]
    fn test_mosh_policy_positive_and_negative() {
        let policy = MoshPolicy::from_specs(
            &["example.com".to_string()],
            &["/^bastion/".to_string()],
            false,
        )
        .unwrap();

        assert_eq!(policy.resolve(&hosts(&["web.example.com"]), "ssh"), Some(hosts(&["mosh"])));
        assert_eq!(policy.resolve(&hosts(&["web.other.org"]), "ssh"), None);
        // One excluded host in the group vetoes the whole group
        assert_eq!(
            policy.resolve(&hosts(&["web.example.com", "bastion.example.com"]), "ssh"),
            None
        );
    }

    #[test]
    fn test_mosh_policy_keep_ssh() {
        let policy = MoshPolicy::from_specs(&["lab".to_string()], &[], true).unwrap();

        assert_eq!(
            resolve_schemes(&hosts(&["lab1"]), "ssh", Some(&policy)),
            vec!["ssh", "mosh"]
        );
        assert_eq!(resolve_schemes(&hosts(&["lab1"]), "mosh", Some(&policy)), vec!["mosh"]);
    }

    #[test]
    fn test_inactive_policy() {
        let policy = MoshPolicy::default();
        assert!(!policy.is_active());
        assert_eq!(resolve_schemes(&hosts(&["anything"]), "ssh", Some(&policy)), vec!["ssh"]);
    }
}
