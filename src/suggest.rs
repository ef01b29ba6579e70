// ABOUTME: Substring ranking of discovered hosts for interactive "find host" suggestions
// ABOUTME: Earlier match position wins, ties go to whichever host was discovered first

use crate::index::Endpoint;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedEntry {
    pub endpoint: Endpoint,
    pub precision: usize,
    pub position: usize,
}

impl RankedEntry {
    fn relevance(&self) -> (usize, usize) {
        (self.precision, self.position)
    }
}

/// Presentation record handed to the launcher as JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub title: String,
    pub label: String,
    pub badge: String,
}

impl From<&RankedEntry> for Suggestion {
    fn from(entry: &RankedEntry) -> Self {
        Self {
            title: format!("{}://{}", entry.endpoint.scheme, entry.endpoint.host),
            label: entry.endpoint.host.clone(),
            badge: entry.endpoint.scheme.clone(),
        }
    }
}

pub struct Suggester {
    query: String,
    case_sensitive: bool,
    seen: HashSet<Endpoint>,
    entries: Vec<RankedEntry>,
    next_position: usize,
}

impl Suggester {
    pub fn new(query: &str, case_sensitive: bool) -> Self {
        let query = if case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };

        Self {
            query,
            case_sensitive,
            seen: HashSet::new(),
            entries: Vec::new(),
            next_position: 0,
        }
    }

    /// Zero-based character index of the query inside `host`, if present.
    /// Case folding can change a string's length, so insensitive matches
    /// are tried at each character of the original host instead.
    pub fn match_precision(&self, host: &str) -> Option<usize> {
        if self.case_sensitive {
            return host
                .find(&self.query)
                .map(|byte_idx| host[..byte_idx].chars().count());
        }

        host.char_indices()
            .position(|(byte_idx, _)| host[byte_idx..].to_lowercase().starts_with(&self.query))
    }

    /// Consider a discovered host. Returns true when it was recorded as a
    /// new candidate; non-matching hosts and repeated pairs are ignored.
    pub fn offer(&mut self, host: &str, scheme: &str) -> bool {
        let Some(precision) = self.match_precision(host) else {
            return false;
        };

        let endpoint = Endpoint::new(host, scheme);
        if !self.seen.insert(endpoint.clone()) {
            return false;
        }

        tracing::trace!("Candidate {}://{} at {}", scheme, host, precision);
        self.entries.push(RankedEntry {
            endpoint,
            precision,
            position: self.next_position,
        });
        self.next_position += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ranked(mut self) -> Vec<RankedEntry> {
        self.entries.sort_by_key(RankedEntry::relevance);
        self.entries
    }

    pub fn suggestions(self, max_results: usize) -> Vec<Suggestion> {
        self.ranked()
            .iter()
            .take(max_results)
            .map(Suggestion::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.label.as_str()).collect()
    }

    #[test]
    fn test_precision_then_discovery_order() {
        let mut suggester = Suggester::new("ab", true);
        for host in ["xyzab", "abc", "ab"] {
            suggester.offer(host, "ssh");
        }

        let ranked = suggester.ranked();
        let summary: Vec<(&str, usize, usize)> = ranked
            .iter()
            .map(|e| (e.endpoint.host.as_str(), e.precision, e.position))
            .collect();

        assert_eq!(summary, vec![("abc", 0, 1), ("ab", 0, 2), ("xyzab", 3, 0)]);
    }

    #[test]
    fn test_non_matching_hosts_are_omitted() {
        let mut suggester = Suggester::new("prod", true);
        assert!(suggester.is_empty());
        assert!(!suggester.offer("staging", "ssh"));
        assert!(suggester.is_empty());
        assert!(suggester.offer("production", "ssh"));
        assert!(!suggester.offer("staging", "ssh"));

        let suggestions = suggester.suggestions(10);
        assert_eq!(labels(&suggestions), vec!["production"]);
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let mut suggester = Suggester::new("git", true);
        assert!(suggester.offer("github.com", "ssh"));
        assert!(suggester.offer("git.internal", "ssh"));
        assert!(!suggester.offer("github.com", "ssh"));
        assert!(suggester.offer("github.com", "mosh"));

        let ranked = suggester.ranked();
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].endpoint, Endpoint::new("github.com", "ssh"));
        assert_eq!(ranked[1].endpoint, Endpoint::new("git.internal", "ssh"));
        assert_eq!(ranked[2].endpoint, Endpoint::new("github.com", "mosh"));
    }

    #[test]
    fn test_case_sensitivity() {
        let mut sensitive = Suggester::new("server", true);
        sensitive.offer("Server1", "ssh");
        sensitive.offer("server2", "ssh");
        assert_eq!(labels(&sensitive.suggestions(10)), vec!["server2"]);

        let mut insensitive = Suggester::new("SERVER", false);
        insensitive.offer("Server1", "ssh");
        insensitive.offer("server2", "ssh");
        // Labels keep the original spelling
        assert_eq!(labels(&insensitive.suggestions(10)), vec!["Server1", "server2"]);
    }

    #[test]
    fn test_precision_counts_characters() {
        let suggester = Suggester::new("box", true);
        assert_eq!(suggester.match_precision("büro-box"), Some(5));
        assert_eq!(suggester.match_precision("nothing"), None);
    }

    #[test]
    fn test_insensitive_precision_counts_original_characters() {
        // 'İ' lower-cases to two characters
        let suggester = Suggester::new("BOX", false);
        assert_eq!(suggester.match_precision("İstanbul-box"), Some(9));
        assert_eq!(suggester.match_precision("Box"), Some(0));
        assert_eq!(suggester.match_precision("crate"), None);
    }

    #[test]
    fn test_max_results_limit() {
        let mut suggester = Suggester::new("server", true);
        for i in 0..100 {
            suggester.offer(&format!("server{i}.example.com"), "ssh");
        }
        assert_eq!(suggester.len(), 100);

        let suggestions = suggester.suggestions(5);
        assert_eq!(suggestions.len(), 5);
        assert_eq!(suggestions[0].label, "server0.example.com");
    }

    #[test]
    fn test_empty_query_keeps_discovery_order() {
        let mut suggester = Suggester::new("", true);
        for host in ["one", "two", "three"] {
            suggester.offer(host, "ssh");
        }
        assert_eq!(labels(&suggester.suggestions(10)), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_suggestion_record_shape() {
        let mut suggester = Suggester::new("web", true);
        suggester.offer("web1", "mosh");

        let json = serde_json::to_value(suggester.suggestions(1)).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"title": "mosh://web1", "label": "web1", "badge": "mosh"}])
        );
    }
}
