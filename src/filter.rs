// ABOUTME: Per-source include/exclude regex filters deciding which hosts become bookmarks
// ABOUTME: Filters are keyed by the source file they were declared for, written as FILE,REGEX

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub enum Condition {
    Include(Regex),
    Exclude(Regex),
}

fn split_spec(spec: &str) -> Result<(PathBuf, Regex)> {
    let (path, pattern) = spec
        .split_once(',')
        .with_context(|| format!("{spec} is not a valid condition spec: format is FILENAME,REGEX"))?;
    let regex = Regex::new(pattern).with_context(|| format!("Could not parse the host regex in {spec}"))?;
    Ok((PathBuf::from(path), regex))
}

impl Condition {
    pub fn include_from(spec: &str) -> Result<(PathBuf, Condition)> {
        let (path, regex) = split_spec(spec)?;
        Ok((path, Condition::Include(regex)))
    }

    pub fn exclude_from(spec: &str) -> Result<(PathBuf, Condition)> {
        let (path, regex) = split_spec(spec)?;
        Ok((path, Condition::Exclude(regex)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct HostFilters {
    map: HashMap<PathBuf, Vec<Condition>>,
}

impl HostFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(includes: &[String], excludes: &[String]) -> Result<Self> {
        let mut filters = Self::new();
        for spec in includes {
            let (path, cond) = Condition::include_from(spec)?;
            filters.add(path, cond);
        }
        for spec in excludes {
            let (path, cond) = Condition::exclude_from(spec)?;
            filters.add(path, cond);
        }
        Ok(filters)
    }

    pub fn add(&mut self, path: PathBuf, cond: Condition) {
        self.map.entry(path).or_default().push(cond);
    }

    /// Whether `host` discovered in `source` should be emitted.
    pub fn eligible(&self, host: &str, source: &Path) -> bool {
        if host.contains('*') || host.contains('?') {
            return false;
        }

        let Some(conds) = self.map.get(source) else {
            return true;
        };

        let mut default = true;
        for cond in conds {
            match cond {
                Condition::Include(pat) => {
                    if pat.is_match(host) {
                        return true;
                    }
                    default = false;
                }
                Condition::Exclude(pat) => {
                    if pat.is_match(host) {
                        return false;
                    }
                }
            }
        }
        default
    }
}
