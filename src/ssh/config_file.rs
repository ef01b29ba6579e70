// ABOUTME: Lazy ssh_config reader that yields Host declarations with their URL scheme annotations
// ABOUTME: Follows Include directives depth-first and never visits the same file twice per traversal

use super::lines::LineScanner;
use anyhow::Result;
use regex::Regex;
use std::collections::{HashSet, VecDeque};
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_SCHEME: &str = "ssh";

static HOST_LINE: OnceLock<Regex> = OnceLock::new();
static INCLUDE_LINE: OnceLock<Regex> = OnceLock::new();
static SCHEME_COMMENT: OnceLock<Regex> = OnceLock::new();

fn host_line() -> &'static Regex {
    HOST_LINE.get_or_init(|| {
        Regex::new(r"^\s*(?i:host)\s+([^#]+?)\s*(#.*)?$").expect("Failed to compile Host regex")
    })
}

fn include_line() -> &'static Regex {
    INCLUDE_LINE.get_or_init(|| {
        Regex::new(r"^\s*(?i:include)\s+(.+)").expect("Failed to compile Include regex")
    })
}

fn scheme_comment() -> &'static Regex {
    SCHEME_COMMENT.get_or_init(|| Regex::new(r"^#:(.*)$").expect("Failed to compile scheme regex"))
}

/// One `Host` line paired with one of the schemes it was annotated with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostBlock {
    pub hosts: Vec<String>,
    pub scheme: String,
}

/// Scheme list from a trailing `#:scheme1,scheme2` comment, `["ssh"]` otherwise.
pub fn extract_schemes(comment: Option<&str>) -> Vec<String> {
    let schemes: Vec<String> = comment
        .and_then(|c| scheme_comment().captures(c.trim_end()))
        .map(|caps| {
            caps[1]
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if schemes.is_empty() {
        vec![DEFAULT_SCHEME.to_string()]
    } else {
        schemes
    }
}

/// Parse a single `Host` line into one block per declared scheme. Lines
/// with any wildcard pattern produce nothing at all.
pub fn parse_host_line(line: &str) -> Option<Vec<HostBlock>> {
    let caps = host_line().captures(line)?;
    let hosts: Vec<String> = caps[1].split_whitespace().map(str::to_string).collect();
    if hosts.is_empty() {
        return None;
    }
    if hosts.iter().any(|h| h.contains('*')) {
        return Some(Vec::new());
    }

    let schemes = extract_schemes(caps.get(2).map(|m| m.as_str()));
    Some(
        schemes
            .into_iter()
            .map(|scheme| HostBlock {
                hosts: hosts.clone(),
                scheme,
            })
            .collect(),
    )
}

/// Target of an `Include` line, resolved against `base_dir`.
pub fn parse_include_line(line: &str, base_dir: &Path) -> Option<PathBuf> {
    let caps = include_line().captures(line)?;
    let target = caps[1].trim_end();
    if target.is_empty() {
        return None;
    }
    Some(resolve_include(target, base_dir))
}

fn resolve_include(target: &str, base_dir: &Path) -> PathBuf {
    let expanded = match (target.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(target),
    };

    if expanded.is_absolute() {
        normalize(&expanded)
    } else {
        normalize(&base_dir.join(expanded))
    }
}

// Lexical cleanup only: symlinks are left alone
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path)
        .map(|p| normalize(&p))
        .unwrap_or_else(|_| normalize(path))
}

struct Frame {
    path: PathBuf,
    base_dir: PathBuf,
    lines: LineScanner,
    exhausted: bool,
    pending: VecDeque<HostBlock>,
    includes: VecDeque<PathBuf>,
}

impl Frame {
    fn new(path: PathBuf, lines: LineScanner) -> Self {
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            path,
            base_dir,
            lines,
            exhausted: false,
            pending: VecDeque::new(),
            includes: VecDeque::new(),
        }
    }

    fn read_line(&mut self, line: &str) {
        if let Some(blocks) = parse_host_line(line) {
            tracing::trace!("Got {} host block(s) from {}", blocks.len(), self.path.display());
            self.pending.extend(blocks);
        } else if let Some(include) = parse_include_line(line, &self.base_dir) {
            if !self.includes.contains(&include) {
                self.includes.push_back(include);
            }
        }
    }
}

/// Lazy sequence of [`HostBlock`]s from one top-level ssh_config file and
/// everything it includes. A file's own Host lines come before any of its
/// includes, and includes are walked in the order they were declared.
pub struct ConfigEntries {
    stack: Vec<Frame>,
    visited: HashSet<PathBuf>,
}

impl ConfigEntries {
    /// Hand back the visited set so a caller can continue the same
    /// traversal with another top-level file.
    pub fn into_visited(self) -> HashSet<PathBuf> {
        self.visited
    }
}

impl Iterator for ConfigEntries {
    type Item = HostBlock;

    fn next(&mut self) -> Option<HostBlock> {
        loop {
            let frame = self.stack.last_mut()?;

            if let Some(block) = frame.pending.pop_front() {
                return Some(block);
            }

            if !frame.exhausted {
                match frame.lines.next() {
                    Some(Ok(line)) => frame.read_line(&line),
                    Some(Err(e)) => {
                        tracing::warn!("Stopped reading {}: {}", frame.path.display(), e);
                        frame.exhausted = true;
                        frame.includes.clear();
                    }
                    None => frame.exhausted = true,
                }
                continue;
            }

            let Some(include) = frame.includes.pop_front() else {
                self.stack.pop();
                continue;
            };

            if !self.visited.insert(include.clone()) {
                tracing::debug!("Already traversed {}, skipping", include.display());
                continue;
            }

            tracing::debug!("Found & will traverse included file {}", include.display());
            match LineScanner::open(&include) {
                Ok(lines) if lines.is_missing() => {
                    tracing::debug!("Included file {} does not exist", include.display());
                }
                Ok(lines) => self.stack.push(Frame::new(include, lines)),
                Err(e) => tracing::warn!("{:#}", e),
            }
        }
    }
}

/// Start a fresh traversal of `path`.
pub fn parse_ssh_config(path: &Path) -> Result<ConfigEntries> {
    parse_ssh_config_with(path, HashSet::new())
}

/// Continue a traversal whose already-visited files are in `visited`.
/// A top-level file that was already pulled in by an earlier Include is
/// not read again.
pub fn parse_ssh_config_with(path: &Path, mut visited: HashSet<PathBuf>) -> Result<ConfigEntries> {
    let root = absolute(path);
    let mut stack = Vec::new();

    if !visited.insert(root.clone()) {
        tracing::debug!("SSH config file {} was already included, skipping", root.display());
        return Ok(ConfigEntries { stack, visited });
    }

    let lines = LineScanner::open(&root)?;
    if lines.is_missing() {
        tracing::info!("Skipping missing SSH config file {}", path.display());
    } else {
        tracing::info!("Parsing SSH config file {}", path.display());
        stack.push(Frame::new(root, lines));
    }

    Ok(ConfigEntries { stack, visited })
}
