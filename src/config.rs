// ABOUTME: Configuration structures and TOML loading for source files, mosh policy and output
// ABOUTME: Command-line flags are layered on top of whatever the config file provides

use crate::discovery::Sources;
use crate::filter::HostFilters;
use crate::protocol::MoshPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub mosh: MoshConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SourcesConfig {
    #[serde(default = "default_ssh_config_files")]
    pub ssh_config_files: Vec<String>,
    #[serde(default = "default_known_hosts_files")]
    pub known_hosts_files: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct MoshConfig {
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    #[serde(default)]
    pub keep_ssh: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct FiltersConfig {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SuggestConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct OutputConfig {
    pub directory: Option<String>,
}

fn default_ssh_config_files() -> Vec<String> {
    vec!["/etc/ssh/ssh_config".to_string(), "~/.ssh/config".to_string()]
}

fn default_known_hosts_files() -> Vec<String> {
    vec!["/etc/ssh/known_hosts".to_string(), "~/.ssh/known_hosts".to_string()]
}

fn default_max_results() -> usize {
    50
}

fn default_case_sensitive() -> bool {
    true
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            ssh_config_files: default_ssh_config_files(),
            known_hosts_files: default_known_hosts_files(),
        }
    }
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            case_sensitive: default_case_sensitive(),
        }
    }
}

impl Config {
    pub fn default_config_content() -> &'static str {
        r#"# ssh-bookmarker configuration

[sources]
# Files are read in order: all ssh_config files first, then known_hosts files.
# Missing files are skipped.
ssh_config_files = ["/etc/ssh/ssh_config", "~/.ssh/config"]
known_hosts_files = ["/etc/ssh/known_hosts", "~/.ssh/known_hosts"]

[mosh]
# Emit mosh:// instead of ssh:// for host groups matching any of these.
# Plain strings match as substrings; wrap in slashes for a regex: "/^db[0-9]+/"
patterns = []
# Never emit mosh for host groups matching any of these
exclude_patterns = []
# Keep the ssh:// bookmark next to the mosh:// one
keep_ssh = false

[filters]
# Per-source host filters written as "FILE,REGEX"
include = []
exclude = []

[suggest]
max_results = 50
case_sensitive = true

[output]
# Bookmark directory used by `create` when none is given on the command line
# directory = "~/Library/Bookmarks/SSH"
"#
    }

    pub fn load_from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::load_from_str(&content)
    }

    /// Load `path`, or the defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::load_from_file(path)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
        Ok(config_dir.join("ssh-bookmarker").join("config.toml"))
    }

    pub fn expand_paths(&mut self) -> Result<()> {
        for path in self
            .sources
            .ssh_config_files
            .iter_mut()
            .chain(self.sources.known_hosts_files.iter_mut())
        {
            *path = expand_tilde(path)?;
        }
        for spec in self.filters.include.iter_mut().chain(self.filters.exclude.iter_mut()) {
            *spec = expand_filter_spec(spec)?;
        }
        if let Some(dir) = self.output.directory.as_mut() {
            *dir = expand_tilde(dir)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.suggest.max_results == 0 {
            anyhow::bail!("max_results must be greater than 0");
        }

        if self.sources.ssh_config_files.is_empty() && self.sources.known_hosts_files.is_empty() {
            anyhow::bail!("At least one ssh_config or known_hosts file must be configured");
        }

        self.mosh_policy().context("Invalid mosh pattern")?;
        self.host_filters().context("Invalid host filter")?;

        Ok(())
    }

    pub fn sources(&self) -> Sources {
        Sources {
            ssh_config_files: self.sources.ssh_config_files.iter().map(PathBuf::from).collect(),
            known_hosts_files: self.sources.known_hosts_files.iter().map(PathBuf::from).collect(),
        }
    }

    pub fn mosh_policy(&self) -> Result<MoshPolicy> {
        MoshPolicy::from_specs(&self.mosh.patterns, &self.mosh.exclude_patterns, self.mosh.keep_ssh)
    }

    pub fn host_filters(&self) -> Result<HostFilters> {
        HostFilters::from_specs(&self.filters.include, &self.filters.exclude)
    }

    pub fn save_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config to: {}", path.display()))?;

        Ok(())
    }
}

pub fn expand_tilde(path: &str) -> Result<String> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(rest).to_string_lossy().into_owned())
    } else {
        Ok(path.to_string())
    }
}

// Filters are keyed by file, so the FILE half has to match the expanded sources
fn expand_filter_spec(spec: &str) -> Result<String> {
    match spec.split_once(',') {
        Some((path, pattern)) => Ok(format!("{},{}", expand_tilde(path)?, pattern)),
        None => Ok(spec.to_string()),
    }
}
