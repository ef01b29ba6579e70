// ABOUTME: Command-line interface definition for creating bookmarks and querying suggestions
// ABOUTME: Flags extend the configuration file rather than replacing it

use crate::config::Config;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ssh-bookmarker")]
#[command(version, about = "Create SSH (and mosh) bookmarks from known_hosts and ssh_config files.")]
#[command(after_help = "Patterns can be either substring matches or regexes, if wrapped in //")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file to read instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Add a file to the list of ssh_config files
    #[arg(short = 'c', long = "ssh-config", global = true, value_name = "FILE")]
    pub ssh_config: Vec<String>,

    /// Add a file to the list of known_hosts files
    #[arg(short = 'k', long = "known-hosts", global = true, value_name = "FILE")]
    pub known_hosts: Vec<String>,

    /// Emit a mosh bookmark for host names matching PATTERN
    #[arg(short = 'm', long = "mosh", global = true, value_name = "PATTERN")]
    pub mosh: Vec<String>,

    /// Prevent emitting a mosh bookmark for host names matching PATTERN
    #[arg(short = 'M', long = "prevent-mosh", global = true, value_name = "PATTERN")]
    pub prevent_mosh: Vec<String>,

    /// Keep the ssh bookmark next to the mosh one
    #[arg(long, global = true)]
    pub keep_ssh: bool,

    /// Only take hosts from FILE that match REGEX
    #[arg(long = "include-hosts", global = true, value_name = "FILE,REGEX")]
    pub include_hosts: Vec<String>,

    /// Drop hosts from FILE that match REGEX
    #[arg(long = "exclude-hosts", global = true, value_name = "FILE,REGEX")]
    pub exclude_hosts: Vec<String>,

    /// More debug output; repeat for more
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write one bookmark per discovered host into DIR
    #[command(alias = "c")]
    Create { dir: Option<PathBuf> },
    /// Print hosts matching QUERY as ranked JSON
    #[command(alias = "s")]
    Suggest { query: String },
    /// Print every discovered endpoint as a URL
    #[command(alias = "l")]
    List {
        /// Print (host, scheme, port) records as a JSON array instead
        #[arg(long)]
        json: bool,
    },
    /// Write the default configuration file
    InitConfig,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Layer the command-line flags over a loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        config.sources.ssh_config_files.extend(self.ssh_config.iter().cloned());
        config.sources.known_hosts_files.extend(self.known_hosts.iter().cloned());
        config.mosh.patterns.extend(self.mosh.iter().cloned());
        config.mosh.exclude_patterns.extend(self.prevent_mosh.iter().cloned());
        config.mosh.keep_ssh |= self.keep_ssh;
        config.filters.include.extend(self.include_hosts.iter().cloned());
        config.filters.exclude.extend(self.exclude_hosts.iter().cloned());
    }
}
