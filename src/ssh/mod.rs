// ABOUTME: SSH file parsing module for ssh_config and known_hosts sources
// ABOUTME: Both parsers are lazy iterators so consumers can stop reading early

pub mod config_file;
pub mod known_hosts;
pub mod lines;

pub use config_file::{DEFAULT_SCHEME, HostBlock, parse_ssh_config, parse_ssh_config_with};
pub use known_hosts::{KnownHostsEntry, parse_known_hosts};
