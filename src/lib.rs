// ABOUTME: Library root for ssh-bookmarker host discovery, ranking and bookmark output
// ABOUTME: The binary in main.rs is a thin layer over these modules

pub mod bookmark;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod filter;
pub mod index;
pub mod logging;
pub mod protocol;
pub mod ssh;
pub mod suggest;
