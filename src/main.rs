// ABOUTME: Entry point wiring configuration, discovery and the chosen output together
// ABOUTME: Bookmarks go to a directory, suggestions and listings go to stdout

use anyhow::{Context, Result};
use ssh_bookmarker::bookmark::{WeblocWriter, write_all};
use ssh_bookmarker::cli::{CommandLine, Commands};
use ssh_bookmarker::config::Config;
use ssh_bookmarker::discovery::Discovery;
use ssh_bookmarker::logging::init_logging;
use std::path::PathBuf;

fn main() -> Result<()> {
    let cli = CommandLine::parse_args();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::InitConfig => init_config(&cli),
        Commands::Create { dir } => {
            let config = load_config(&cli)?;
            create(&config, dir.clone())
        }
        Commands::Suggest { query } => {
            let config = load_config(&cli)?;
            let suggestions = build_discovery(&config)?.suggest(
                query,
                config.suggest.case_sensitive,
                config.suggest.max_results,
            );
            println!("{}", serde_json::to_string(&suggestions)?);
            Ok(())
        }
        Commands::List { json } => {
            let config = load_config(&cli)?;
            let bookmarks = build_discovery(&config)?.bookmarks();
            if *json {
                println!("{}", serde_json::to_string(&bookmarks)?);
            } else {
                for bookmark in &bookmarks {
                    println!("{bookmark}");
                }
            }
            Ok(())
        }
    }
}

fn config_path(cli: &CommandLine) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => Config::default_config_path(),
    }
}

fn load_config(cli: &CommandLine) -> Result<Config> {
    let path = config_path(cli)?;

    // An explicitly named config file has to exist
    let mut config = if cli.config.is_some() {
        Config::load_from_file(&path)?
    } else {
        Config::load_or_default(&path)?
    };

    cli.apply_to(&mut config);
    config.expand_paths()?;
    config.validate()?;
    Ok(config)
}

fn build_discovery(config: &Config) -> Result<Discovery> {
    let mut discovery = Discovery::new(config.sources()).with_filters(config.host_filters()?);

    let policy = config.mosh_policy()?;
    if policy.is_active() {
        discovery = discovery.with_override(policy);
    }

    Ok(discovery)
}

fn create(config: &Config, dir: Option<PathBuf>) -> Result<()> {
    let dir = dir
        .or_else(|| config.output.directory.as_ref().map(PathBuf::from))
        .context("No bookmark directory given and [output] directory is not configured")?;

    let writer = WeblocWriter::new(dir);
    writer.prepare()?;

    let bookmarks = build_discovery(config)?.bookmarks();
    let written = write_all(&writer, &bookmarks);
    tracing::info!(
        "Wrote {} of {} bookmark(s) to {}",
        written,
        bookmarks.len(),
        writer.dir().display()
    );

    Ok(())
}

fn init_config(cli: &CommandLine) -> Result<()> {
    let path = config_path(cli)?;
    if path.exists() {
        anyhow::bail!("Configuration file already exists: {}", path.display());
    }

    Config::save_default_config(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
