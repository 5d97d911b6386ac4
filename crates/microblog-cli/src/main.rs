//! Microblog CLI
//!
//! Command-line interface for microblog - publish short posts and page
//! through them.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use microblog_core::{Config, Store};

mod commands;
mod editor;
mod logging;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "microblog")]
#[command(about = "Microblog - a very plain twitter style publishing log")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a post (reads stdin or opens $EDITOR if TEXT is omitted)
    #[command(alias = "add")]
    Post {
        /// Post text; ` #tag` words become tags
        text: Option<String>,
    },
    /// List a page of posts (default command)
    #[command(alias = "ls")]
    List {
        /// Posts older than this index, newest first
        #[arg(long, value_name = "INDEX")]
        older: Option<String>,
        /// Posts from this index on, oldest first
        #[arg(long, value_name = "INDEX")]
        newer: Option<String>,
        /// Only posts with this tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Page size (defaults to config page_size)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show one post
    Show {
        /// Post index
        index: usize,
    },
    /// List all tags
    Tags,
    /// Show status (storage, post count)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, page_size, log_file, blog.title, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Commands that don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    logging::init(&config);

    let store = Store::open_with_config(&config).with_context(|| {
        format!(
            "Failed to open entries file {:?}",
            config.entries_path()
        )
    })?;

    let command = cli.command.unwrap_or(Commands::List {
        older: None,
        newer: None,
        tag: None,
        limit: None,
    });

    match command {
        Commands::Post { text } => commands::post::create(&store, text, &output),
        Commands::List {
            older,
            newer,
            tag,
            limit,
        } => commands::post::list(&store, older, newer, tag, limit, &output),
        Commands::Show { index } => commands::post::show(&store, index, &output),
        Commands::Tags => commands::tag::list(&store, &output),
        Commands::Status => commands::status::show(&store, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}
