//! news-view - What's new on a page and all of its children.

mod cli;
mod config;
mod core;
mod feed;
mod logger;
mod page;
mod redirect;
mod render;
mod utils;
mod view;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, common::Site};
use config::NewsViewConfig;
use view::ViewRegistry;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let mut registry = ViewRegistry::new();
    view::news::register(&mut registry)?;

    match &cli.command {
        Commands::Views => cli::inspect::list_views(&registry),
        Commands::Inspect { page, view } => {
            let site = Site::load(NewsViewConfig::load(&cli)?, registry)?;
            cli::inspect::inspect_page(&site, page, view)
        }
        Commands::Serve { .. } => {
            let site = Site::load(NewsViewConfig::load(&cli)?, registry)?;
            cli::serve::serve(site)
        }
    }
}
