mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    assets, export, get, import, init, publish, revert, sections, set, status, AssetsCommand,
    ExportArgs, GetArgs, ImportArgs, InitArgs, SectionsCommand, SetArgs,
};

/// Sitedraft CLI - edit, publish and move site content from the terminal
#[derive(Parser, Debug)]
#[command(name = "sitedraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new site in the current directory
    Init(InitArgs),

    /// Show draft/published state
    Status,

    /// Print content from the draft
    Get(GetArgs),

    /// Change a value in the draft
    Set(SetArgs),

    /// Make the draft the published version
    Publish,

    /// Throw away unpublished changes
    Revert,

    /// Section visibility and order
    Sections {
        #[command(subcommand)]
        command: SectionsCommand,
    },

    /// Asset library
    Assets {
        #[command(subcommand)]
        command: AssetsCommand,
    },

    /// Write the site to an export file
    Export(ExportArgs),

    /// Replace the site with an export file
    Import(ImportArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()
        .context("Cannot get current directory")?
        .display()
        .to_string();

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Status => status(&cwd),
        Command::Get(args) => get(args, &cwd),
        Command::Set(args) => set(args, &cwd),
        Command::Publish => publish(&cwd),
        Command::Revert => revert(&cwd),
        Command::Sections { command } => sections(command, &cwd),
        Command::Assets { command } => assets(command, &cwd),
        Command::Export(args) => export(args, &cwd).map(|_| ()),
        Command::Import(args) => import(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
