use super::open_session;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output directory (defaults to current directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Export file to load
    pub file: PathBuf,
}

pub fn export(args: ExportArgs, cwd: &str) -> Result<PathBuf> {
    let (_, session) = open_session(cwd)?;
    let envelope = session.export();

    let out_dir = args.out.unwrap_or_else(|| PathBuf::from(cwd));
    fs::create_dir_all(&out_dir)?;

    let path = out_dir.join(envelope.file_name());
    fs::write(&path, envelope.to_json_pretty()?)?;

    println!("  {} Exported to {}", "✓".green(), path.display());
    Ok(path)
}

pub fn import(args: ImportArgs, cwd: &str) -> Result<()> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("Cannot read {}", args.file.display()))?;

    let (_, mut session) = open_session(cwd)?;
    session.import(&raw)?;
    session.save()?;

    println!(
        "{} Imported {}",
        "✅".green(),
        args.file.display().to_string().bright_white()
    );
    Ok(())
}
