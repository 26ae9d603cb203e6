use super::{open_session, Session};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use serde_json::Value;
use sitedraft_editor::ContentState;

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Content path such as `blog[0].title` (whole document if omitted)
    pub path: Option<String>,

    /// Read the published snapshot instead of the draft
    #[arg(long)]
    pub published: bool,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Content path such as `hero.title`
    pub path: String,

    /// JSON value; anything that is not valid JSON is stored as a string
    pub value: String,
}

pub fn status(cwd: &str) -> Result<()> {
    let (config, session) = open_session(cwd)?;
    let state = session.state();

    let label = match state.content.state() {
        ContentState::Clean => "clean".green(),
        ContentState::Dirty => "unpublished changes".yellow(),
    };

    println!("{} {}", "Site:".bold(), state.content.draft()["site"]["name"]);
    println!("{} {}", "State:".bold(), label);
    println!("{} {}", "Template:".bold(), state.template);
    println!("{} {}", "Assets:".bold(), state.assets.len());
    println!(
        "{} {}",
        "Signed in:".bold(),
        if session.is_authenticated() { "yes" } else { "no" }
    );
    println!("{} {}", "Stored in:".bold(), config.get_state_dir(cwd).display());

    Ok(())
}

pub fn get(args: GetArgs, cwd: &str) -> Result<()> {
    let (_, session) = open_session(cwd)?;
    let value = read(&session, &args)?;
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read<'a>(session: &'a Session, args: &GetArgs) -> Result<&'a Value> {
    let tree = if args.published {
        session.content().published()
    } else {
        session.content().draft()
    };

    let Some(path) = &args.path else {
        return Ok(tree);
    };

    let path = path.parse::<sitedraft_editor::Path>()?;
    sitedraft_editor::path::get(tree, &path).ok_or_else(|| anyhow!("Nothing at {path}"))
}

pub fn set(args: SetArgs, cwd: &str) -> Result<()> {
    let (_, mut session) = open_session(cwd)?;
    let value = parse_value(&args.value);

    session.update_draft(&args.path, value)?;
    session.save()?;
    println!("  {} Set {}", "✓".green(), args.path.bright_white());

    Ok(())
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub fn publish(cwd: &str) -> Result<()> {
    let (_, mut session) = open_session(cwd)?;

    if !session.content().has_unsaved_changes() {
        println!("{}", "Nothing to publish".yellow());
        return Ok(());
    }

    session.publish();
    session.save()?;
    println!("{}", "✅ Draft published".green().bold());
    Ok(())
}

pub fn revert(cwd: &str) -> Result<()> {
    let (_, mut session) = open_session(cwd)?;
    session.revert();
    session.save()?;
    println!("  {} Draft reverted to the published version", "✓".green());
    Ok(())
}
