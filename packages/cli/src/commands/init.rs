use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sitedraft_common::{FileStorage, StateStorage};
use sitedraft_editor::TemplateId;
use sitedraft_workspace::AuthoringSession;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Template for the new site (classic, modern, bold)
    #[arg(short, long, default_value = "classic")]
    pub template: TemplateId,

    /// Directory for the saved session
    #[arg(short, long, default_value = ".sitedraft")]
    pub state_dir: String,

    /// Overwrite existing config and saved session
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Sitedraft site...".bright_blue().bold());

    let config = Config {
        state_dir: args.state_dir.clone(),
        template: args.template,
        ..Config::default()
    };

    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let storage = FileStorage::new(config.get_state_dir(cwd));
    if args.force {
        storage.remove(&config.namespace)?;
    }

    let session = AuthoringSession::open(storage, config.session_options())?;
    session.save()?;
    println!(
        "  {} Created {}/{}.json",
        "✓".green(),
        args.state_dir,
        config.namespace
    );

    println!();
    println!("{}", "✅ Site initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: sitedraft set site.name '\"My Studio\"'");
    println!("  2. Run: sitedraft publish");
    println!("  3. Run: sitedraft export");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::open_session;

    #[test]
    fn test_init_writes_config_and_state() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();

        init(
            InitArgs {
                template: TemplateId::Modern,
                state_dir: "state".into(),
                force: false,
            },
            cwd,
        )
        .unwrap();

        assert!(dir.path().join(DEFAULT_CONFIG_NAME).exists());
        assert!(dir.path().join("state/site-content-storage.json").exists());

        let (config, session) = open_session(cwd).unwrap();
        assert_eq!(config.template, TemplateId::Modern);
        assert_eq!(session.state().template, TemplateId::Modern);
    }

    #[test]
    fn test_force_discards_saved_session() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        let args = || InitArgs {
            template: TemplateId::Classic,
            state_dir: ".sitedraft".into(),
            force: true,
        };

        init(args(), cwd).unwrap();
        let (_, mut session) = open_session(cwd).unwrap();
        session.update_draft("site.name", "Old").unwrap();

        init(args(), cwd).unwrap();
        let (_, session) = open_session(cwd).unwrap();
        assert!(!session.content().has_unsaved_changes());
        assert_ne!(session.content().draft()["site"]["name"], "Old");
    }
}
