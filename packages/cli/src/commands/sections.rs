use super::open_session;
use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;

#[derive(Subcommand, Debug)]
pub enum SectionsCommand {
    /// Show a page's sections in display order
    List {
        #[arg(default_value = "home")]
        page: String,
    },

    /// Show or hide a section
    Toggle { page: String, section: String },

    /// Set the display order; every section of the page must be listed once
    Reorder {
        page: String,
        #[arg(required = true)]
        sections: Vec<String>,
    },

    /// Restore the configured defaults
    Reset {
        page: Option<String>,

        /// Reset every page
        #[arg(long, conflicts_with = "page")]
        all: bool,
    },
}

pub fn sections(command: SectionsCommand, cwd: &str) -> Result<()> {
    let (config, mut session) = open_session(cwd)?;

    match command {
        SectionsCommand::List { page } => {
            for (position, section) in session
                .sections()
                .merge(&page, config.canonical(&page))
                .iter()
                .enumerate()
            {
                let marker = if section.enabled { "✓".green() } else { "✗".red() };
                println!("  {} {:>2}. {}", marker, position + 1, section.id);
            }
        }
        SectionsCommand::Toggle { page, section } => {
            session.toggle_section(&page, &section);
            session.save()?;
            let state = if session.sections().is_visible(&page, &section) {
                "shown".green()
            } else {
                "hidden".yellow()
            };
            println!("  {} {}/{} is now {}", "✓".green(), page, section, state);
        }
        SectionsCommand::Reorder { page, sections } => {
            session.reorder_sections(&page, config.canonical(&page), &sections)?;
            session.save()?;
            println!("  {} Reordered {}", "✓".green(), page);
        }
        SectionsCommand::Reset { page: _, all: true } => {
            session.reset_all_sections(&config.pages);
            session.save()?;
            println!("  {} Reset all pages", "✓".green());
        }
        SectionsCommand::Reset { page: Some(page), all: false } => {
            session.reset_sections(&page, config.canonical(&page));
            session.save()?;
            println!("  {} Reset {}", "✓".green(), page);
        }
        SectionsCommand::Reset { page: None, all: false } => {
            bail!("Name a page to reset, or pass --all");
        }
    }

    Ok(())
}
