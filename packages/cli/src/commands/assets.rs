use super::open_session;
use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;
use sitedraft_editor::{Asset, AssetKind, AssetPatch};

#[derive(Subcommand, Debug)]
pub enum AssetsCommand {
    /// List the asset library
    List {
        /// Only show one type (image, logo, video)
        #[arg(short, long)]
        kind: Option<AssetKind>,
    },

    /// Drop an asset from the library (content keeps its URL)
    Remove { id: String },

    /// Change an asset's display name
    Rename { id: String, name: String },
}

pub fn assets(command: AssetsCommand, cwd: &str) -> Result<()> {
    let (_, mut session) = open_session(cwd)?;

    match command {
        AssetsCommand::List { kind } => {
            let library = &session.state().assets;
            let listed: Vec<&Asset> = match kind {
                Some(kind) => library.of_kind(kind).collect(),
                None => library.iter().collect(),
            };

            if listed.is_empty() {
                println!("{}", "No assets".yellow());
            }
            for asset in listed {
                println!("  {}", describe(asset));
            }
        }
        AssetsCommand::Remove { id } => {
            session
                .remove_asset(&id)
                .ok_or_else(|| anyhow!("Asset not found: {id}"))?;
            session.save()?;
            println!("  {} Removed {}", "✓".green(), id);
        }
        AssetsCommand::Rename { id, name } => {
            let asset = session.update_asset(&id, AssetPatch::rename(name))?;
            session.save()?;
            println!("  {} {}", "✓".green(), describe(&asset));
        }
    }

    Ok(())
}

fn describe(asset: &Asset) -> String {
    let size = match (asset.width, asset.height) {
        (Some(w), Some(h)) => format!(" {w}x{h}"),
        _ => String::new(),
    };
    format!(
        "{} {:?} [{:?}]{} {}",
        asset.id.bright_white(),
        asset.name,
        asset.kind,
        size,
        asset.url.dimmed()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn seed(cwd: &str) {
        let (_, mut session) = open_session(cwd).unwrap();
        session
            .add_asset(Asset {
                id: "logo-1".into(),
                url: "https://cdn.test/logo.png".into(),
                name: "logo.png".into(),
                kind: AssetKind::Logo,
                uploaded_at: Utc::now(),
                size: Some(10),
                width: Some(32),
                height: Some(32),
            })
            .unwrap();
    }

    #[test]
    fn test_rename_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        seed(cwd);

        assets(AssetsCommand::Rename { id: "logo-1".into(), name: "Brand".into() }, cwd).unwrap();
        let (_, session) = open_session(cwd).unwrap();
        assert_eq!(session.state().assets.get("logo-1").unwrap().name, "Brand");

        assets(AssetsCommand::Remove { id: "logo-1".into() }, cwd).unwrap();
        assert!(assets(AssetsCommand::Remove { id: "logo-1".into() }, cwd).is_err());
    }

    #[test]
    fn test_remove_reports_failed_save() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        seed(cwd);
        std::fs::create_dir_all(dir.path().join(".sitedraft/.site-content-storage.json.tmp"))
            .unwrap();

        assert!(assets(AssetsCommand::Remove { id: "logo-1".into() }, cwd).is_err());
    }

    #[test]
    fn test_rename_unknown_asset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = assets(
            AssetsCommand::Rename { id: "ghost".into(), name: "x".into() },
            dir.path().to_str().unwrap(),
        );
        assert!(result.is_err());
    }
}
