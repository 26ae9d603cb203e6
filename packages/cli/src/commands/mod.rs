pub mod assets;
pub mod content;
pub mod init;
pub mod sections;
pub mod transfer;

pub use assets::{assets, AssetsCommand};
pub use content::{get, publish, revert, set, status, GetArgs, SetArgs};
pub use init::{init, InitArgs};
pub use sections::{sections, SectionsCommand};
pub use transfer::{export, import, ExportArgs, ImportArgs};

use crate::config::Config;
use anyhow::Result;
use sitedraft_common::FileStorage;
use sitedraft_workspace::AuthoringSession;

pub type Session = AuthoringSession<FileStorage>;

/// Open the file-backed session described by the config in `cwd`
pub fn open_session(cwd: &str) -> Result<(Config, Session)> {
    let config = Config::load(cwd)?;
    let storage = FileStorage::new(config.get_state_dir(cwd));
    let session = AuthoringSession::open(storage, config.session_options())?;
    Ok((config, session))
}
