use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

pub struct Config {
    pub store_path: PathBuf,
    pub data_dir: PathBuf,
}

impl Config {
    /// Resolves the per-user data directory and the history slot inside
    /// it, creating the directory on first run.
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "bitelog").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let store_path = data_dir.join("bitelog.json");

        Ok(Config {
            store_path,
            data_dir,
        })
    }
}
