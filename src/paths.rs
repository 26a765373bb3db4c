//! Where the simulator keeps its config and logs.
//!
//! - **Local mode**: a `config.yaml` in the working directory wins, logs go
//!   to `./logs`.
//! - **Installed mode** (default): `<data dir>/Launchpad Modes/config.yaml`,
//!   e.g. `~/.local/share/Launchpad Modes` on Linux.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::SelectorConfig;

/// Directory name used in installed mode
const APP_NAME: &str = "Launchpad Modes";

const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config: PathBuf,
    pub logs_dir: PathBuf,
    /// Whether the paths point at the working directory
    pub is_local: bool,
}

impl AppPaths {
    /// Detect paths from the environment.
    ///
    /// Runs before logging is initialized, so diagnostics go to stderr.
    pub fn detect() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        if cwd.join(CONFIG_FILE).exists() {
            #[cfg(debug_assertions)]
            eprintln!("[paths] Using {} in {}", CONFIG_FILE, cwd.display());
            return Self::local(&cwd);
        }

        let base = dirs::data_dir()
            .unwrap_or_else(|| {
                eprintln!("[paths] WARNING: no data directory, falling back to cwd");
                cwd.clone()
            })
            .join(APP_NAME);

        Self {
            config: base.join(CONFIG_FILE),
            logs_dir: base.join("logs"),
            is_local: false,
        }
    }

    /// Paths rooted in `dir`
    pub fn local(dir: &Path) -> Self {
        Self {
            config: dir.join(CONFIG_FILE),
            logs_dir: dir.join("logs"),
            is_local: true,
        }
    }

    /// Replace the config path (command-line override)
    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = config.into();
        self
    }

    pub fn base_dir(&self) -> PathBuf {
        self.config
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Create the log and config directories, writing a default config if none exists
    pub async fn ensure(&self) -> anyhow::Result<()> {
        for dir in [self.logs_dir.clone(), self.base_dir()] {
            if !dir.exists() {
                debug!("Creating directory: {}", dir.display());
                tokio::fs::create_dir_all(&dir)
                    .await
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }

        if !self.config.exists() {
            info!("No config found, writing defaults to {}", self.config.display());
            SelectorConfig::default()
                .save(&self.config.to_string_lossy())
                .await?;
        }

        Ok(())
    }
}
