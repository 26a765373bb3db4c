//! Hot reload of the selector configuration
//!
//! The parent directory is watched rather than the file itself: editors that
//! save through a temp file and a rename replace the inode, which a watch on
//! the file would lose after the first save.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{ConfigChange, SelectorConfig};

/// Quiet period after the last file event before reloading
const DEBOUNCE: Duration = Duration::from_millis(150);

/// A validated configuration that differs from the one before it
#[derive(Debug, Clone)]
pub struct ConfigUpdate {
    pub config: SelectorConfig,
    pub change: ConfigChange,
}

pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<ConfigUpdate>,
}

impl ConfigWatcher {
    /// Load the file and start watching it. Returns the watcher and the
    /// initial configuration.
    pub async fn new(config_path: impl AsRef<Path>) -> Result<(Self, SelectorConfig)> {
        let path = config_path.as_ref().to_path_buf();
        let path_str = path.to_string_lossy().to_string();

        let initial = SelectorConfig::load(&path_str)
            .await
            .context("Failed to load initial config")?;

        let file_name = path
            .file_name()
            .map(OsString::from)
            .with_context(|| format!("Config path has no file name: {}", path.display()))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (tx, rx) = mpsc::channel(4);

        // notify callbacks run on their own OS thread; only signal from there
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    return;
                }
                if event.paths.iter().any(|p| p.file_name() == Some(file_name.as_os_str())) {
                    debug!("Config file event: {:?}", event.kind);
                    let _ = signal_tx.send(());
                }
            }
            Err(e) => error!("Watch error: {}", e),
        })?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config directory: {}", dir.display()))?;

        tokio::spawn(reload_loop(path_str, initial.clone(), signal_rx, tx));

        info!("👀 Watching {} for changes", path.display());
        Ok((Self { _watcher: watcher, rx }, initial))
    }

    /// Next effective change. Returns None once the watcher has stopped.
    pub async fn next_config(&mut self) -> Option<ConfigUpdate> {
        self.rx.recv().await
    }
}

/// Debounce file events, reload, and forward only real changes
async fn reload_loop(
    path: String,
    mut current: SelectorConfig,
    mut signals: mpsc::UnboundedReceiver<()>,
    tx: mpsc::Sender<ConfigUpdate>,
) {
    while signals.recv().await.is_some() {
        // One save is often several events (truncate, write, rename)
        loop {
            tokio::time::sleep(DEBOUNCE).await;
            let mut more = false;
            while signals.try_recv().is_ok() {
                more = true;
            }
            if !more {
                break;
            }
        }

        let config = match SelectorConfig::load(&path).await {
            Ok(config) => config,
            Err(e) => {
                warn!("⚠️  Failed to reload config (keeping old config): {:#}", e);
                continue;
            }
        };

        let change = ConfigChange::between(&current, &config);
        if change.is_empty() {
            debug!("Config file touched without changes");
            continue;
        }

        info!("📝 Configuration changed: {:?}", change);
        current = config.clone();
        if tx.send(ConfigUpdate { config, change }).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_watcher_reloads_renamed_save() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "gesture:\n  hold_threshold_ms: 500\n")?;

        let (mut watcher, config) = ConfigWatcher::new(&config_path).await?;
        assert_eq!(config.gesture.hold_threshold_ms, 500);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let staged = temp_dir.path().join("config.yaml.tmp");
        fs::write(&staged, "gesture:\n  hold_threshold_ms: 800\n")?;
        fs::rename(&staged, &config_path)?;

        // Some CI filesystems drop inotify events; only check what arrives
        let update = tokio::time::timeout(Duration::from_secs(2), watcher.next_config()).await;
        if let Ok(Some(update)) = update {
            assert_eq!(update.config.gesture.hold_threshold_ms, 800);
            assert_eq!(update.change, ConfigChange { gesture: true, ..Default::default() });
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_unchanged_or_invalid_save_sends_nothing() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "gesture:\n  hold_threshold_ms: 500\n")?;

        let (mut watcher, _) = ConfigWatcher::new(&config_path).await?;

        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(&config_path, "gesture:\n  hold_threshold_ms: 500\n")?;
        tokio::time::sleep(Duration::from_millis(300)).await;
        fs::write(&config_path, "gesture:\n  hold_threshold_ms: 0\n")?;

        let update = tokio::time::timeout(Duration::from_millis(800), watcher.next_config()).await;
        assert!(update.is_err(), "no update expected, got {:?}", update);

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigWatcher::new(temp_dir.path().join("absent.yaml")).await;
        assert!(result.is_err());
    }
}
