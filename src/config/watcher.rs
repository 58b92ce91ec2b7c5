//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::load_config;
use crate::config::shared::SharedConfig;

/// A watcher that republishes the configuration file when it changes.
pub struct ConfigWatcher {
    path: PathBuf,
    config: SharedConfig,
}

impl ConfigWatcher {
    pub fn new(path: &Path, config: SharedConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            config,
        }
    }

    /// Re-read the file and publish it. The current snapshot is kept when
    /// the file cannot be read, parsed, or validated.
    pub fn reload(&self) -> bool {
        match load_config(&self.path) {
            Ok(new_config) => {
                self.config.store(new_config);
                tracing::info!(path = %self.path.display(), "Config file changed, reloaded");
                true
            }
            Err(e) => {
                tracing::error!("Failed to reload config: {}. Keeping current configuration.", e);
                false
            }
        }
    }

    /// Start watching the file on notify's background thread.
    ///
    /// The returned watcher must be kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::debug!(paths = ?event.paths, "Config file change detected");
                        self.reload();
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ConfigMap;
    use std::fs;

    fn config_with_secret(secret: &str) -> ConfigMap {
        let mut config = ConfigMap::default();
        config.api.api_secret = secret.into();
        config
    }

    #[test]
    fn test_reload_publishes_new_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "api:\n  api_secret: \"rotated\"\n").unwrap();

        let shared = SharedConfig::new(config_with_secret("original"));
        let watcher = ConfigWatcher::new(&path, shared.clone());

        assert!(watcher.reload());
        assert_eq!(shared.load().api.api_secret, "rotated");
    }

    #[test]
    fn test_reload_keeps_snapshot_on_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "api: [half-written").unwrap();

        let shared = SharedConfig::new(config_with_secret("original"));
        let watcher = ConfigWatcher::new(&path, shared.clone());

        assert!(!watcher.reload());
        assert_eq!(shared.load().api.api_secret, "original");
    }

    #[test]
    fn test_reload_keeps_snapshot_when_validation_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "api:\n  api_secret: \"\"\n").unwrap();

        let shared = SharedConfig::new(config_with_secret("original"));
        assert!(!ConfigWatcher::new(&path, shared.clone()).reload());
        assert_eq!(shared.load().api.api_secret, "original");
    }
}
