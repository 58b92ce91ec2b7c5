//! Process-wide configuration handle.
//!
//! Readers take an `Arc<ConfigMap>` snapshot; the watcher publishes a whole
//! new `ConfigMap` on reload. A snapshot never changes after it is taken.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::ConfigMap;
use crate::observability::metrics;

/// Cheaply clonable handle to the current configuration snapshot.
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<ArcSwap<ConfigMap>>,
}

impl SharedConfig {
    pub fn new(config: ConfigMap) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<ConfigMap> {
        self.inner.load_full()
    }

    /// Publish a new snapshot.
    pub fn store(&self, config: ConfigMap) {
        self.inner.store(Arc::new(config));
        metrics::record_config_reload();
    }

    /// Token signing secret from the current snapshot.
    pub fn api_secret(&self) -> Vec<u8> {
        self.inner.load().api.api_secret.as_bytes().to_vec()
    }
}

impl std::fmt::Debug for SharedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedConfig").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_stable_across_store() {
        let mut config = ConfigMap::default();
        config.api.api_secret = "first".into();
        let shared = SharedConfig::new(config.clone());

        let before = shared.load();
        config.api.api_secret = "second".into();
        shared.store(config);

        assert_eq!(before.api.api_secret, "first");
        assert_eq!(shared.load().api.api_secret, "second");
        assert_eq!(shared.api_secret(), b"second".to_vec());
    }

    #[test]
    fn test_clones_share_state() {
        let shared = SharedConfig::new(ConfigMap::default());
        let other = shared.clone();

        let mut config = ConfigMap::default();
        config.app.port = 1234;
        other.store(config);

        assert_eq!(shared.load().app.port, 1234);
    }
}
