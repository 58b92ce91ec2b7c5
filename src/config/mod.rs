//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config.yaml (first of /etc/dcp-web, $HOME/dcp-web, .)
//!     → loader.rs (locate, parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ConfigMap (validated, immutable)
//!     → shared.rs (published as an ArcSwap snapshot)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the snapshot (old one kept on failure)
//! ```

pub mod loader;
pub mod schema;
pub mod shared;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, read_environment_file, ConfigError};
pub use schema::{ApiConfig, ConfigMap, DbConfig, StripeConfig, TokenConfig, WebConfig};
pub use shared::SharedConfig;
pub use watcher::ConfigWatcher;
