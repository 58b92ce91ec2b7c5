//! Process lifecycle.
//!
//! ```text
//! Startup (main.rs):
//!     Load config → Start watcher → Build validator → Compose routes → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger() → server stops accepting → in-flight requests drain
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
