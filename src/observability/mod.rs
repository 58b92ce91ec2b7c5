//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout via the fmt layer
//!     → Metrics endpoint (Prometheus scrape), when configured
//! ```

pub mod logging;
pub mod metrics;
