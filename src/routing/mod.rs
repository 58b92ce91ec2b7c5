//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route table (Vec<Route>, owned by the application)
//!     → stage.rs (plan middleware stages from route flags)
//!     → composer.rs (bind stages as axum layers, register handlers)
//!     → static routes deferred, nested last as file servers
//!     → axum Router, immutable once serving
//! ```
//!
//! # Stage order
//! CORS → query match → authorisation → access level → content type.
//! The first stage sees the request first.

pub mod composer;
pub mod route;
pub mod stage;

pub use composer::{compose, ComposeContext, ComposeError};
pub use route::{Route, RouteHandler};
pub use stage::{plan_stages, Stage};
