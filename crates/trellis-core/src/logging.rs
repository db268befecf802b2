//! Logging facilities for Trellis.
//!
//! Trellis uses the `tracing` crate for instrumentation. To see logs, install
//! a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("trellis=debug,trellis_core=info")
//!     .init();
//! ```
//!
//! Target names are collected in [`targets`] so that filters and the engine
//! agree on spelling.

/// Target names for log filtering.
pub mod targets {
    /// Core primitives target.
    pub const CORE: &str = "trellis_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// Timer system target.
    pub const TIMER: &str = "trellis_core::timer";
    /// Dialog state machine target.
    pub const DIALOG: &str = "trellis::dialog";
    /// Form registry target.
    pub const REGISTRY: &str = "trellis::registry";
    /// Auto-form binder target.
    pub const BINDER: &str = "trellis::binder";
    /// Submission orchestration target.
    pub const CONTROLLER: &str = "trellis::controller";
    /// Form adapters target.
    pub const FORM: &str = "trellis::form";
}

/// Debug-level event on the core target.
#[macro_export]
macro_rules! trellis_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "trellis_core", $($arg)*)
    };
}
