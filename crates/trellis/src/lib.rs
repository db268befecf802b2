//! Trellis - dialog and form orchestration for CRUD tables.
//!
//! This is the main crate. It re-exports the core primitives of
//! `trellis-core` and adds the dialog engine and its configuration.
//!
//! # Example
//!
//! ```
//! use trellis::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let host = DialogHost::new(DialogConfig::default(), |_: Record, _: OperationKind| async {
//!     Ok::<_, SubmitError>(SubmitReply::Accepted)
//! })?;
//!
//! host.open(OpenRequest::new(OperationKind::View).with_title("Order #12"));
//! assert!(host.snapshot().is_read_only);
//! assert_eq!(host.request_submit().await, SubmitOutcome::Ignored);
//! # Ok(())
//! # }
//! ```

pub use trellis_core::*;

pub mod config;
pub mod dialog;
pub mod prelude;
