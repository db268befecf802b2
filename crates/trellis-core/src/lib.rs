//! Core primitives for Trellis.
//!
//! This crate provides the foundational components shared by the Trellis
//! dialog engine:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Property System**: Single-slot cells that always hold the latest value
//! - **Timers**: One-shot timers on the tokio runtime
//! - **Logging**: Target names and helpers for `tracing`
//!
//! # Signal/Slot Example
//!
//! ```
//! use trellis_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Property Example
//!
//! ```
//! use trellis_core::{Property, Signal};
//!
//! // A reactive counter with change notification
//! struct Counter {
//!     value: Property<i32>,
//!     value_changed: Signal<i32>,
//! }
//!
//! impl Counter {
//!     fn new() -> Self {
//!         Self {
//!             value: Property::new(0),
//!             value_changed: Signal::new(),
//!         }
//!     }
//!
//!     fn increment(&self) {
//!         let new_value = self.value.get() + 1;
//!         if self.value.set(new_value) {
//!             self.value_changed.emit(new_value);
//!         }
//!     }
//! }
//!
//! let counter = Counter::new();
//! counter.increment();
//! assert_eq!(counter.value.get(), 1);
//! ```
//!
//! # Timer Example
//!
//! ```
//! use std::time::Duration;
//! use trellis_core::TimerManager;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> trellis_core::Result<()> {
//! let timers = TimerManager::new()?;
//! let id = timers.start_one_shot(Duration::from_millis(10), || {
//!     println!("fired");
//! });
//! assert!(timers.is_active(id));
//! timers.stop(id)?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod logging;
pub mod property;
pub mod signal;
pub mod timer;

pub use error::{CoreError, Result};
pub use property::Property;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::{TimerId, TimerManager};
