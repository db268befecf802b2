//! Reactive single-slot properties.
//!
//! A [`Property<T>`] is a lock-protected cell holding exactly one value. It is
//! used wherever a long-lived object must observe the *latest* version of
//! something that is replaced from the outside, for example the raw form
//! instance behind a stable form adapter: the adapter is built once and reads
//! the property at call time, while the host writes a fresh value on every
//! render.
//!
//! # Example
//!
//! ```
//! use trellis_core::Property;
//!
//! let prop = Property::new(42);
//! assert_eq!(prop.get(), 42);
//!
//! // Setting the same value reports no change.
//! assert!(!prop.set(42));
//!
//! assert!(prop.set(100));
//! assert_eq!(prop.get(), 100);
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A reactive property that tracks changes.
///
/// `set()` compares the new value with the current one and returns whether
/// the value actually changed, so the owner knows when to emit its
/// notification signal. Types without `PartialEq` (trait objects behind an
/// `Arc`, for instance) use [`Property::replace`] or [`Property::set_silent`].
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Set the value without any change detection.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }

    /// Store a new value and return the previous one.
    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.value.write(), value)
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}
