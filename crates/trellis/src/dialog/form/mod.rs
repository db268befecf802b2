//! Form adapters.
//!
//! Applications host forms built on different form-state libraries. The
//! engine talks to all of them through one capability surface,
//! [`FormAdapter`], with an implementation per library family:
//!
//! - [`HookFormAdapter`] - forms with an async `trigger` validator and a
//!   control object
//! - [`StoreFormAdapter`] - forms with plain `values`/`errors` maps
//! - [`GenericFormAdapter`] - anything else, validated through whichever
//!   optional hook the form provides
//!
//! [`detect_adapter`] picks the family for a raw form by probing the
//! surfaces of [`RawForm`].
//!
//! # Failure semantics
//!
//! Adapter methods never propagate a [`FormError`](crate::dialog::FormError).
//! They log it and fall back to their own result shape (`false`, an empty
//! record, no-op). The single exception is
//! [`FormAdapter::get_validated_values`], which reports invalid input as
//! [`ValidationFailed`] so the controller can branch on it.

mod detect;
mod generic;
mod hook;
mod raw;
mod store;

use std::fmt;

use futures_util::future::BoxFuture;

pub use detect::{detect_adapter, detect_family, DetectedAdapter};
pub use generic::GenericFormAdapter;
pub use hook::HookFormAdapter;
pub use raw::{FieldStore, FormState, RawForm, TriggerForm, ValidatingForm};
pub use store::StoreFormAdapter;

use super::record::{FieldErrors, Record, ValidationFailed, ValidationResult};

/// The library family an adapter was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterFamily {
    /// Trigger-validator forms.
    Hook,
    /// Values/errors store forms.
    Store,
    /// Fallback for any other shape.
    Generic,
}

impl fmt::Display for AdapterFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterFamily::Hook => write!(f, "hook"),
            AdapterFamily::Store => write!(f, "store"),
            AdapterFamily::Generic => write!(f, "generic"),
        }
    }
}

/// The normalized capability surface of a mounted form.
pub trait FormAdapter: Send + Sync {
    /// The family this adapter drives.
    fn family(&self) -> AdapterFamily;

    /// Current, unvalidated values. Empty when the form has none yet.
    fn get_values(&self) -> Record;

    /// Run the form's validation and report overall validity.
    ///
    /// Populates the form's own error store as a side effect.
    fn validate(&self) -> BoxFuture<'_, bool>;

    /// Validate and return the values, or the field errors on failure.
    ///
    /// Never returns partial data.
    fn get_validated_values(&self) -> BoxFuture<'_, Result<Record, ValidationFailed>>;

    /// Restore the form.
    ///
    /// With `Some(values)` the form is reset to those values. With `None`
    /// the current input is kept and only errors and dirty state are cleared.
    fn reset(&self, values: Option<Record>);

    /// Current field errors.
    fn get_errors(&self) -> FieldErrors;

    /// Replace the field errors, e.g. with server-side messages.
    fn set_errors(&self, errors: FieldErrors);

    /// Whether the user changed anything.
    fn is_dirty(&self) -> bool;

    /// Whether the form currently reports valid input.
    fn is_valid(&self) -> bool;

    /// Whether the form's own submit pathway is running.
    fn is_submitting(&self) -> bool;

    /// Whether [`submit`](Self::submit) is available.
    fn supports_submit(&self) -> bool {
        false
    }

    /// Run the form's own submit pathway, if it has one.
    fn submit(&self) -> Option<BoxFuture<'_, bool>> {
        None
    }

    /// Validate and collect into a [`ValidationResult`].
    fn validate_and_collect(&self) -> BoxFuture<'_, ValidationResult> {
        Box::pin(async move { self.get_validated_values().await.into() })
    }
}

static_assertions::assert_obj_safe!(FormAdapter, RawForm);

#[cfg(test)]
pub(crate) mod testing;
