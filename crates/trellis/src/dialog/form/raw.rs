//! Capability surfaces a raw form may expose.
//!
//! A raw form is whatever object the application's form library produces.
//! The engine knows nothing about it beyond the surfaces it opts into through
//! [`RawForm`]: each probe returns the form as a capability trait object, or
//! `None` when the form does not have that shape.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::dialog::error::FormError;
use crate::dialog::record::{FieldErrors, Record};

/// An opaque form instance supplied by the application.
///
/// Probes take `self: Arc<Self>` so an implementation can hand itself out as
/// a capability object without cloning its state:
///
/// ```
/// use std::sync::Arc;
/// use trellis::dialog::form::{RawForm, ValidatingForm};
///
/// struct ConfirmForm;
///
/// impl ValidatingForm for ConfirmForm {}
///
/// impl RawForm for ConfirmForm {
///     fn as_validating(self: Arc<Self>) -> Option<Arc<dyn ValidatingForm>> {
///         Some(self)
///     }
/// }
/// ```
///
/// Probing must not change form state.
pub trait RawForm: Send + Sync + 'static {
    /// The trigger-validator surface, if the form has one.
    fn as_trigger(self: Arc<Self>) -> Option<Arc<dyn TriggerForm>> {
        None
    }

    /// The field-store surface, if the form has one.
    fn as_field_store(self: Arc<Self>) -> Option<Arc<dyn FieldStore>> {
        None
    }

    /// The loose validating surface, if the form has one.
    fn as_validating(self: Arc<Self>) -> Option<Arc<dyn ValidatingForm>> {
        None
    }
}

/// Status snapshot reported by a [`TriggerForm`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    /// Current field errors.
    pub errors: FieldErrors,
    /// Whether any field differs from its default.
    pub is_dirty: bool,
    /// Whether the last validation passed.
    pub is_valid: bool,
    /// Whether the form's own submit pathway is running.
    pub is_submitting: bool,
}

/// Forms driven by an async `trigger` validator and a control object.
pub trait TriggerForm: Send + Sync {
    /// Whether the form exposes its control object. Forms without one are
    /// not treated as trigger forms.
    fn has_control(&self) -> bool;

    /// Validate every field, populating the form's error store.
    fn trigger(&self) -> BoxFuture<'_, Result<bool, FormError>>;

    /// Current field values.
    fn get_values(&self) -> Result<Record, FormError>;

    /// Current status.
    fn form_state(&self) -> FormState;

    /// Reset to `values`, clearing errors and dirty state.
    fn reset(&self, values: Record) -> Result<(), FormError>;

    /// Set the error message of one field.
    fn set_error(&self, field: &str, message: &str);

    /// Clear all field errors.
    fn clear_errors(&self);

    /// Whether [`handle_submit`](Self::handle_submit) returns a future.
    ///
    /// Must agree with `handle_submit` and must not start a submission.
    fn has_submit_handler(&self) -> bool {
        false
    }

    /// The form's own submit pathway, if it has one.
    fn handle_submit(&self) -> Option<BoxFuture<'_, Result<bool, FormError>>> {
        None
    }
}

/// Forms that keep plain `values` and `errors` maps.
pub trait FieldStore: Send + Sync {
    /// Current field values.
    fn values(&self) -> Record;

    /// Current field errors.
    fn errors(&self) -> FieldErrors;

    /// Set a single field value.
    fn set_field_value(&self, field: &str, value: Value);

    /// Run validation and return the resulting errors (empty when valid).
    fn validate_form(&self) -> BoxFuture<'_, Result<FieldErrors, FormError>>;

    /// Reset to `values`, clearing errors and dirty state.
    fn reset_form(&self, values: Record);

    /// Replace all field errors.
    fn set_errors(&self, errors: FieldErrors);

    /// Whether any field was touched.
    fn dirty(&self) -> bool;

    /// Whether the current errors are empty and validation has run.
    fn is_valid(&self) -> bool;

    /// Whether the form's own submit pathway is running.
    fn is_submitting(&self) -> bool {
        false
    }

    /// Whether [`submit_form`](Self::submit_form) returns a future.
    fn has_submit_form(&self) -> bool {
        false
    }

    /// The form's own submit pathway, if it has one.
    fn submit_form(&self) -> Option<BoxFuture<'_, Result<(), FormError>>> {
        None
    }
}

/// Forms with a loose validation surface.
///
/// Every method is optional. A form that overrides nothing is treated as
/// having no fields and is always valid.
pub trait ValidatingForm: Send + Sync {
    /// Validate, returning overall validity.
    fn validate(&self) -> Option<BoxFuture<'_, Result<bool, FormError>>> {
        None
    }

    /// Validate, returning field errors (empty when valid).
    fn validate_form(&self) -> Option<BoxFuture<'_, Result<FieldErrors, FormError>>> {
        None
    }

    /// Current field values.
    fn values(&self) -> Record {
        Record::new()
    }

    /// Current field errors.
    fn errors(&self) -> FieldErrors {
        FieldErrors::new()
    }

    /// Replace all field errors.
    fn set_errors(&self, _errors: FieldErrors) {}

    /// Reset to `values`.
    fn reset(&self, _values: Record) {}

    /// Whether any field was touched.
    fn is_dirty(&self) -> bool {
        false
    }

    /// Whether the form's own submit pathway is running.
    fn is_submitting(&self) -> bool {
        false
    }

    /// Whether [`submit`](Self::submit) returns a future.
    fn has_submit(&self) -> bool {
        false
    }

    /// The form's own submit pathway, if it has one.
    fn submit(&self) -> Option<BoxFuture<'_, Result<bool, FormError>>> {
        None
    }
}
