//! In-memory forms for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::Value;

use super::raw::{FieldStore, FormState, RawForm, TriggerForm, ValidatingForm};
use super::{AdapterFamily, FormAdapter};
use crate::dialog::error::FormError;
use crate::dialog::record::{record_from_value, FieldErrors, Record, ValidationFailed};

fn backend_down() -> FormError {
    FormError::Backend("backend unavailable".into())
}

/// A trigger-validator form.
pub(crate) struct TriggerFake {
    values: Mutex<Record>,
    errors: Mutex<FieldErrors>,
    failing: Mutex<FieldErrors>,
    dirty: AtomicBool,
    broken: AtomicBool,
    control: bool,
    submittable: AtomicBool,
    submit_builds: AtomicUsize,
    pub trigger_calls: AtomicUsize,
}

impl TriggerFake {
    pub fn new(values: Value) -> Arc<Self> {
        Arc::new(Self::build(values, true))
    }

    pub fn without_control(values: Value) -> Arc<Self> {
        Arc::new(Self::build(values, false))
    }

    fn build(values: Value, control: bool) -> Self {
        Self {
            values: Mutex::new(record_from_value(values)),
            errors: Mutex::new(FieldErrors::new()),
            failing: Mutex::new(FieldErrors::new()),
            dirty: AtomicBool::new(true),
            broken: AtomicBool::new(false),
            control,
            submittable: AtomicBool::new(false),
            submit_builds: AtomicUsize::new(0),
            trigger_calls: AtomicUsize::new(0),
        }
    }

    /// Make `field` fail validation and show the error right away.
    pub fn fail_field(&self, field: &str, message: &str) {
        self.failing.lock().insert(field.into(), message.into());
        self.errors.lock().insert(field.into(), message.into());
    }

    pub fn break_backend(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// Give the form its own submit pathway, which succeeds.
    pub fn enable_submit(&self) {
        self.submittable.store(true, Ordering::SeqCst);
    }

    /// How many submit futures the form has built.
    pub fn submit_builds(&self) -> usize {
        self.submit_builds.load(Ordering::SeqCst)
    }
}

impl TriggerForm for TriggerFake {
    fn has_control(&self) -> bool {
        self.control
    }

    fn trigger(&self) -> BoxFuture<'_, Result<bool, FormError>> {
        Box::pin(async move {
            self.trigger_calls.fetch_add(1, Ordering::SeqCst);
            if self.broken.load(Ordering::SeqCst) {
                return Err(backend_down());
            }
            let failing = self.failing.lock().clone();
            let valid = failing.is_empty();
            *self.errors.lock() = failing;
            Ok(valid)
        })
    }

    fn get_values(&self) -> Result<Record, FormError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(backend_down());
        }
        Ok(self.values.lock().clone())
    }

    fn form_state(&self) -> FormState {
        let errors = self.errors.lock().clone();
        FormState {
            is_valid: errors.is_empty(),
            errors,
            is_dirty: self.dirty.load(Ordering::SeqCst),
            is_submitting: false,
        }
    }

    fn reset(&self, values: Record) -> Result<(), FormError> {
        *self.values.lock() = values;
        self.errors.lock().clear();
        self.dirty.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_error(&self, field: &str, message: &str) {
        self.errors.lock().insert(field.into(), message.into());
    }

    fn clear_errors(&self) {
        self.errors.lock().clear();
    }

    fn has_submit_handler(&self) -> bool {
        self.submittable.load(Ordering::SeqCst)
    }

    fn handle_submit(&self) -> Option<BoxFuture<'_, Result<bool, FormError>>> {
        if !self.has_submit_handler() {
            return None;
        }
        self.submit_builds.fetch_add(1, Ordering::SeqCst);
        Some(Box::pin(async { Ok(true) }))
    }
}

impl RawForm for TriggerFake {
    fn as_trigger(self: Arc<Self>) -> Option<Arc<dyn TriggerForm>> {
        Some(self)
    }
}

type Rule = (String, String, Box<dyn Fn(&Value) -> bool + Send + Sync>);

/// A values/errors store form.
pub(crate) struct StoreFake {
    values: Mutex<Record>,
    errors: Mutex<FieldErrors>,
    rules: Mutex<Vec<Rule>>,
    dirty: AtomicBool,
    broken: AtomicBool,
}

impl StoreFake {
    pub fn new(values: Value) -> Arc<Self> {
        Arc::new(Self {
            values: Mutex::new(record_from_value(values)),
            errors: Mutex::new(FieldErrors::new()),
            rules: Mutex::new(Vec::new()),
            dirty: AtomicBool::new(false),
            broken: AtomicBool::new(false),
        })
    }

    pub fn require<F>(&self, field: &str, message: &str, check: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.rules
            .lock()
            .push((field.into(), message.into(), Box::new(check)));
    }

    pub fn set_value(&self, field: &str, value: Value) {
        self.set_field_value(field, value);
    }

    pub fn break_backend(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }
}

impl FieldStore for StoreFake {
    fn values(&self) -> Record {
        self.values.lock().clone()
    }

    fn errors(&self) -> FieldErrors {
        self.errors.lock().clone()
    }

    fn set_field_value(&self, field: &str, value: Value) {
        self.values.lock().insert(field.into(), value);
        self.dirty.store(true, Ordering::SeqCst);
    }

    fn validate_form(&self) -> BoxFuture<'_, Result<FieldErrors, FormError>> {
        Box::pin(async move {
            if self.broken.load(Ordering::SeqCst) {
                return Err(backend_down());
            }
            let values = self.values.lock().clone();
            let errors = self
                .rules
                .lock()
                .iter()
                .filter(|(field, _, check)| !check(values.get(field).unwrap_or(&Value::Null)))
                .map(|(field, message, _)| (field.clone(), message.clone()))
                .collect();
            Ok(errors)
        })
    }

    fn reset_form(&self, values: Record) {
        *self.values.lock() = values;
        self.errors.lock().clear();
        self.dirty.store(false, Ordering::SeqCst);
    }

    fn set_errors(&self, errors: FieldErrors) {
        *self.errors.lock() = errors;
    }

    fn dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn is_valid(&self) -> bool {
        self.errors.lock().is_empty()
    }
}

impl RawForm for StoreFake {
    fn as_field_store(self: Arc<Self>) -> Option<Arc<dyn FieldStore>> {
        Some(self)
    }
}

/// A form with optional validation hooks.
pub(crate) struct LooseFake {
    values: Mutex<Record>,
    errors: Mutex<FieldErrors>,
    validate_result: Mutex<Option<bool>>,
    validate_form_errors: Mutex<Option<FieldErrors>>,
    validate_calls: AtomicUsize,
    validate_form_calls: AtomicUsize,
}

impl LooseFake {
    pub fn new(values: Value) -> Arc<Self> {
        Arc::new(Self {
            values: Mutex::new(record_from_value(values)),
            errors: Mutex::new(FieldErrors::new()),
            validate_result: Mutex::new(None),
            validate_form_errors: Mutex::new(None),
            validate_calls: AtomicUsize::new(0),
            validate_form_calls: AtomicUsize::new(0),
        })
    }

    pub fn with_validate(self: Arc<Self>, valid: bool) -> Arc<Self> {
        *self.validate_result.lock() = Some(valid);
        self
    }

    pub fn with_validate_form_errors(self: Arc<Self>, errors: &[(&str, &str)]) -> Arc<Self> {
        let errors = errors
            .iter()
            .map(|(f, m)| (f.to_string(), m.to_string()))
            .collect();
        *self.validate_form_errors.lock() = Some(errors);
        self
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub fn validate_form_calls(&self) -> usize {
        self.validate_form_calls.load(Ordering::SeqCst)
    }
}

impl ValidatingForm for LooseFake {
    fn validate(&self) -> Option<BoxFuture<'_, Result<bool, FormError>>> {
        let valid = (*self.validate_result.lock())?;
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        Some(Box::pin(async move { Ok(valid) }))
    }

    fn validate_form(&self) -> Option<BoxFuture<'_, Result<FieldErrors, FormError>>> {
        let errors = self.validate_form_errors.lock().clone()?;
        self.validate_form_calls.fetch_add(1, Ordering::SeqCst);
        Some(Box::pin(async move { Ok(errors) }))
    }

    fn values(&self) -> Record {
        self.values.lock().clone()
    }

    fn errors(&self) -> FieldErrors {
        self.errors.lock().clone()
    }

    fn set_errors(&self, errors: FieldErrors) {
        *self.errors.lock() = errors;
    }

    fn reset(&self, values: Record) {
        *self.values.lock() = values;
    }
}

impl RawForm for LooseFake {
    fn as_validating(self: Arc<Self>) -> Option<Arc<dyn ValidatingForm>> {
        Some(self)
    }
}

/// A form with no recognizable surface.
pub(crate) struct OpaqueForm;

impl RawForm for OpaqueForm {}

/// An adapter that counts every call and validates to a fixed outcome.
pub(crate) struct SpyAdapter {
    outcome: Mutex<Result<Record, ValidationFailed>>,
    pub calls: AtomicUsize,
    pub errors: Mutex<FieldErrors>,
}

impl SpyAdapter {
    pub fn valid(values: Value) -> Arc<Self> {
        Self::with_outcome(Ok(record_from_value(values)))
    }

    pub fn invalid(errors: &[(&str, &str)]) -> Arc<Self> {
        let errors = errors
            .iter()
            .map(|(f, m)| (f.to_string(), m.to_string()))
            .collect();
        Self::with_outcome(Err(ValidationFailed::new(errors)))
    }

    fn with_outcome(outcome: Result<Record, ValidationFailed>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(outcome),
            calls: AtomicUsize::new(0),
            errors: Mutex::new(FieldErrors::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl FormAdapter for SpyAdapter {
    fn family(&self) -> AdapterFamily {
        AdapterFamily::Generic
    }

    fn get_values(&self) -> Record {
        self.hit();
        self.outcome.lock().clone().unwrap_or_default()
    }

    fn validate(&self) -> BoxFuture<'_, bool> {
        self.hit();
        let valid = self.outcome.lock().is_ok();
        Box::pin(async move { valid })
    }

    fn get_validated_values(&self) -> BoxFuture<'_, Result<Record, ValidationFailed>> {
        self.hit();
        let outcome = self.outcome.lock().clone();
        Box::pin(async move { outcome })
    }

    fn reset(&self, _values: Option<Record>) {
        self.hit();
    }

    fn get_errors(&self) -> FieldErrors {
        self.hit();
        self.errors.lock().clone()
    }

    fn set_errors(&self, errors: FieldErrors) {
        self.hit();
        *self.errors.lock() = errors;
    }

    fn is_dirty(&self) -> bool {
        self.hit();
        false
    }

    fn is_valid(&self) -> bool {
        self.hit();
        self.outcome.lock().is_ok()
    }

    fn is_submitting(&self) -> bool {
        self.hit();
        false
    }
}
