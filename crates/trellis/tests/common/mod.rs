//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use trellis::dialog::form::{FieldStore, FormState, TriggerForm};
use trellis::dialog::{
    record_from_value, AdapterFamily, FieldErrors, FormAdapter, FormError, OperationKind, RawForm,
    Record, SubmitError, SubmitHandler, SubmitReply, ValidationFailed,
};

/// Install a test-friendly subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn record(value: Value) -> Record {
    record_from_value(value)
}

// ============================================================================
// Submit handlers
// ============================================================================

/// Every call a handler received.
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<(Value, OperationKind)>>>);

impl Calls {
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data(&self, index: usize) -> Value {
        self.0.lock()[index].0.clone()
    }

    pub fn kind(&self, index: usize) -> OperationKind {
        self.0.lock()[index].1
    }

    fn push(&self, data: Record, kind: OperationKind) {
        self.0.lock().push((Value::Object(data), kind));
    }
}

/// A handler that records its input and answers with `reply`.
pub fn recording(reply: SubmitReply) -> (impl SubmitHandler, Calls) {
    let calls = Calls::default();
    let sink = calls.clone();
    let handler = move |data: Record, kind: OperationKind| {
        sink.push(data, kind);
        async move { Ok::<_, SubmitError>(reply) }
    };
    (handler, calls)
}

/// A handler that suspends until the test releases it.
pub struct GatedHandler {
    gate: Mutex<Option<oneshot::Receiver<Result<SubmitReply, SubmitError>>>>,
    pub calls: Calls,
}

impl GatedHandler {
    pub fn new() -> (Self, oneshot::Sender<Result<SubmitReply, SubmitError>>) {
        let (tx, rx) = oneshot::channel();
        let handler = Self {
            gate: Mutex::new(Some(rx)),
            calls: Calls::default(),
        };
        (handler, tx)
    }
}

impl SubmitHandler for GatedHandler {
    fn submit(
        &self,
        data: Record,
        kind: OperationKind,
    ) -> BoxFuture<'static, Result<SubmitReply, SubmitError>> {
        self.calls.push(data, kind);
        let gate = self.gate.lock().take();
        Box::pin(async move {
            match gate {
                // A dropped sender never resolves the submission.
                Some(rx) => match rx.await {
                    Ok(reply) => reply,
                    Err(_) => std::future::pending().await,
                },
                None => Ok(SubmitReply::Accepted),
            }
        })
    }
}

// ============================================================================
// Forms
// ============================================================================

/// A trigger-validated form with required fields.
pub struct ProfileForm {
    values: Mutex<Record>,
    errors: Mutex<FieldErrors>,
    required: Vec<&'static str>,
    dirty: AtomicBool,
    pub triggers: AtomicUsize,
}

impl ProfileForm {
    pub fn new(values: Value, required: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            values: Mutex::new(record(values)),
            errors: Mutex::new(FieldErrors::new()),
            required: required.to_vec(),
            dirty: AtomicBool::new(false),
            triggers: AtomicUsize::new(0),
        })
    }

    pub fn type_into(&self, field: &str, value: Value) {
        self.values.lock().insert(field.into(), value);
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub fn errors(&self) -> FieldErrors {
        self.errors.lock().clone()
    }

    pub fn into_raw(self: Arc<Self>) -> Arc<dyn RawForm> {
        self
    }
}

impl RawForm for ProfileForm {
    fn as_trigger(self: Arc<Self>) -> Option<Arc<dyn TriggerForm>> {
        Some(self)
    }
}

impl TriggerForm for ProfileForm {
    fn has_control(&self) -> bool {
        true
    }

    fn trigger(&self) -> BoxFuture<'_, Result<bool, FormError>> {
        Box::pin(async move {
            self.triggers.fetch_add(1, Ordering::SeqCst);
            let values = self.values.lock().clone();
            let missing: FieldErrors = self
                .required
                .iter()
                .filter(|field| {
                    values
                        .get(**field)
                        .and_then(Value::as_str)
                        .is_none_or(|s| s.trim().is_empty())
                })
                .map(|field| (field.to_string(), "This field is required".to_string()))
                .collect();
            let valid = missing.is_empty();
            *self.errors.lock() = missing;
            Ok(valid)
        })
    }

    fn get_values(&self) -> Result<Record, FormError> {
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
}

/// A plain values/errors store form.
pub struct NoteStore {
    values: Mutex<Record>,
    errors: Mutex<FieldErrors>,
}

impl NoteStore {
    pub fn new(values: Value) -> Arc<Self> {
        Arc::new(Self {
            values: Mutex::new(record(values)),
            errors: Mutex::new(FieldErrors::new()),
        })
    }

    pub fn into_raw(self: Arc<Self>) -> Arc<dyn RawForm> {
        self
    }
}

impl RawForm for NoteStore {
    fn as_field_store(self: Arc<Self>) -> Option<Arc<dyn FieldStore>> {
        Some(self)
    }
}

impl FieldStore for NoteStore {
    fn values(&self) -> Record {
        self.values.lock().clone()
    }

    fn errors(&self) -> FieldErrors {
        self.errors.lock().clone()
    }

    fn set_field_value(&self, field: &str, value: Value) {
        self.values.lock().insert(field.into(), value);
    }

    fn validate_form(&self) -> BoxFuture<'_, Result<FieldErrors, FormError>> {
        Box::pin(async move {
            let mut errors = FieldErrors::new();
            if !self.values.lock().contains_key("body") {
                errors.insert("body".into(), "Write something".into());
            }
            Ok(errors)
        })
    }

    fn reset_form(&self, values: Record) {
        *self.values.lock() = values;
        self.errors.lock().clear();
    }

    fn set_errors(&self, errors: FieldErrors) {
        *self.errors.lock() = errors;
    }

    fn dirty(&self) -> bool {
        false
    }

    fn is_valid(&self) -> bool {
        self.errors.lock().is_empty()
    }
}

/// An adapter whose validation takes `delay` on the tokio clock.
pub struct SlowAdapter {
    values: Record,
    delay: Duration,
    pub validations: AtomicUsize,
}

impl SlowAdapter {
    pub fn new(values: Value, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            values: record(values),
            delay,
            validations: AtomicUsize::new(0),
        })
    }

    pub fn validation_count(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }
}

impl FormAdapter for SlowAdapter {
    fn family(&self) -> AdapterFamily {
        AdapterFamily::Generic
    }

    fn get_values(&self) -> Record {
        self.values.clone()
    }

    fn validate(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            true
        })
    }

    fn get_validated_values(&self) -> BoxFuture<'_, Result<Record, ValidationFailed>> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            Ok(self.values.clone())
        })
    }

    fn reset(&self, _values: Option<Record>) {}

    fn get_errors(&self) -> FieldErrors {
        FieldErrors::new()
    }

    fn set_errors(&self, _errors: FieldErrors) {}

    fn is_dirty(&self) -> bool {
        false
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn is_submitting(&self) -> bool {
        false
    }
}
