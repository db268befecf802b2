//! Adapter for trigger-validator forms.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use trellis_core::logging::targets;

use super::raw::TriggerForm;
use super::{AdapterFamily, FormAdapter};
use crate::dialog::error::FormError;
use crate::dialog::record::{FieldErrors, Record, ValidationFailed};

/// Drives a [`TriggerForm`].
#[derive(Clone)]
pub struct HookFormAdapter {
    form: Arc<dyn TriggerForm>,
}

impl HookFormAdapter {
    /// Wrap a trigger form.
    pub fn new(form: Arc<dyn TriggerForm>) -> Self {
        Self { form }
    }

    async fn run_trigger(&self) -> bool {
        match self.form.trigger().await {
            Ok(valid) => valid,
            Err(FormError::Validation(errors)) => {
                self.set_errors(errors);
                false
            }
            Err(err) => {
                tracing::warn!(target: targets::FORM, family = "hook", error = %err, "trigger failed");
                false
            }
        }
    }
}

impl FormAdapter for HookFormAdapter {
    fn family(&self) -> AdapterFamily {
        AdapterFamily::Hook
    }

    fn get_values(&self) -> Record {
        self.form.get_values().unwrap_or_else(|err| {
            tracing::warn!(target: targets::FORM, family = "hook", error = %err, "reading values failed");
            Record::new()
        })
    }

    fn validate(&self) -> BoxFuture<'_, bool> {
        Box::pin(self.run_trigger())
    }

    fn get_validated_values(&self) -> BoxFuture<'_, Result<Record, ValidationFailed>> {
        Box::pin(async move {
            if !self.run_trigger().await {
                return Err(ValidationFailed::new(self.form.form_state().errors));
            }
            self.form.get_values().map_err(|err| {
                tracing::warn!(target: targets::FORM, family = "hook", error = %err, "collecting values failed");
                ValidationFailed::default()
            })
        })
    }

    fn reset(&self, values: Option<Record>) {
        let values = match values {
            Some(values) => values,
            None => self.get_values(),
        };
        if let Err(err) = self.form.reset(values) {
            tracing::warn!(target: targets::FORM, family = "hook", error = %err, "reset failed");
        }
    }

    fn get_errors(&self) -> FieldErrors {
        self.form.form_state().errors
    }

    fn set_errors(&self, errors: FieldErrors) {
        self.form.clear_errors();
        for (field, message) in &errors {
            self.form.set_error(field, message);
        }
    }

    fn is_dirty(&self) -> bool {
        self.form.form_state().is_dirty
    }

    fn is_valid(&self) -> bool {
        self.form.form_state().is_valid
    }

    fn is_submitting(&self) -> bool {
        self.form.form_state().is_submitting
    }

    fn supports_submit(&self) -> bool {
        self.form.has_submit_handler()
    }

    fn submit(&self) -> Option<BoxFuture<'_, bool>> {
        let pending = self.form.handle_submit()?;
        Some(Box::pin(async move {
            pending.await.unwrap_or_else(|err| {
                tracing::warn!(target: targets::FORM, family = "hook", error = %err, "form submit failed");
                false
            })
        }))
    }
}
