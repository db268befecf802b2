//! Fallback adapter for forms of any other shape.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use trellis_core::logging::targets;

use super::raw::ValidatingForm;
use super::{AdapterFamily, FormAdapter};
use crate::dialog::error::FormError;
use crate::dialog::record::{FieldErrors, Record, ValidationFailed};

/// Drives a [`ValidatingForm`], or nothing at all.
///
/// Validation tries `validate`, then `validate_form`, and otherwise assumes
/// the form is valid. Without a form every accessor returns its empty value.
#[derive(Clone, Default)]
pub struct GenericFormAdapter {
    form: Option<Arc<dyn ValidatingForm>>,
}

impl GenericFormAdapter {
    /// Wrap a validating form.
    pub fn new(form: Arc<dyn ValidatingForm>) -> Self {
        Self { form: Some(form) }
    }

    /// An adapter for a form with no recognizable surface.
    pub fn empty() -> Self {
        Self::default()
    }

    async fn run_validation(&self) -> bool {
        let Some(form) = &self.form else {
            return true;
        };

        if let Some(pending) = form.validate() {
            return match pending.await {
                Ok(valid) => valid,
                Err(err) => handle_error(form.as_ref(), err, "validate"),
            };
        }

        if let Some(pending) = form.validate_form() {
            return match pending.await {
                Ok(errors) => {
                    let valid = errors.is_empty();
                    form.set_errors(errors);
                    valid
                }
                Err(err) => handle_error(form.as_ref(), err, "validate_form"),
            };
        }

        true
    }
}

fn handle_error(form: &dyn ValidatingForm, err: FormError, hook: &'static str) -> bool {
    match err {
        FormError::Validation(errors) => form.set_errors(errors),
        err => {
            tracing::warn!(target: targets::FORM, family = "generic", hook, error = %err, "validation hook failed");
        }
    }
    false
}

impl FormAdapter for GenericFormAdapter {
    fn family(&self) -> AdapterFamily {
        AdapterFamily::Generic
    }

    fn get_values(&self) -> Record {
        self.form.as_ref().map(|f| f.values()).unwrap_or_default()
    }

    fn validate(&self) -> BoxFuture<'_, bool> {
        Box::pin(self.run_validation())
    }

    fn get_validated_values(&self) -> BoxFuture<'_, Result<Record, ValidationFailed>> {
        Box::pin(async move {
            if self.run_validation().await {
                Ok(self.get_values())
            } else {
                Err(ValidationFailed::new(self.get_errors()))
            }
        })
    }

    fn reset(&self, values: Option<Record>) {
        if let Some(form) = &self.form {
            let values = values.unwrap_or_else(|| form.values());
            form.reset(values);
            form.set_errors(FieldErrors::new());
        }
    }

    fn get_errors(&self) -> FieldErrors {
        self.form.as_ref().map(|f| f.errors()).unwrap_or_default()
    }

    fn set_errors(&self, errors: FieldErrors) {
        if let Some(form) = &self.form {
            form.set_errors(errors);
        }
    }

    fn is_dirty(&self) -> bool {
        self.form.as_ref().is_some_and(|f| f.is_dirty())
    }

    fn is_valid(&self) -> bool {
        self.get_errors().is_empty()
    }

    fn is_submitting(&self) -> bool {
        self.form.as_ref().is_some_and(|f| f.is_submitting())
    }

    fn supports_submit(&self) -> bool {
        self.form.as_ref().is_some_and(|f| f.has_submit())
    }

    fn submit(&self) -> Option<BoxFuture<'_, bool>> {
        let pending = self.form.as_ref()?.submit()?;
        Some(Box::pin(async move {
            pending.await.unwrap_or_else(|err| {
                tracing::warn!(target: targets::FORM, family = "generic", error = %err, "form submit failed");
                false
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::form::testing::LooseFake;
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_adapter_is_always_valid() {
        let adapter = GenericFormAdapter::empty();
        assert!(adapter.validate().await);
        assert_eq!(adapter.get_validated_values().await, Ok(Record::new()));
        assert!(!adapter.is_dirty());
        assert!(!adapter.supports_submit());
    }

    #[tokio::test]
    async fn test_prefers_validate_over_validate_form() {
        let form = LooseFake::new(json!({"a": 1}))
            .with_validate(false)
            .with_validate_form_errors(&[]);
        let adapter = GenericFormAdapter::new(form.clone());
        assert!(!adapter.validate().await);
        assert_eq!(form.validate_calls(), 1);
        assert_eq!(form.validate_form_calls(), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_validate_form() {
        let form = LooseFake::new(json!({"a": 1})).with_validate_form_errors(&[("a", "too small")]);
        let adapter = GenericFormAdapter::new(form.clone());
        let err = adapter.get_validated_values().await.unwrap_err();
        assert_eq!(err.errors.get("a").map(String::as_str), Some("too small"));
        assert_eq!(form.validate_form_calls(), 1);
    }

    #[tokio::test]
    async fn test_no_hooks_assumes_valid() {
        let form = LooseFake::new(json!({"a": 1}));
        let adapter = GenericFormAdapter::new(form);
        assert_eq!(adapter.get_validated_values().await.unwrap()["a"], json!(1));
    }
}
