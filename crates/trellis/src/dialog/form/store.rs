//! Adapter for forms that keep plain values and errors maps.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use trellis_core::logging::targets;

use super::raw::FieldStore;
use super::{AdapterFamily, FormAdapter};
use crate::dialog::error::FormError;
use crate::dialog::record::{FieldErrors, Record, ValidationFailed};

/// Drives a [`FieldStore`].
#[derive(Clone)]
pub struct StoreFormAdapter {
    form: Arc<dyn FieldStore>,
}

impl StoreFormAdapter {
    /// Wrap a field store.
    pub fn new(form: Arc<dyn FieldStore>) -> Self {
        Self { form }
    }

    /// Run validation and return the errors it produced.
    ///
    /// A backend failure yields `None`.
    async fn collect_errors(&self) -> Option<FieldErrors> {
        match self.form.validate_form().await {
            Ok(errors) => {
                self.form.set_errors(errors.clone());
                Some(errors)
            }
            Err(FormError::Validation(errors)) => {
                self.form.set_errors(errors.clone());
                Some(errors)
            }
            Err(err) => {
                tracing::warn!(target: targets::FORM, family = "store", error = %err, "validate_form failed");
                None
            }
        }
    }
}

impl FormAdapter for StoreFormAdapter {
    fn family(&self) -> AdapterFamily {
        AdapterFamily::Store
    }

    fn get_values(&self) -> Record {
        self.form.values()
    }

    fn validate(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            self.collect_errors()
                .await
                .is_some_and(|errors| errors.is_empty())
        })
    }

    fn get_validated_values(&self) -> BoxFuture<'_, Result<Record, ValidationFailed>> {
        Box::pin(async move {
            match self.collect_errors().await {
                Some(errors) if errors.is_empty() => Ok(self.form.values()),
                Some(errors) => Err(ValidationFailed::new(errors)),
                None => Err(ValidationFailed::default()),
            }
        })
    }

    fn reset(&self, values: Option<Record>) {
        let values = values.unwrap_or_else(|| self.form.values());
        self.form.reset_form(values);
    }

    fn get_errors(&self) -> FieldErrors {
        self.form.errors()
    }

    fn set_errors(&self, errors: FieldErrors) {
        self.form.set_errors(errors);
    }

    fn is_dirty(&self) -> bool {
        self.form.dirty()
    }

    fn is_valid(&self) -> bool {
        self.form.is_valid()
    }

    fn is_submitting(&self) -> bool {
        self.form.is_submitting()
    }

    fn supports_submit(&self) -> bool {
        self.form.has_submit_form()
    }

    fn submit(&self) -> Option<BoxFuture<'_, bool>> {
        let pending = self.form.submit_form()?;
        Some(Box::pin(async move {
            match pending.await {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(target: targets::FORM, family = "store", error = %err, "form submit failed");
                    false
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::form::testing::StoreFake;
    use serde_json::json;

    #[tokio::test]
    async fn test_validate_populates_errors() {
        let form = StoreFake::new(json!({"email": "nope"}));
        form.require("email", "must contain @", |v| v.as_str().is_some_and(|s| s.contains('@')));
        let adapter = StoreFormAdapter::new(form.clone());

        assert!(!adapter.validate().await);
        assert_eq!(
            adapter.get_errors().get("email").map(String::as_str),
            Some("must contain @")
        );

        form.set_value("email", json!("a@b.c"));
        let values = adapter.get_validated_values().await.unwrap();
        assert_eq!(values["email"], json!("a@b.c"));
        assert!(adapter.get_errors().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_never_returns_data() {
        let form = StoreFake::new(json!({"x": 1}));
        form.break_backend();
        let adapter = StoreFormAdapter::new(form);
        assert!(!adapter.validate().await);
        let err = adapter.get_validated_values().await.unwrap_err();
        assert!(err.errors.is_empty());
    }

    #[test]
    fn test_reset_variants() {
        let form = StoreFake::new(json!({"x": 1}));
        form.set_value("x", json!(2));
        let adapter = StoreFormAdapter::new(form);
        assert!(adapter.is_dirty());

        adapter.reset(None);
        assert_eq!(adapter.get_values()["x"], json!(2));
        assert!(!adapter.is_dirty());

        adapter.reset(Some(crate::dialog::record::record_from_value(json!({"x": 9}))));
        assert_eq!(adapter.get_values()["x"], json!(9));
    }
}
