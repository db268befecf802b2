//! Adapter selection by capability probing.

use std::fmt;
use std::sync::Arc;

use super::generic::GenericFormAdapter;
use super::hook::HookFormAdapter;
use super::raw::RawForm;
use super::store::StoreFormAdapter;
use super::{AdapterFamily, FormAdapter};

/// The adapter chosen for a raw form, tagged with its family.
#[derive(Clone)]
pub struct DetectedAdapter {
    /// Which family matched.
    pub family: AdapterFamily,
    /// The adapter driving the form.
    pub adapter: Arc<dyn FormAdapter>,
}

impl fmt::Debug for DetectedAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectedAdapter")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

/// Build the adapter for `raw`.
///
/// Probing order is fixed: a trigger surface that reports a control object
/// selects [`AdapterFamily::Hook`], then a field-store surface selects
/// [`AdapterFamily::Store`], and anything else gets the generic adapter.
/// Only the read-only probes of [`RawForm`] are called.
pub fn detect_adapter(raw: Arc<dyn RawForm>) -> DetectedAdapter {
    if let Some(form) = Arc::clone(&raw).as_trigger().filter(|f| f.has_control()) {
        return DetectedAdapter {
            family: AdapterFamily::Hook,
            adapter: Arc::new(HookFormAdapter::new(form)),
        };
    }

    if let Some(form) = Arc::clone(&raw).as_field_store() {
        return DetectedAdapter {
            family: AdapterFamily::Store,
            adapter: Arc::new(StoreFormAdapter::new(form)),
        };
    }

    let adapter = match raw.as_validating() {
        Some(form) => GenericFormAdapter::new(form),
        None => GenericFormAdapter::empty(),
    };
    DetectedAdapter {
        family: AdapterFamily::Generic,
        adapter: Arc::new(adapter),
    }
}

/// The family [`detect_adapter`] would choose, without building an adapter.
pub fn detect_family(raw: &Arc<dyn RawForm>) -> AdapterFamily {
    if Arc::clone(raw).as_trigger().is_some_and(|f| f.has_control()) {
        AdapterFamily::Hook
    } else if Arc::clone(raw).as_field_store().is_some() {
        AdapterFamily::Store
    } else {
        AdapterFamily::Generic
    }
}
