//! Binding mounted forms into the registry.
//!
//! A hosted form hands its raw form instance to an [`AutoFormBinder`] on every
//! render. The binder keeps one [`BoundFormAdapter`] for its whole life; the
//! adapter reads the latest raw form from a single-slot cell at call time, so
//! the registry sees a stable adapter even though the raw form object is
//! replaced across renders.
//!
//! Registration is guarded by the `(kind, raw form identity)` pair last
//! registered: repeating it is a no-op, a new identity re-registers under the
//! same kind (an atomic replace), and a new kind moves the registration.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use trellis_core::Property;
use trellis_core::logging::targets;

use super::form::{detect_adapter, detect_family, AdapterFamily, FormAdapter, RawForm};
use super::operation::OperationKind;
use super::record::{FieldErrors, Record, ValidationFailed};
use super::registry::{FormRegistry, RegistrationId};
use super::state_machine::DialogStateMachine;

/// A form adapter that always acts on the latest raw form.
pub struct BoundFormAdapter {
    current: Property<Arc<dyn RawForm>>,
}

impl BoundFormAdapter {
    /// Create an adapter reading through to `raw`.
    pub fn new(raw: Arc<dyn RawForm>) -> Self {
        Self {
            current: Property::new(raw),
        }
    }

    /// Point the adapter at a newer raw form.
    pub fn update(&self, raw: Arc<dyn RawForm>) {
        self.current.set_silent(raw);
    }

    /// The raw form currently read through.
    pub fn raw(&self) -> Arc<dyn RawForm> {
        self.current.get()
    }

    fn resolve(&self) -> Arc<dyn FormAdapter> {
        detect_adapter(self.current.get()).adapter
    }
}

impl FormAdapter for BoundFormAdapter {
    fn family(&self) -> AdapterFamily {
        self.current.with(detect_family)
    }

    fn get_values(&self) -> Record {
        self.resolve().get_values()
    }

    fn validate(&self) -> BoxFuture<'_, bool> {
        let adapter = self.resolve();
        Box::pin(async move { adapter.validate().await })
    }

    fn get_validated_values(&self) -> BoxFuture<'_, Result<Record, ValidationFailed>> {
        let adapter = self.resolve();
        Box::pin(async move { adapter.get_validated_values().await })
    }

    fn reset(&self, values: Option<Record>) {
        self.resolve().reset(values);
    }

    fn get_errors(&self) -> FieldErrors {
        self.resolve().get_errors()
    }

    fn set_errors(&self, errors: FieldErrors) {
        self.resolve().set_errors(errors);
    }

    fn is_dirty(&self) -> bool {
        self.resolve().is_dirty()
    }

    fn is_valid(&self) -> bool {
        self.resolve().is_valid()
    }

    fn is_submitting(&self) -> bool {
        self.resolve().is_submitting()
    }

    fn supports_submit(&self) -> bool {
        self.resolve().supports_submit()
    }

    fn submit(&self) -> Option<BoxFuture<'_, bool>> {
        // The form builds its submit future once, inside the wrapper.
        let adapter = self.resolve();
        if !adapter.supports_submit() {
            return None;
        }
        Some(Box::pin(async move {
            match adapter.submit() {
                Some(pending) => pending.await,
                None => false,
            }
        }))
    }
}

/// What a [`AutoFormBinder::sync`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Same kind and raw form as last time; nothing changed.
    Unchanged,
    /// First registration.
    Registered,
    /// Same kind, new raw form: re-registered in place.
    Replaced,
    /// The kind changed: the old kind was released.
    Moved {
        /// The kind released.
        from: OperationKind,
    },
}

#[derive(Debug, Clone, Copy)]
struct Registration {
    kind: OperationKind,
    identity: usize,
    id: RegistrationId,
}

// The adapter cell keeps the last registered raw form alive until the next
// sync, so its address cannot be reused by the form being compared against it.
fn identity_of(raw: &Arc<dyn RawForm>) -> usize {
    Arc::as_ptr(raw) as *const () as usize
}

/// Keeps a mounted form registered under the kind it serves.
///
/// Created through [`DialogHost::binder`](super::DialogHost::binder). Dropping
/// the binder releases its registration.
pub struct AutoFormBinder {
    registry: Arc<FormRegistry>,
    machine: DialogStateMachine,
    adapter: Arc<BoundFormAdapter>,
    registered: Mutex<Option<Registration>>,
}

impl AutoFormBinder {
    pub(crate) fn bind(
        registry: Arc<FormRegistry>,
        machine: DialogStateMachine,
        raw: Arc<dyn RawForm>,
        kind: OperationKind,
    ) -> Self {
        let binder = Self {
            registry,
            machine,
            adapter: Arc::new(BoundFormAdapter::new(Arc::clone(&raw))),
            registered: Mutex::new(None),
        };
        binder.sync(raw, kind);
        binder
    }

    /// Report the raw form and kind of the current render.
    ///
    /// The registry is called without the binder's lock held, so a
    /// [`FormRegistry::changed`] listener may read this binder. Calls are
    /// expected from one render thread at a time.
    pub fn sync(&self, raw: Arc<dyn RawForm>, kind: OperationKind) -> SyncAction {
        let identity = identity_of(&raw);
        self.adapter.update(raw);

        let last = *self.registered.lock();
        let action = match last {
            Some(last) if last.kind == kind && last.identity == identity => {
                return SyncAction::Unchanged;
            }
            Some(last) if last.kind == kind => SyncAction::Replaced,
            Some(last) => {
                self.registry.unregister_if(last.kind, last.id);
                SyncAction::Moved { from: last.kind }
            }
            None => SyncAction::Registered,
        };

        let adapter: Arc<dyn FormAdapter> = self.adapter.clone();
        let id = self.registry.register(kind, adapter);
        *self.registered.lock() = Some(Registration { kind, identity, id });
        tracing::debug!(target: targets::BINDER, %kind, ?action, "form bound");
        action
    }

    /// Release the registration. Later calls do nothing.
    ///
    /// A newer registration for the same kind, made by another binder, is
    /// left in place.
    pub fn teardown(&self) {
        let last = self.registered.lock().take();
        if let Some(last) = last {
            self.registry.unregister_if(last.kind, last.id);
            tracing::debug!(target: targets::BINDER, kind = %last.kind, "form unbound");
        }
    }

    /// The stable adapter this binder registers.
    pub fn adapter(&self) -> Arc<dyn FormAdapter> {
        self.adapter.clone()
    }

    /// The kind currently registered, if any.
    pub fn kind(&self) -> Option<OperationKind> {
        (*self.registered.lock()).map(|r| r.kind)
    }

    /// The current registration, if any.
    pub fn registration_id(&self) -> Option<RegistrationId> {
        (*self.registered.lock()).map(|r| r.id)
    }

    /// Forward the form's dirty flag to the dialog.
    ///
    /// Ignored unless the open session is of this binder's kind.
    pub fn notify_dirty(&self, dirty: bool) -> bool {
        self.serves_open_session() && self.machine.form_dirty_changed(dirty)
    }

    /// Forward the form's validity to the dialog.
    pub fn notify_valid(&self, valid: bool) -> bool {
        self.serves_open_session() && self.machine.form_validity_changed(valid)
    }

    /// The user edited a field; clears a shown error.
    pub fn notify_user_edit(&self) -> bool {
        self.serves_open_session() && self.machine.user_edited()
    }

    fn serves_open_session(&self) -> bool {
        let kind = self.kind();
        kind.is_some() && kind == self.machine.operation_kind()
    }
}

impl Drop for AutoFormBinder {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for AutoFormBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoFormBinder")
            .field("registration", &*self.registered.lock())
            .finish_non_exhaustive()
    }
}
