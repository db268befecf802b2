//! The per-host form registry.
//!
//! Maps each [`OperationKind`] to the adapter of the form currently mounted
//! for it. Binders write, the controller reads. Every mutation is a single
//! write under one lock, so a reader sees either the old or the new adapter
//! for a kind, never a gap in between.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use trellis_core::Signal;
use trellis_core::logging::targets;

use super::form::FormAdapter;
use super::operation::OperationKind;

/// Identifies one `register` call.
///
/// Returned by [`FormRegistry::register`] and used by
/// [`FormRegistry::unregister_if`] so that a stale owner cannot remove a
/// newer registration for the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

/// Notification emitted on [`FormRegistry::changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryChange {
    /// An adapter was installed, possibly replacing another.
    Registered {
        /// The kind.
        kind: OperationKind,
        /// The new registration.
        id: RegistrationId,
        /// Whether an earlier adapter was replaced.
        replaced: bool,
    },
    /// An adapter was removed.
    Unregistered {
        /// The kind.
        kind: OperationKind,
        /// The removed registration.
        id: RegistrationId,
    },
    /// Every adapter was removed.
    Cleared,
}

struct Entry {
    id: RegistrationId,
    adapter: Arc<dyn FormAdapter>,
}

/// Table of mounted form adapters, one per operation kind.
///
/// Owned by a [`DialogHost`](super::DialogHost); there is no global
/// instance.
pub struct FormRegistry {
    entries: RwLock<HashMap<OperationKind, Entry>>,
    next_id: AtomicU64,
    changed: Signal<RegistryChange>,
}

impl FormRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            changed: Signal::new(),
        }
    }

    /// Install `adapter` for `kind`, replacing any existing one.
    #[tracing::instrument(skip(self, adapter), target = "trellis::registry", level = "debug")]
    pub fn register(&self, kind: OperationKind, adapter: Arc<dyn FormAdapter>) -> RegistrationId {
        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let replaced = self
            .entries
            .write()
            .insert(kind, Entry { id, adapter })
            .is_some();

        tracing::debug!(target: targets::REGISTRY, %kind, ?id, replaced, "form adapter registered");
        self.changed.emit(RegistryChange::Registered { kind, id, replaced });
        id
    }

    /// Remove the adapter for `kind`. Returns `true` if one was present.
    pub fn unregister(&self, kind: OperationKind) -> bool {
        let removed = self.entries.write().remove(&kind);
        match removed {
            Some(entry) => {
                tracing::debug!(target: targets::REGISTRY, %kind, id = ?entry.id, "form adapter unregistered");
                self.changed.emit(RegistryChange::Unregistered { kind, id: entry.id });
                true
            }
            None => false,
        }
    }

    /// Remove the adapter for `kind` only if it is still registration `id`.
    pub fn unregister_if(&self, kind: OperationKind, id: RegistrationId) -> bool {
        let removed = {
            let mut entries = self.entries.write();
            match entries.get(&kind) {
                Some(entry) if entry.id == id => entries.remove(&kind).is_some(),
                _ => false,
            }
        };

        if removed {
            tracing::debug!(target: targets::REGISTRY, %kind, ?id, "form adapter unregistered");
            self.changed.emit(RegistryChange::Unregistered { kind, id });
        } else {
            tracing::trace!(target: targets::REGISTRY, %kind, ?id, "stale unregister ignored");
        }
        removed
    }

    /// The adapter registered for `kind`, if any.
    pub fn get(&self, kind: OperationKind) -> Option<Arc<dyn FormAdapter>> {
        self.entries
            .read()
            .get(&kind)
            .map(|entry| Arc::clone(&entry.adapter))
    }

    /// The current registration for `kind`, if any.
    pub fn registration_id(&self, kind: OperationKind) -> Option<RegistrationId> {
        self.entries.read().get(&kind).map(|entry| entry.id)
    }

    /// Whether an adapter is registered for `kind`.
    pub fn contains(&self, kind: OperationKind) -> bool {
        self.entries.read().contains_key(&kind)
    }

    /// Kinds that currently have an adapter, in declaration order.
    pub fn registered_kinds(&self) -> Vec<OperationKind> {
        let mut kinds: Vec<_> = self.entries.read().keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Number of registered adapters.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no adapter is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Remove every adapter.
    pub fn clear(&self) {
        let had_entries = {
            let mut entries = self.entries.write();
            let had = !entries.is_empty();
            entries.clear();
            had
        };
        if had_entries {
            tracing::debug!(target: targets::REGISTRY, "registry cleared");
            self.changed.emit(RegistryChange::Cleared);
        }
    }

    /// Emitted after every change to the table.
    pub fn changed(&self) -> &Signal<RegistryChange> {
        &self.changed
    }
}

impl fmt::Debug for FormRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormRegistry")
            .field("kinds", &self.registered_kinds())
            .finish()
    }
}

static_assertions::assert_impl_all!(FormRegistry: Send, Sync);
