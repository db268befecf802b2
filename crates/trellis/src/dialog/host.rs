//! The dialog host: one registry, one state machine, one controller.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use trellis_core::logging::targets;
use trellis_core::{Signal, TimerManager};

use super::binder::AutoFormBinder;
use super::controller::{DialogController, SubmitHandler, SubmitOutcome};
use super::error::HostError;
use super::form::RawForm;
use super::operation::OperationKind;
use super::registry::FormRegistry;
use super::session::{DialogSnapshot, ExitSnapshot};
use super::state_machine::{DialogStateMachine, OpenRequest};
use crate::config::DialogConfig;

/// Hosts a single CRUD dialog.
///
/// The host owns the session state machine, the form registry its forms bind
/// into, and the controller that runs submissions. Forms rendered inside the
/// dialog obtain an [`AutoFormBinder`] through [`binder`](Self::binder).
///
/// # Example
///
/// ```
/// use trellis::config::DialogConfig;
/// use trellis::dialog::{DialogHost, DialogState, OperationKind, Record, SubmitError};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let host = DialogHost::new(DialogConfig::default(), |data: Record, _kind: OperationKind| async move {
///     println!("deleting {:?}", data.get("id"));
///     Ok::<_, SubmitError>(true)
/// })?;
///
/// let mut payload = Record::new();
/// payload.insert("id".into(), 7.into());
/// host.open((OperationKind::Delete, payload));
///
/// host.request_submit().await;
/// assert_eq!(host.snapshot().state, DialogState::Closed);
/// # Ok(())
/// # }
/// ```
pub struct DialogHost {
    registry: Arc<FormRegistry>,
    machine: DialogStateMachine,
    controller: DialogController,
}

impl DialogHost {
    /// Create a host whose timers run on the current tokio runtime.
    pub fn new(config: DialogConfig, handler: impl SubmitHandler + 'static) -> Result<Self, HostError> {
        config.validate()?;
        let timers = TimerManager::new()?;
        Ok(Self::assemble(config, handler, timers))
    }

    /// Create a host whose timers run on `handle`.
    pub fn with_handle(
        config: DialogConfig,
        handler: impl SubmitHandler + 'static,
        handle: Handle,
    ) -> Result<Self, HostError> {
        config.validate()?;
        Ok(Self::assemble(config, handler, TimerManager::with_handle(handle)))
    }

    fn assemble(config: DialogConfig, handler: impl SubmitHandler + 'static, timers: TimerManager) -> Self {
        let registry = Arc::new(FormRegistry::new());
        let machine = DialogStateMachine::new(config, timers);
        let controller = DialogController::new(machine.clone(), registry.clone(), Arc::new(handler));
        tracing::debug!(target: targets::DIALOG, "dialog host created");
        Self {
            registry,
            machine,
            controller,
        }
    }

    /// Bind a mounted form serving `kind`.
    ///
    /// Call [`AutoFormBinder::sync`] on each later render and drop the binder
    /// when the form unmounts.
    pub fn binder(&self, raw: Arc<dyn RawForm>, kind: OperationKind) -> AutoFormBinder {
        AutoFormBinder::bind(self.registry.clone(), self.machine.clone(), raw, kind)
    }

    /// Open a dialog session, replacing any open one.
    pub fn open(&self, request: impl Into<OpenRequest>) {
        self.controller.open(request);
    }

    /// Close the dialog. Returns `false` if nothing was closed.
    pub fn close(&self) -> bool {
        self.controller.close()
    }

    /// Run one submission attempt.
    pub async fn request_submit(&self) -> SubmitOutcome {
        self.controller.request_submit().await
    }

    /// A read-only copy of the session.
    pub fn snapshot(&self) -> DialogSnapshot {
        self.machine.snapshot()
    }

    /// Content of the just-closed session while its exit grace delay runs.
    pub fn exit_snapshot(&self) -> Option<ExitSnapshot> {
        self.machine.exit_snapshot()
    }

    /// Emitted with a fresh snapshot after every state change.
    pub fn changed(&self) -> &Signal<DialogSnapshot> {
        self.machine.changed()
    }

    /// The submission controller.
    pub fn controller(&self) -> &DialogController {
        &self.controller
    }

    /// The session state machine.
    pub fn machine(&self) -> &DialogStateMachine {
        &self.machine
    }

    /// The form registry.
    pub fn registry(&self) -> &Arc<FormRegistry> {
        &self.registry
    }

    /// The configuration this host runs with.
    pub fn config(&self) -> &DialogConfig {
        self.machine.config()
    }
}

impl fmt::Debug for DialogHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogHost")
            .field("machine", &self.machine)
            .field("registry", &self.registry)
            .finish()
    }
}
