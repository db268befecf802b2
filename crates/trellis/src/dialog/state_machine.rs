//! The dialog state machine.
//!
//! [`DialogStateMachine`] owns the single dialog session of a host and is the
//! only place it changes. The legal transitions are:
//!
//! ```text
//! Closed ──open──▶ Open.Idle ──begin_submit──▶ Open.Submitting
//!                    ▲   │                        │    │
//!        user_edited │   │ inject_error   failed  │    │ succeeded
//!                    │   ▼                timeout │    ▼
//!                  Open.Error ◀───────────────────┘  Closed
//! ```
//!
//! `close` is accepted from every open state, and `open` from every state
//! (a second open replaces the session).
//!
//! # Stale results
//!
//! Each open bumps a session generation and each submission attempt bumps a
//! submission generation. [`begin_submit`](DialogStateMachine::begin_submit)
//! hands out a [`SubmitTicket`] carrying both; a success, failure or timeout
//! is applied only while its ticket is still current. Whichever lands first
//! invalidates the ticket, so a late emergency timeout can never override a
//! real result and a result arriving after `close` touches nothing.
//!
//! # Timers
//!
//! The machine owns both of its timers: the emergency timeout, armed while
//! submitting, and the close grace delay, which keeps the content of a
//! just-closed session available through [`exit_snapshot`](DialogStateMachine::exit_snapshot)
//! for an exit animation.
//!
//! # Notification
//!
//! Every applied transition emits [`changed`](DialogStateMachine::changed)
//! with a fresh snapshot, after the internal lock has been released.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use trellis_core::logging::targets;
use trellis_core::{Signal, TimerId, TimerManager};

use super::error::DialogError;
use super::operation::OperationKind;
use super::record::Record;
use super::session::{DialogSession, DialogSnapshot, DialogState, ExitSnapshot};
use crate::config::DialogConfig;

/// Parameters of an open request.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRequest {
    /// The operation to run.
    pub kind: OperationKind,
    /// The entity to operate on.
    pub payload: Option<Record>,
    /// Dialog title.
    pub title: Option<String>,
    /// Dialog description.
    pub description: Option<String>,
}

impl OpenRequest {
    /// An open request without payload, title or description.
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            payload: None,
            title: None,
            description: None,
        }
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: Record) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<OperationKind> for OpenRequest {
    fn from(kind: OperationKind) -> Self {
        Self::new(kind)
    }
}

impl From<(OperationKind, Record)> for OpenRequest {
    fn from((kind, payload): (OperationKind, Record)) -> Self {
        Self::new(kind).with_payload(payload)
    }
}

/// Identifies one submission attempt.
///
/// Obtained from [`DialogStateMachine::begin_submit`]. Carries the session's
/// kind and payload as they were when the attempt started.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket {
    session_generation: u64,
    submission_generation: u64,
    kind: OperationKind,
    payload: Option<Record>,
}

impl SubmitTicket {
    /// Kind of the session the attempt belongs to.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Payload of the session the attempt belongs to.
    pub fn payload(&self) -> Option<&Record> {
        self.payload.as_ref()
    }
}

#[derive(Default)]
struct MachineInner {
    session: DialogSession,
    session_generation: u64,
    submission_generation: u64,
    emergency_timer: Option<TimerId>,
    exit: Option<ExitSnapshot>,
    grace_timer: Option<TimerId>,
}

struct Shared {
    inner: Mutex<MachineInner>,
    timers: TimerManager,
    config: DialogConfig,
    changed: Signal<DialogSnapshot>,
    exit_finished: Signal<ExitSnapshot>,
}

/// Owner of a host's dialog session.
///
/// Cloning yields another handle to the same machine.
#[derive(Clone)]
pub struct DialogStateMachine {
    shared: Arc<Shared>,
}

impl DialogStateMachine {
    /// Create a closed machine whose timers run on `timers`.
    pub fn new(config: DialogConfig, timers: TimerManager) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(MachineInner::default()),
                timers,
                config,
                changed: Signal::new(),
                exit_finished: Signal::new(),
            }),
        }
    }

    /// The configuration this machine runs with.
    pub fn config(&self) -> &DialogConfig {
        &self.shared.config
    }

    /// Emitted with a fresh snapshot after every applied transition.
    pub fn changed(&self) -> &Signal<DialogSnapshot> {
        &self.shared.changed
    }

    /// Emitted when the close grace delay ends and the exit content is
    /// dropped.
    pub fn exit_finished(&self) -> &Signal<ExitSnapshot> {
        &self.shared.exit_finished
    }

    /// A read-only copy of the session.
    pub fn snapshot(&self) -> DialogSnapshot {
        self.shared.inner.lock().session.snapshot()
    }

    /// The current lifecycle state.
    pub fn state(&self) -> DialogState {
        self.shared.inner.lock().session.state()
    }

    /// Kind of the open session.
    pub fn operation_kind(&self) -> Option<OperationKind> {
        self.shared.inner.lock().session.kind
    }

    /// Content of the most recently closed session, while its grace delay
    /// is running.
    pub fn exit_snapshot(&self) -> Option<ExitSnapshot> {
        self.shared.inner.lock().exit.clone()
    }

    /// Whether `ticket` still identifies the in-flight submission.
    pub fn is_current(&self, ticket: &SubmitTicket) -> bool {
        Self::ticket_matches(&self.shared.inner.lock(), ticket)
    }

    /// Open a session, replacing any open one.
    #[tracing::instrument(skip_all, target = "trellis::dialog", level = "debug", fields(kind = %request.kind))]
    pub fn open(&self, request: OpenRequest) {
        let snapshot = {
            let mut inner = self.shared.inner.lock();
            let replaced = inner.session.state();
            self.disarm_emergency(&mut inner);
            self.disarm_grace(&mut inner);
            inner.exit = None;
            inner.session_generation += 1;
            inner.submission_generation += 1;
            inner.session = DialogSession::opened(
                request.kind,
                request.payload,
                request.title,
                request.description,
            );
            tracing::debug!(
                target: targets::DIALOG,
                kind = %request.kind,
                %replaced,
                generation = inner.session_generation,
                "dialog opened"
            );
            inner.session.snapshot()
        };
        self.shared.changed.emit(snapshot);
    }

    /// Close the open session.
    ///
    /// Returns `false` when nothing was open, or when a submission is in
    /// flight and the configuration does not allow closing during it. Any
    /// in-flight result is discarded once closed.
    pub fn close(&self) -> bool {
        let snapshot = {
            let mut inner = self.shared.inner.lock();
            if !inner.session.is_open() {
                tracing::trace!(target: targets::DIALOG, "close ignored: not open");
                return false;
            }
            if inner.session.is_submitting && !self.shared.config.allow_close_while_submitting {
                tracing::debug!(target: targets::DIALOG, "close refused while submitting");
                return false;
            }
            self.close_locked(&mut inner);
            tracing::debug!(target: targets::DIALOG, "dialog closed");
            inner.session.snapshot()
        };
        self.shared.changed.emit(snapshot);
        true
    }

    /// Record the form's dirty flag.
    ///
    /// Ignored when closed and for delete sessions, which are always dirty.
    pub fn form_dirty_changed(&self, dirty: bool) -> bool {
        self.update_flag(|session| &mut session.is_dirty, dirty)
    }

    /// Record the form's validity.
    ///
    /// Ignored when closed and for delete sessions, which are always valid.
    pub fn form_validity_changed(&self, valid: bool) -> bool {
        self.update_flag(|session| &mut session.is_valid, valid)
    }

    /// The user interacted with the form: an error is cleared.
    pub fn user_edited(&self) -> bool {
        let snapshot = {
            let mut inner = self.shared.inner.lock();
            if inner.session.state() != DialogState::OpenError {
                return false;
            }
            inner.session.error = None;
            tracing::debug!(target: targets::DIALOG, "error cleared by user edit");
            inner.session.snapshot()
        };
        self.shared.changed.emit(snapshot);
        true
    }

    /// Enter `Open.Submitting`.
    ///
    /// Returns `None` when closed, already submitting, or read-only.
    pub fn begin_submit(&self) -> Option<SubmitTicket> {
        let (ticket, snapshot) = {
            let mut inner = self.shared.inner.lock();
            let kind = inner.session.kind?;
            if inner.session.is_submitting {
                tracing::trace!(target: targets::DIALOG, "begin_submit ignored: already submitting");
                return None;
            }
            if !kind.is_mutating() {
                tracing::debug!(target: targets::DIALOG, %kind, "begin_submit refused: read-only session");
                return None;
            }

            inner.submission_generation += 1;
            inner.session.is_submitting = true;
            inner.session.error = None;

            let ticket = SubmitTicket {
                session_generation: inner.session_generation,
                submission_generation: inner.submission_generation,
                kind,
                payload: inner.session.payload.clone(),
            };
            self.arm_emergency(&mut inner, ticket.clone());
            tracing::debug!(
                target: targets::DIALOG,
                %kind,
                submission = ticket.submission_generation,
                "submission started"
            );
            (ticket, inner.session.snapshot())
        };
        self.shared.changed.emit(snapshot);
        Some(ticket)
    }

    /// Apply a successful submission: the dialog closes.
    ///
    /// Returns `false` and changes nothing if the ticket is stale.
    pub fn submit_succeeded(&self, ticket: &SubmitTicket) -> bool {
        let snapshot = {
            let mut inner = self.shared.inner.lock();
            if !Self::ticket_matches(&inner, ticket) {
                tracing::debug!(target: targets::DIALOG, "stale success discarded");
                return false;
            }
            self.close_locked(&mut inner);
            tracing::debug!(target: targets::DIALOG, kind = %ticket.kind, "submission succeeded");
            inner.session.snapshot()
        };
        self.shared.changed.emit(snapshot);
        true
    }

    /// Apply a failed submission: the dialog stays open showing `error`.
    ///
    /// Returns `false` and changes nothing if the ticket is stale.
    pub fn submit_failed(&self, ticket: &SubmitTicket, error: &DialogError) -> bool {
        let snapshot = {
            let mut inner = self.shared.inner.lock();
            if !Self::ticket_matches(&inner, ticket) {
                tracing::debug!(target: targets::DIALOG, %error, "stale failure discarded");
                return false;
            }
            self.fail_locked(&mut inner, error);
            tracing::debug!(target: targets::DIALOG, kind = %ticket.kind, %error, "submission failed");
            inner.session.snapshot()
        };
        self.shared.changed.emit(snapshot);
        true
    }

    /// Show an error raised outside the submission pathway.
    ///
    /// Ignored when closed or while submitting.
    pub fn inject_error(&self, error: &DialogError) -> bool {
        let snapshot = {
            let mut inner = self.shared.inner.lock();
            if !inner.session.state().is_interactive() {
                tracing::trace!(target: targets::DIALOG, %error, "inject_error ignored");
                return false;
            }
            inner.session.error = Some(error.to_session_error(&self.shared.config.messages));
            tracing::debug!(target: targets::DIALOG, %error, "error injected");
            inner.session.snapshot()
        };
        self.shared.changed.emit(snapshot);
        true
    }

    fn update_flag(&self, field: impl FnOnce(&mut DialogSession) -> &mut bool, value: bool) -> bool {
        let snapshot = {
            let mut inner = self.shared.inner.lock();
            match inner.session.kind {
                None | Some(OperationKind::Delete) => return false,
                Some(_) => {}
            }
            let flag = field(&mut inner.session);
            if *flag == value {
                return false;
            }
            *flag = value;
            inner.session.snapshot()
        };
        self.shared.changed.emit(snapshot);
        true
    }

    fn ticket_matches(inner: &MachineInner, ticket: &SubmitTicket) -> bool {
        inner.session.is_submitting
            && inner.session_generation == ticket.session_generation
            && inner.submission_generation == ticket.submission_generation
    }

    fn fail_locked(&self, inner: &mut MachineInner, error: &DialogError) {
        inner.submission_generation += 1;
        self.disarm_emergency(inner);
        inner.session.is_submitting = false;
        inner.session.error = Some(error.to_session_error(&self.shared.config.messages));
    }

    fn close_locked(&self, inner: &mut MachineInner) {
        self.disarm_emergency(inner);
        self.disarm_grace(inner);
        inner.exit = inner.session.exit_content();
        inner.session = DialogSession::default();
        inner.session_generation += 1;
        inner.submission_generation += 1;

        let grace = self.shared.config.close_grace();
        if grace.is_zero() {
            inner.exit = None;
            return;
        }
        let weak = Arc::downgrade(&self.shared);
        let generation = inner.session_generation;
        inner.grace_timer = Some(self.shared.timers.start_one_shot(grace, move || {
            Self::finish_exit(&weak, generation);
        }));
    }

    fn arm_emergency(&self, inner: &mut MachineInner, ticket: SubmitTicket) {
        self.disarm_emergency(inner);
        let weak = Arc::downgrade(&self.shared);
        let timeout = self.shared.config.emergency_timeout();
        inner.emergency_timer = Some(self.shared.timers.start_one_shot(timeout, move || {
            Self::expire_submission(&weak, &ticket);
        }));
    }

    fn disarm_emergency(&self, inner: &mut MachineInner) {
        if let Some(id) = inner.emergency_timer.take() {
            // Already gone when the timer is the caller.
            let _ = self.shared.timers.stop(id);
        }
    }

    fn disarm_grace(&self, inner: &mut MachineInner) {
        if let Some(id) = inner.grace_timer.take() {
            let _ = self.shared.timers.stop(id);
        }
    }

    fn expire_submission(weak: &Weak<Shared>, ticket: &SubmitTicket) {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let machine = DialogStateMachine { shared };
        let snapshot = {
            let mut inner = machine.shared.inner.lock();
            if !Self::ticket_matches(&inner, ticket) {
                tracing::trace!(target: targets::DIALOG, "emergency timeout for settled submission ignored");
                return;
            }
            inner.emergency_timer = None;
            machine.fail_locked(&mut inner, &DialogError::Timeout);
            tracing::warn!(
                target: targets::DIALOG,
                kind = %ticket.kind,
                timeout_ms = machine.shared.config.emergency_timeout_ms,
                "submission timed out, dialog recovered"
            );
            inner.session.snapshot()
        };
        machine.shared.changed.emit(snapshot);
    }

    fn finish_exit(weak: &Weak<Shared>, generation: u64) {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let exit = {
            let mut inner = shared.inner.lock();
            if inner.session_generation != generation {
                return;
            }
            inner.grace_timer = None;
            inner.exit.take()
        };
        if let Some(exit) = exit {
            tracing::trace!(target: targets::DIALOG, "exit content released");
            shared.exit_finished.emit(exit);
        }
    }
}

impl fmt::Debug for DialogStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("DialogStateMachine")
            .field("state", &inner.session.state())
            .field("kind", &inner.session.kind)
            .field("session_generation", &inner.session_generation)
            .field("submission_generation", &inner.submission_generation)
            .finish()
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        for id in [inner.emergency_timer.take(), inner.grace_timer.take()]
            .into_iter()
            .flatten()
        {
            let _ = self.timers.stop(id);
        }
    }
}

static_assertions::assert_impl_all!(DialogStateMachine: Send, Sync);
