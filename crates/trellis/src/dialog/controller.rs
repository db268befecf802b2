//! Submission orchestration.
//!
//! [`DialogController::request_submit`] runs one submission attempt end to
//! end: it enters `Open.Submitting`, resolves and validates the form for the
//! session's kind, merges the result with the payload, calls the
//! application's [`SubmitHandler`] and applies the outcome to the state
//! machine.
//!
//! Every suspension point re-checks the attempt's [`SubmitTicket`]. Once the
//! ticket is stale (the dialog closed, reopened or timed out) the attempt
//! stops and its result is discarded.
//!
//! # Success convention
//!
//! Only [`SubmitReply::Accepted`] closes the dialog. A handler that declines,
//! returns no verdict, or fails keeps the dialog open with an error.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tracing::Instrument;
use trellis_core::Property;
use trellis_core::logging::targets;

use super::error::{DialogError, SubmitError};
use super::form::FormAdapter;
use super::operation::OperationKind;
use super::record::{carry_identifier, FieldErrors, Record};
use super::registry::FormRegistry;
use super::session::DialogSnapshot;
use super::state_machine::{DialogStateMachine, OpenRequest, SubmitTicket};

/// The verdict of a submit handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReply {
    /// The operation succeeded; the dialog closes.
    Accepted,
    /// The operation was refused; the dialog stays open.
    Declined,
    /// The handler returned no verdict. Treated like [`Declined`](Self::Declined).
    Unspecified,
}

impl SubmitReply {
    /// Whether this reply closes the dialog.
    pub fn is_success(self) -> bool {
        matches!(self, SubmitReply::Accepted)
    }
}

impl From<bool> for SubmitReply {
    fn from(accepted: bool) -> Self {
        if accepted {
            SubmitReply::Accepted
        } else {
            SubmitReply::Declined
        }
    }
}

impl From<()> for SubmitReply {
    fn from(_: ()) -> Self {
        SubmitReply::Unspecified
    }
}

/// The application's submit callback.
///
/// Implemented for async closures of the shape
/// `Fn(Record, OperationKind) -> impl Future<Output = Result<R, SubmitError>>`
/// where `R` is `bool`, `()` or [`SubmitReply`]:
///
/// ```
/// use trellis::dialog::{OperationKind, Record, SubmitError, SubmitHandler};
///
/// fn assert_handler(_: impl SubmitHandler) {}
///
/// assert_handler(|data: Record, kind: OperationKind| async move {
///     if data.is_empty() {
///         return Err(SubmitError::new(format!("nothing to {kind}")));
///     }
///     Ok(true)
/// });
/// ```
pub trait SubmitHandler: Send + Sync {
    /// Persist `data` for an operation of `kind`.
    fn submit(
        &self,
        data: Record,
        kind: OperationKind,
    ) -> BoxFuture<'static, Result<SubmitReply, SubmitError>>;
}

impl<F, Fut, R> SubmitHandler for F
where
    F: Fn(Record, OperationKind) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, SubmitError>> + Send + 'static,
    R: Into<SubmitReply>,
{
    fn submit(
        &self,
        data: Record,
        kind: OperationKind,
    ) -> BoxFuture<'static, Result<SubmitReply, SubmitError>> {
        let pending = self(data, kind);
        Box::pin(async move { pending.await.map(Into::into) })
    }
}

/// How a [`DialogController::request_submit`] call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No attempt was started: the dialog was closed, already submitting,
    /// or read-only.
    Ignored,
    /// The handler accepted and the dialog closed.
    Succeeded,
    /// The attempt failed and the dialog shows the error.
    Failed(DialogError),
    /// The session moved on while the attempt was suspended; nothing was
    /// applied.
    Discarded,
}

enum Abort {
    Stale,
    Failed(DialogError),
}

impl From<DialogError> for Abort {
    fn from(err: DialogError) -> Self {
        Abort::Failed(err)
    }
}

/// Drives submissions for one dialog host.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct DialogController {
    machine: DialogStateMachine,
    registry: Arc<FormRegistry>,
    handler: Arc<Property<Arc<dyn SubmitHandler>>>,
}

impl DialogController {
    pub(crate) fn new(
        machine: DialogStateMachine,
        registry: Arc<FormRegistry>,
        handler: Arc<dyn SubmitHandler>,
    ) -> Self {
        Self {
            machine,
            registry,
            handler: Arc::new(Property::new(handler)),
        }
    }

    /// Replace the submit handler. Attempts already past validation keep the
    /// handler they started with.
    pub fn set_submit_handler(&self, handler: impl SubmitHandler + 'static) {
        self.handler.set_silent(Arc::new(handler));
    }

    /// Open a dialog session.
    pub fn open(&self, request: impl Into<OpenRequest>) {
        self.machine.open(request.into());
    }

    /// Close the dialog. See [`DialogStateMachine::close`].
    pub fn close(&self) -> bool {
        self.machine.close()
    }

    /// A read-only copy of the session.
    pub fn snapshot(&self) -> DialogSnapshot {
        self.machine.snapshot()
    }

    /// Run one submission attempt.
    pub async fn request_submit(&self) -> SubmitOutcome {
        let Some(ticket) = self.machine.begin_submit() else {
            tracing::debug!(target: targets::CONTROLLER, state = %self.machine.state(), "submit request ignored");
            return SubmitOutcome::Ignored;
        };

        let span = tracing::debug_span!(target: targets::CONTROLLER, "submit", kind = %ticket.kind());
        let result = self.attempt(&ticket).instrument(span).await;

        let applied = match &result {
            Ok(()) => self.machine.submit_succeeded(&ticket),
            Err(Abort::Failed(err)) => self.machine.submit_failed(&ticket, err),
            Err(Abort::Stale) => false,
        };
        if !applied {
            tracing::debug!(target: targets::CONTROLLER, kind = %ticket.kind(), "stale submission result discarded");
            return SubmitOutcome::Discarded;
        }
        match result {
            Ok(()) => SubmitOutcome::Succeeded,
            Err(Abort::Failed(err)) => SubmitOutcome::Failed(err),
            Err(Abort::Stale) => SubmitOutcome::Discarded,
        }
    }

    /// Show server-side field errors in the form and the dialog.
    ///
    /// Returns `false` if no session is open or a submission is in flight.
    pub fn set_field_errors(&self, errors: FieldErrors) -> bool {
        let Some(kind) = self.machine.operation_kind() else {
            return false;
        };
        let error = DialogError::External {
            message: self.machine.config().messages.validation_failed.clone(),
            errors: errors.clone(),
        };
        if !self.machine.inject_error(&error) {
            return false;
        }
        if let Some(adapter) = self.registry.get(kind) {
            adapter.set_errors(errors);
        }
        true
    }

    /// Reset the open session's form.
    ///
    /// With `None` the current input is kept and only errors and dirty state
    /// are cleared. Returns `false` when no form is registered for the open
    /// session.
    pub fn reset_form(&self, values: Option<Record>) -> bool {
        let Some(adapter) = self
            .machine
            .operation_kind()
            .and_then(|kind| self.registry.get(kind))
        else {
            return false;
        };
        adapter.reset(values);
        self.machine.form_dirty_changed(false);
        self.machine.user_edited();
        true
    }

    async fn attempt(&self, ticket: &SubmitTicket) -> Result<(), Abort> {
        let kind = ticket.kind();
        let data = if kind.requires_form() {
            self.collect(ticket).await?
        } else {
            ticket.payload().cloned().unwrap_or_default()
        };

        // Close or reopen may have happened while validating.
        self.ensure_current(ticket)?;
        let handler = self.handler.get();
        let reply = handler.submit(data, kind).await;
        self.ensure_current(ticket)?;

        match reply {
            Ok(SubmitReply::Accepted) => Ok(()),
            Ok(reply) => {
                if reply == SubmitReply::Unspecified {
                    tracing::debug!(target: targets::CONTROLLER, %kind, "handler returned no verdict, keeping dialog open");
                }
                Err(DialogError::Submission { message: None }.into())
            }
            Err(err) => Err(DialogError::Submission {
                message: err.message,
            }
            .into()),
        }
    }

    async fn collect(&self, ticket: &SubmitTicket) -> Result<Record, Abort> {
        let kind = ticket.kind();
        let adapter = self.resolve_adapter(ticket).await?;

        let validated = adapter.get_validated_values().await;
        self.ensure_current(ticket)?;
        let mut data = validated.map_err(|failed| DialogError::Validation {
            errors: failed.errors,
        })?;

        if kind == OperationKind::Edit {
            let field = &self.machine.config().identifier_field;
            if carry_identifier(ticket.payload(), &mut data, field) {
                tracing::trace!(target: targets::CONTROLLER, field = %field, "identifier carried into edit data");
            }
        }
        Ok(data)
    }

    async fn resolve_adapter(&self, ticket: &SubmitTicket) -> Result<Arc<dyn FormAdapter>, Abort> {
        let kind = ticket.kind();
        if let Some(adapter) = self.registry.get(kind) {
            return Ok(adapter);
        }

        let delay = self.machine.config().registration_retry();
        tracing::debug!(target: targets::CONTROLLER, %kind, ?delay, "form not registered yet, retrying once");
        tokio::time::sleep(delay).await;
        self.ensure_current(ticket)?;

        self.registry.get(kind).ok_or_else(|| {
            tracing::warn!(target: targets::CONTROLLER, %kind, "no form registered after retry");
            Abort::Failed(DialogError::Registration { kind })
        })
    }

    fn ensure_current(&self, ticket: &SubmitTicket) -> Result<(), Abort> {
        if self.machine.is_current(ticket) {
            Ok(())
        } else {
            Err(Abort::Stale)
        }
    }
}

impl std::fmt::Debug for DialogController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogController")
            .field("machine", &self.machine)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
