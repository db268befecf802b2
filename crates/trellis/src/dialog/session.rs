//! Dialog session data and the read-only views handed to the UI.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::SessionError;
use super::operation::OperationKind;
use super::record::Record;

/// Lifecycle state of a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogState {
    /// No session is open.
    #[default]
    Closed,
    /// Open and interactive, without an error.
    OpenIdle,
    /// Open with a submission in flight.
    OpenSubmitting,
    /// Open and interactive, showing an error.
    OpenError,
}

impl DialogState {
    /// Whether a session is open.
    pub fn is_open(self) -> bool {
        !matches!(self, DialogState::Closed)
    }

    /// Whether the user may interact with the form.
    pub fn is_interactive(self) -> bool {
        matches!(self, DialogState::OpenIdle | DialogState::OpenError)
    }
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogState::Closed => write!(f, "Closed"),
            DialogState::OpenIdle => write!(f, "Open.Idle"),
            DialogState::OpenSubmitting => write!(f, "Open.Submitting"),
            DialogState::OpenError => write!(f, "Open.Error"),
        }
    }
}

/// The mutable session record. Owned by the state machine.
#[derive(Debug, Clone, Default)]
pub(crate) struct DialogSession {
    pub kind: Option<OperationKind>,
    pub payload: Option<Record>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_submitting: bool,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub error: Option<SessionError>,
}

impl DialogSession {
    /// Start a session for `kind`.
    pub fn opened(
        kind: OperationKind,
        payload: Option<Record>,
        title: Option<String>,
        description: Option<String>,
    ) -> Self {
        let is_delete = kind == OperationKind::Delete;
        Self {
            kind: Some(kind),
            payload,
            title,
            description,
            is_submitting: false,
            is_dirty: is_delete,
            is_valid: matches!(kind, OperationKind::Delete | OperationKind::Create),
            error: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.kind.is_some()
    }

    pub fn state(&self) -> DialogState {
        match (self.is_open(), self.is_submitting, self.error.is_some()) {
            (false, _, _) => DialogState::Closed,
            (true, true, _) => DialogState::OpenSubmitting,
            (true, false, true) => DialogState::OpenError,
            (true, false, false) => DialogState::OpenIdle,
        }
    }

    pub fn snapshot(&self) -> DialogSnapshot {
        DialogSnapshot {
            state: self.state(),
            is_open: self.is_open(),
            operation_kind: self.kind,
            payload: self.payload.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            is_submitting: self.is_submitting,
            is_dirty: self.is_dirty,
            is_valid: self.is_valid,
            is_read_only: self.kind == Some(OperationKind::View),
            error: self.error.clone(),
        }
    }

    /// Content retained for the exit animation, or `None` when closed.
    pub fn exit_content(&self) -> Option<ExitSnapshot> {
        Some(ExitSnapshot {
            operation_kind: self.kind?,
            payload: self.payload.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
        })
    }
}

/// Read-only copy of a dialog session for rendering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DialogSnapshot {
    /// Lifecycle state.
    pub state: DialogState,
    /// Whether a session is open.
    pub is_open: bool,
    /// The session's kind, `None` when closed.
    pub operation_kind: Option<OperationKind>,
    /// The entity being operated on.
    pub payload: Option<Record>,
    /// Dialog title.
    pub title: Option<String>,
    /// Dialog description.
    pub description: Option<String>,
    /// Whether a submission is in flight.
    pub is_submitting: bool,
    /// Whether the form has unsaved changes.
    pub is_dirty: bool,
    /// Whether the form reports valid input.
    pub is_valid: bool,
    /// Whether mutation is disabled (view sessions).
    pub is_read_only: bool,
    /// The current error, if any.
    pub error: Option<SessionError>,
}

impl DialogSnapshot {
    /// Whether the submit action should be enabled.
    pub fn can_submit(&self) -> bool {
        self.state.is_interactive() && !self.is_read_only
    }
}

/// Content of a session that just closed.
///
/// Kept for the close grace delay so an exit animation can still render the
/// dialog's last content. It never reopens anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitSnapshot {
    /// Kind of the closed session.
    pub operation_kind: OperationKind,
    /// Payload of the closed session.
    pub payload: Option<Record>,
    /// Title of the closed session.
    pub title: Option<String>,
    /// Description of the closed session.
    pub description: Option<String>,
}
