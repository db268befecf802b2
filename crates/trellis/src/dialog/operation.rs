//! Operation kinds served by a dialog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which behavior branch a dialog session runs.
///
/// The kind is fixed for the lifetime of a session and is also the key under
/// which a mounted form registers its adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Create a new entity from an empty or prefilled form.
    Create,
    /// Edit an existing entity.
    Edit,
    /// Read-only display of an entity.
    View,
    /// Confirm removal of an entity. There are no fields to validate.
    Delete,
    /// Application-defined operation.
    Custom,
}

impl OperationKind {
    /// All kinds, in declaration order.
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Create,
        OperationKind::Edit,
        OperationKind::View,
        OperationKind::Delete,
        OperationKind::Custom,
    ];

    /// Returns `true` if a session of this kind may submit anything.
    pub fn is_mutating(self) -> bool {
        !matches!(self, OperationKind::View)
    }

    /// Returns `true` if submission goes through a registered form adapter.
    ///
    /// Delete sessions submit their payload directly, and view sessions
    /// never submit.
    pub fn requires_form(self) -> bool {
        matches!(
            self,
            OperationKind::Create | OperationKind::Edit | OperationKind::Custom
        )
    }

    /// Lower-case name, as used in configuration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Edit => "edit",
            OperationKind::View => "view",
            OperationKind::Delete => "delete",
            OperationKind::Custom => "custom",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown operation kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation kind: {0:?}")]
pub struct ParseOperationKindError(pub String);

impl FromStr for OperationKind {
    type Err = ParseOperationKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseOperationKindError(s.to_string()))
    }
}
