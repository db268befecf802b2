//! Prelude module for Trellis.
//!
//! ```ignore
//! use trellis::prelude::*;
//! ```
//!
//! This provides access to:
//! - Dialog hosting (`DialogHost`, `DialogConfig`)
//! - Sessions and snapshots (`OpenRequest`, `DialogSnapshot`, `DialogState`)
//! - Submission (`SubmitHandler`, `SubmitReply`, `SubmitOutcome`)
//! - Form integration (`RawForm`, `FormAdapter`, `AutoFormBinder`)

// ============================================================================
// Signal/Slot and Property System
// ============================================================================

pub use crate::{ConnectionId, Property, Signal};

// ============================================================================
// Configuration
// ============================================================================

pub use crate::config::{ConfigError, DialogConfig, ErrorMessages};

// ============================================================================
// Dialog Host and Session
// ============================================================================

pub use crate::dialog::{
    DialogHost, DialogSnapshot, DialogState, ExitSnapshot, OpenRequest, OperationKind,
};

// ============================================================================
// Submission
// ============================================================================

pub use crate::dialog::{
    DialogError, SessionError, SubmitError, SubmitHandler, SubmitOutcome, SubmitReply,
};

// ============================================================================
// Forms
// ============================================================================

pub use crate::dialog::form::{FieldStore, FormState, TriggerForm, ValidatingForm};
pub use crate::dialog::{AutoFormBinder, FieldErrors, FormAdapter, FormError, RawForm, Record};
