//! CRUD dialog orchestration.
//!
//! A [`DialogHost`] runs one modal dialog used for the create, edit, view and
//! delete operations of a data table. The pieces:
//!
//! - [`DialogStateMachine`] - the single session and its legal transitions
//! - [`FormRegistry`] - one form adapter per operation kind
//! - [`AutoFormBinder`] - keeps a mounted form registered across renders
//! - [`DialogController`] - validates, merges and submits
//! - [`form`] - adapters over the supported form-library families
//!
//! Forms are only consulted for kinds that need them: delete submits the
//! payload it was opened with, and view never submits.

mod binder;
mod controller;
mod error;
pub mod form;
mod host;
mod operation;
mod record;
mod registry;
mod session;
mod state_machine;

pub use binder::{AutoFormBinder, BoundFormAdapter, SyncAction};
pub use controller::{DialogController, SubmitHandler, SubmitOutcome, SubmitReply};
pub use error::{DialogError, ErrorKind, FormError, HostError, SessionError, SubmitError};
pub use form::{AdapterFamily, FormAdapter, RawForm};
pub use host::DialogHost;
pub use operation::{OperationKind, ParseOperationKindError};
pub use record::{carry_identifier, record_from_value, FieldErrors, Record, ValidationFailed, ValidationResult};
pub use registry::{FormRegistry, RegistrationId, RegistryChange};
pub use session::{DialogSnapshot, DialogState, ExitSnapshot};
pub use state_machine::{DialogStateMachine, OpenRequest, SubmitTicket};
