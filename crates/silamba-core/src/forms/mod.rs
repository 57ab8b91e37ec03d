//! Admin record forms.
//!
//! A form holds one string per declared field, validates presence of the
//! required ones, and only then produces a record to send. Nothing is
//! written to the server from an invalid form.

pub mod confirm;
pub mod editable;
pub mod field;
pub mod form;

pub use confirm::{ConfirmDelete, DeleteTarget};
pub use editable::Editable;
pub use field::{FieldKind, FieldSpec, FieldValues};
pub use form::{blank_form, FormEditor, FormError, RecordForm, Submission, ValidationError};
