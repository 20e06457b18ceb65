//! Form schema and submitted-input handling.
//!
//! Flows describe what the host should render with a [`FormSchema`] and get
//! raw submissions back as [`FormInput`]. Validation mirrors what the host's
//! schema layer would do so that flows only ever see typed [`FormValues`].

pub mod errors;
pub mod input;
pub mod keys;
pub mod schema;

pub use errors::{FieldError, FormErrors, BASE_ERROR_KEY};
pub use input::FormInput;
pub use keys::FieldKey;
pub use schema::{FieldKind, FieldValue, FormField, FormSchema, FormValues, SelectOption};
