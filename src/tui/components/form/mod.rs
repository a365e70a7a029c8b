//! Application form with field-level validation

pub mod input;
pub mod modal_form;
pub mod validator;

pub use modal_form::ModalForm;
pub use validator::{Field, FormValues};
