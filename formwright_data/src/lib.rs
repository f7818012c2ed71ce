//! Shared data model for Formwright questionnaires and rosters.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_questionnaire, validate_response};
