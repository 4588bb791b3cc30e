//! Core types shared across the skillkit engines.
//!
//! Currently this is the error taxonomy and its presentation layer; see
//! [`error`] for the failure policy this tool follows.

pub mod error;

pub use error::{ErrorContext, SkillkitError, user_friendly_error};
