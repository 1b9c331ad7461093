//! Core types shared by every FAAS command.
//!
//! FAAS keeps its error handling in one place so that every command reports
//! failures the same way:
//! - **Strongly-typed errors** ([`FaasError`]) for precise handling in code
//! - **User-friendly contexts** ([`ErrorContext`]) with details and suggestions
//! - **Conversion** of arbitrary [`anyhow::Error`]s through [`user_friendly_error`]
//! - **Exit codes** per error kind via [`FaasError::exit_code`]

pub mod error;

pub use error::{ErrorContext, FaasError, user_friendly_error};
