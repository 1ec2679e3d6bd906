//! Shared utilities: errors, crypto helpers and input validation

pub mod crypto;
pub mod error;
pub mod validation;
