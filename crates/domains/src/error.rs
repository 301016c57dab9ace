//! # AppError
//!
//! Centralized error handling for the relay bot.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
///
/// Note that "no votes yet", "unknown message", and "post without a thread"
/// are normal states, not errors: stores return `Option`/default values for
/// those, and the daily cap travels as a submission outcome. Only genuine
/// infrastructure failures travel through this enum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Relational store failure. Fatal for the current event only; the
    /// event is dropped and the platform's own retry is the recovery path.
    #[error("storage error: {0}")]
    Storage(String),

    /// Chat platform API failure. Same policy as `Storage`.
    #[error("chat gateway error: {0}")]
    Gateway(String),
}

/// A specialized Result type for relay bot logic.
pub type Result<T> = std::result::Result<T, AppError>;
