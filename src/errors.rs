//! Error types for the outcome engine.
//!
//! Generation, evaluation and resolution are total functions over valid
//! input and never produce errors; everything here belongs to the boundary
//! (wager validation, configuration load, persistence).

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type EngineResult<T> = Result<T, EngineError>;

/// Root error type for spin processing.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Wager exceeds the player's current balance. Rejected before any
    /// generation occurs; no state is mutated.
    #[error("insufficient funds: wager {wager} exceeds balance {balance}")]
    InsufficientFunds { wager: u64, balance: u64 },

    /// Non-positive wager.
    #[error("invalid wager: {0}")]
    InvalidWager(String),

    /// No variant with the requested id is registered.
    #[error("unknown game variant: {0}")]
    UnknownVariant(String),

    /// The player's session has been closed; no further spins are accepted.
    #[error("session closed for player {0}")]
    SessionClosed(String),

    /// Variant configuration is malformed. Detected at load time and fatal
    /// to that variant, never per-spin.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A ledger or balance write failed after the settlement was computed.
    /// The spin did not complete and the balance is left unchanged.
    #[error("persistence failure: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Configuration and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load variant configuration: {0}")]
    LoadFailed(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("missing required field: {0}")]
    MissingRequired(String),

    #[error("invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Boundary I/O failures while committing a settlement.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("ledger write failed: {0}")]
    LedgerWrite(String),

    #[error("balance update failed: {0}")]
    BalanceWrite(String),
}
