//! External collaborator contracts.
//!
//! The engine touches the outside world only through these traits: balance
//! custody, the append-only spin ledger and the user-facing notification
//! sink. Everything else in the pipeline is pure computation.

use crate::engine::types::{Amount, SpinEvent, SpinRecord};
use crate::errors::EngineResult;
use async_trait::async_trait;

/// Per-player balance custody. Implementations must apply deltas
/// atomically per player: two in-flight updates for one player must
/// serialize, never lose a write.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    async fn balance(&self, player_id: &str) -> EngineResult<Amount>;

    /// Apply a signed delta and return the resulting balance. Fails
    /// without mutating anything if the result would go negative.
    async fn apply_delta(&self, player_id: &str, delta: i64) -> EngineResult<Amount>;
}

/// Append-only record of settled spins. Records are never updated after
/// the initial write.
#[async_trait]
pub trait SessionLedger: Send + Sync {
    /// Persist one spin record, returning its id.
    async fn record_spin(&self, record: &SpinRecord) -> EngineResult<String>;

    /// All records for a player, oldest first.
    async fn records_for(&self, player_id: &str) -> EngineResult<Vec<SpinRecord>>;
}

/// Fire-and-forget sink for user-facing events. Not part of financial
/// correctness; failures are swallowed.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: SpinEvent);
}
