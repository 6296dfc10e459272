//! In-memory reference implementations of the boundary contracts.
//!
//! Production deployments supply their own persistence; these back the
//! test suites and the simulator.

use crate::engine::types::{Amount, SpinEvent, SpinRecord};
use crate::errors::{EngineResult, PersistenceError};
use crate::traits::{BalanceStore, NotificationSink, SessionLedger};
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

/// Dashmap-backed balance store. Deltas are applied under the per-key
/// entry lock, which serializes updates per player.
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    balances: DashMap<String, Amount>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(player_id: &str, amount: Amount) -> Self {
        let store = Self::new();
        store.set_balance(player_id, amount);
        store
    }

    pub fn set_balance(&self, player_id: &str, amount: Amount) {
        self.balances.insert(player_id.to_string(), amount);
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn balance(&self, player_id: &str) -> EngineResult<Amount> {
        Ok(self
            .balances
            .get(player_id)
            .map(|entry| *entry)
            .unwrap_or(0))
    }

    async fn apply_delta(&self, player_id: &str, delta: i64) -> EngineResult<Amount> {
        let mut entry = self.balances.entry(player_id.to_string()).or_insert(0);
        let next = *entry as i64 + delta;
        if next < 0 {
            return Err(PersistenceError::BalanceWrite(format!(
                "delta {delta} would take player {player_id} below zero"
            ))
            .into());
        }
        *entry = next as Amount;
        Ok(*entry)
    }
}

/// Append-only in-memory ledger keyed by player.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: DashMap<String, Vec<SpinRecord>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_records(&self) -> usize {
        self.records.iter().map(|entry| entry.value().len()).sum()
    }
}

#[async_trait]
impl SessionLedger for InMemoryLedger {
    async fn record_spin(&self, record: &SpinRecord) -> EngineResult<String> {
        self.records
            .entry(record.player_id.clone())
            .or_default()
            .push(record.clone());
        Ok(record.record_id.clone())
    }

    async fn records_for(&self, player_id: &str) -> EngineResult<Vec<SpinRecord>> {
        Ok(self
            .records
            .get(player_id)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }
}

/// Broadcast-backed notification sink. Subscribers that lag or disappear
/// are ignored; notifications are best-effort by contract.
#[derive(Debug)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<SpinEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SpinEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl NotificationSink for BroadcastNotifier {
    async fn notify(&self, event: SpinEvent) {
        let _ = self.sender.send(event);
    }
}

/// Sink that drops every event, for contexts with no UI attached.
#[derive(Debug, Default)]
pub struct NullNotifier;

#[async_trait]
impl NotificationSink for NullNotifier {
    async fn notify(&self, _event: SpinEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Grid;

    fn sample_record(player_id: &str) -> SpinRecord {
        SpinRecord {
            record_id: "r-1".to_string(),
            player_id: player_id.to_string(),
            variant_id: "classic".to_string(),
            wager_amount: 30,
            win_amount: 0,
            grid: Grid::from_rows(&[&["🍒"]]),
            winning_lines: vec![],
            bonus_triggered: false,
            free_spins_awarded: 0,
            jackpot_tier: None,
            free_spin: false,
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn test_balance_delta_roundtrip() {
        let store = InMemoryBalanceStore::with_balance("alice", 1_000);
        assert_eq!(store.balance("alice").await.unwrap(), 1_000);
        assert_eq!(store.apply_delta("alice", -300).await.unwrap(), 700);
        assert_eq!(store.apply_delta("alice", 50).await.unwrap(), 750);
    }

    #[tokio::test]
    async fn test_balance_never_goes_negative() {
        let store = InMemoryBalanceStore::with_balance("alice", 100);
        let err = store.apply_delta("alice", -200).await.unwrap_err();
        assert!(err.to_string().contains("below zero"));
        // Failed write left the balance untouched.
        assert_eq!(store.balance("alice").await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_ledger_appends_in_order() {
        let ledger = InMemoryLedger::new();
        let mut first = sample_record("alice");
        first.record_id = "r-1".to_string();
        let mut second = sample_record("alice");
        second.record_id = "r-2".to_string();

        ledger.record_spin(&first).await.unwrap();
        ledger.record_spin(&second).await.unwrap();

        let records = ledger.records_for("alice").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_id, "r-1");
        assert_eq!(records[1].record_id, "r-2");
        assert!(ledger.records_for("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_notifier_delivers() {
        let notifier = BroadcastNotifier::default();
        let mut receiver = notifier.subscribe();
        notifier
            .notify(SpinEvent::Win {
                player_id: "alice".to_string(),
                amount: 500,
            })
            .await;
        let event = receiver.recv().await.unwrap();
        assert_eq!(
            event,
            SpinEvent::Win {
                player_id: "alice".to_string(),
                amount: 500,
            }
        );
    }

    #[tokio::test]
    async fn test_notifier_without_subscribers_is_silent() {
        let notifier = BroadcastNotifier::default();
        notifier
            .notify(SpinEvent::FreeSpinsGranted {
                player_id: "alice".to_string(),
                count: 3,
            })
            .await;
    }
}
