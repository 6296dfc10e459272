//! Spin orchestration.
//!
//! Sequences one spin end to end: wager validation, generation,
//! evaluation, resolution, persistence, notification, then chains any
//! granted free spins. The whole pipeline for one player runs under that
//! player's session lock, so two in-flight spins from the same session
//! serialize instead of racing the balance.

use crate::config::VariantRegistry;
use crate::engine::types::{
    Amount, SpinEvent, SpinOutcome, SpinPhase, SpinRecord, SpinSequence, Wager, WinEvaluation,
};
use crate::engine::{evaluator, generator, resolver};
use crate::errors::{EngineError, EngineResult};
use crate::rng::RngSource;
use crate::session::{SessionManager, SessionState};
use crate::stats::RtpTracker;
use crate::traits::{BalanceStore, NotificationSink, SessionLedger};
use crate::variant::GameVariant;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Orchestrator tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Consume granted free spins immediately after the paid spin settles.
    pub auto_chain_free_spins: bool,
    /// Extra attempts for each persistence step before the spin fails.
    pub persistence_retries: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            auto_chain_free_spins: true,
            persistence_retries: 2,
        }
    }
}

/// Drives the spin pipeline against the boundary collaborators.
pub struct SpinOrchestrator {
    registry: Arc<VariantRegistry>,
    sessions: Arc<SessionManager>,
    balances: Arc<dyn BalanceStore>,
    ledger: Arc<dyn SessionLedger>,
    notifier: Arc<dyn NotificationSink>,
    stats: Arc<RtpTracker>,
    rng: Mutex<Box<dyn RngSource>>,
    config: OrchestratorConfig,
}

impl SpinOrchestrator {
    pub fn new(
        registry: Arc<VariantRegistry>,
        balances: Arc<dyn BalanceStore>,
        ledger: Arc<dyn SessionLedger>,
        notifier: Arc<dyn NotificationSink>,
        rng: Box<dyn RngSource>,
    ) -> Self {
        Self {
            registry,
            sessions: Arc::new(SessionManager::new()),
            balances,
            ledger,
            notifier,
            stats: Arc::new(RtpTracker::new()),
            rng: Mutex::new(rng),
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn stats(&self) -> &Arc<RtpTracker> {
        &self.stats
    }

    /// Execute one paid spin, then auto-chain any granted free spins while
    /// the session stays live.
    pub async fn spin(
        &self,
        player_id: &str,
        variant_id: &str,
        wager: Wager,
    ) -> EngineResult<SpinSequence> {
        let variant = self.variant(variant_id)?;
        let handle = self.sessions.session(player_id);
        if !handle.is_live() {
            return Err(EngineError::SessionClosed(player_id.to_string()));
        }

        let mut state = handle.state.lock().await;
        // The previous settlement's display cycle is over.
        state.bonus_active = false;

        if wager.stake == 0 {
            return Err(EngineError::InvalidWager(
                "stake must be positive".to_string(),
            ));
        }

        state.phase = SpinPhase::WagerValidated;
        let total = wager.total_for(&variant);
        let balance = self.balances.balance(player_id).await?;
        if total > balance {
            state.phase = SpinPhase::Idle;
            return Err(EngineError::InsufficientFunds {
                wager: total,
                balance,
            });
        }

        let initial = self
            .run_pipeline(player_id, &variant, wager.stake, total, balance, &mut state)
            .await?;

        let mut free_spins = Vec::new();
        if self.config.auto_chain_free_spins {
            while state.free_spins_remaining > 0 {
                // Chaining is cancellable: a closed session stops the chain
                // before the next spin is consumed.
                if !handle.is_live() {
                    info!(
                        player_id,
                        remaining = state.free_spins_remaining,
                        "session closed mid-chain; free spins abandoned"
                    );
                    break;
                }
                state.free_spins_remaining -= 1;
                let stake = state.free_spin_stake;
                let balance = self.balances.balance(player_id).await?;
                let outcome = self
                    .run_pipeline(player_id, &variant, stake, 0, balance, &mut state)
                    .await?;
                free_spins.push(outcome);
            }
        }

        Ok(SpinSequence {
            initial,
            free_spins,
        })
    }

    /// Consume exactly one queued free spin, if any. Returns `Ok(None)`
    /// when the counter is at zero.
    pub async fn consume_free_spin(
        &self,
        player_id: &str,
        variant_id: &str,
    ) -> EngineResult<Option<SpinOutcome>> {
        let variant = self.variant(variant_id)?;
        let handle = self.sessions.session(player_id);
        if !handle.is_live() {
            return Err(EngineError::SessionClosed(player_id.to_string()));
        }

        let mut state = handle.state.lock().await;
        if state.free_spins_remaining == 0 {
            return Ok(None);
        }
        state.free_spins_remaining -= 1;
        let stake = state.free_spin_stake;
        let balance = self.balances.balance(player_id).await?;
        let outcome = self
            .run_pipeline(player_id, &variant, stake, 0, balance, &mut state)
            .await?;
        Ok(Some(outcome))
    }

    fn variant(&self, variant_id: &str) -> EngineResult<Arc<GameVariant>> {
        self.registry
            .get(variant_id)
            .ok_or_else(|| EngineError::UnknownVariant(variant_id.to_string()))
    }

    /// Generate, evaluate, resolve and persist one spin. The settlement is
    /// computed fully in memory and committed as one unit: the ledger
    /// append first, then the single net balance delta. A failure leaves
    /// the balance untouched and surfaces as a failed spin.
    async fn run_pipeline(
        &self,
        player_id: &str,
        variant: &Arc<GameVariant>,
        stake: Amount,
        wager_total: Amount,
        balance: Amount,
        state: &mut SessionState,
    ) -> EngineResult<SpinOutcome> {
        state.phase = SpinPhase::Generating;
        let (grid, evaluation, resolution) = {
            let mut rng = self.rng.lock().await;
            let grid = generator::generate_grid(rng.as_mut(), variant);

            // The grid is evaluated exactly once; everything downstream
            // works from this evaluation.
            state.phase = SpinPhase::Evaluating;
            let evaluation = evaluator::evaluate(&grid, Wager::new(stake), variant);

            state.phase = SpinPhase::Resolving;
            let resolution = resolver::resolve(
                rng.as_mut(),
                variant,
                &evaluation,
                stake,
                wager_total,
                balance,
                state,
            );
            (grid, evaluation, resolution)
        };
        let settlement = resolution.settlement;

        let record = SpinRecord {
            record_id: Uuid::new_v4().to_string(),
            player_id: player_id.to_string(),
            variant_id: variant.id.clone(),
            wager_amount: wager_total,
            win_amount: settlement.win_amount,
            grid: grid.clone(),
            winning_lines: evaluation.winning_lines.clone(),
            bonus_triggered: evaluation.bonus_triggered,
            free_spins_awarded: evaluation.free_spins_awarded,
            jackpot_tier: evaluation.jackpot_tier,
            free_spin: wager_total == 0,
            timestamp: unix_now(),
        };

        self.persist(player_id, &record, wager_total, settlement.win_amount)
            .await?;
        state.phase = SpinPhase::Settled;

        self.stats
            .record_spin(wager_total, settlement.win_amount, wager_total == 0);
        if evaluation.bonus_triggered {
            self.stats.record_bonus();
        }
        if evaluation.jackpot_tier.is_some() {
            self.stats.record_jackpot();
        }

        self.emit_events(player_id, &evaluation, resolution.bonus_win, settlement.win_amount)
            .await;

        debug!(
            player_id,
            variant = %variant.id,
            wager = wager_total,
            win = settlement.win_amount,
            "spin settled"
        );

        state.phase = SpinPhase::Idle;
        Ok(SpinOutcome {
            record_id: record.record_id,
            grid,
            evaluation,
            settlement,
        })
    }

    /// Commit one settlement. Each step retries independently so a ledger
    /// hiccup never duplicates a balance delta.
    async fn persist(
        &self,
        player_id: &str,
        record: &SpinRecord,
        wager_total: Amount,
        win: Amount,
    ) -> EngineResult<()> {
        let mut attempts = 0;
        loop {
            match self.ledger.record_spin(record).await {
                Ok(_) => break,
                Err(err) if attempts < self.config.persistence_retries => {
                    attempts += 1;
                    warn!(player_id, %err, attempts, "ledger write failed; retrying");
                }
                Err(err) => return Err(err),
            }
        }

        let delta = win as i64 - wager_total as i64;
        let mut attempts = 0;
        let applied = loop {
            match self.balances.apply_delta(player_id, delta).await {
                Ok(applied) => break applied,
                Err(err) if attempts < self.config.persistence_retries => {
                    attempts += 1;
                    warn!(player_id, %err, attempts, "balance write failed; retrying");
                }
                Err(err) => return Err(err),
            }
        };
        debug!(player_id, delta, applied, "balance committed");
        Ok(())
    }

    async fn emit_events(
        &self,
        player_id: &str,
        evaluation: &WinEvaluation,
        bonus_win: Amount,
        total_win: Amount,
    ) {
        if total_win > 0 {
            self.notifier
                .notify(SpinEvent::Win {
                    player_id: player_id.to_string(),
                    amount: total_win,
                })
                .await;
        }
        if evaluation.bonus_triggered {
            self.notifier
                .notify(SpinEvent::BonusTriggered {
                    player_id: player_id.to_string(),
                    bonus_win,
                })
                .await;
        }
        if evaluation.free_spins_awarded > 0 {
            self.notifier
                .notify(SpinEvent::FreeSpinsGranted {
                    player_id: player_id.to_string(),
                    count: evaluation.free_spins_awarded,
                })
                .await;
        }
        if let Some(tier) = evaluation.jackpot_tier {
            self.notifier
                .notify(SpinEvent::JackpotWon {
                    player_id: player_id.to_string(),
                    tier,
                })
                .await;
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VariantRegistry;
    use crate::errors::PersistenceError;
    use crate::rng::{ScriptedRng, SeededRng};
    use crate::stores::{InMemoryBalanceStore, InMemoryLedger, NullNotifier};
    use async_trait::async_trait;

    fn orchestrator_with(
        balances: Arc<InMemoryBalanceStore>,
        ledger: Arc<dyn SessionLedger>,
        rng: Box<dyn RngSource>,
    ) -> SpinOrchestrator {
        let registry = Arc::new(VariantRegistry::with_builtins().unwrap());
        SpinOrchestrator::new(registry, balances, ledger, Arc::new(NullNotifier), rng)
    }

    #[tokio::test]
    async fn test_insufficient_funds_rejected_before_generation() {
        let balances = Arc::new(InMemoryBalanceStore::with_balance("alice", 100));
        let ledger = Arc::new(InMemoryLedger::new());
        let orchestrator =
            orchestrator_with(balances.clone(), ledger.clone(), Box::new(SeededRng::new(1)));

        // enhanced has 5 paylines: stake 100 means a 500 total wager.
        let err = orchestrator
            .spin("alice", "enhanced", Wager::new(100))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientFunds { .. }));
        // Nothing was generated or persisted.
        assert_eq!(ledger.total_records(), 0);
        assert_eq!(balances.balance("alice").await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_zero_wager_rejected() {
        let balances = Arc::new(InMemoryBalanceStore::with_balance("alice", 1_000));
        let orchestrator = orchestrator_with(
            balances,
            Arc::new(InMemoryLedger::new()),
            Box::new(SeededRng::new(1)),
        );
        let err = orchestrator
            .spin("alice", "classic", Wager::new(0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidWager(_)));
    }

    #[tokio::test]
    async fn test_unknown_variant_rejected() {
        let balances = Arc::new(InMemoryBalanceStore::with_balance("alice", 1_000));
        let orchestrator = orchestrator_with(
            balances,
            Arc::new(InMemoryLedger::new()),
            Box::new(SeededRng::new(1)),
        );
        let err = orchestrator
            .spin("alice", "no-such-game", Wager::new(10))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownVariant(_)));
    }

    #[tokio::test]
    async fn test_closed_session_rejects_spins() {
        let balances = Arc::new(InMemoryBalanceStore::with_balance("alice", 1_000));
        let orchestrator = orchestrator_with(
            balances,
            Arc::new(InMemoryLedger::new()),
            Box::new(SeededRng::new(1)),
        );
        orchestrator.sessions().session("alice");
        orchestrator.sessions().close("alice");
        let err = orchestrator
            .spin("alice", "classic", Wager::new(10))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::SessionClosed(_)));
    }

    #[tokio::test]
    async fn test_settlement_matches_store_balance() {
        let balances = Arc::new(InMemoryBalanceStore::with_balance("alice", 100_000));
        let ledger = Arc::new(InMemoryLedger::new());
        let orchestrator =
            orchestrator_with(balances.clone(), ledger.clone(), Box::new(SeededRng::new(7)));

        let mut expected = 100_000u64;
        for _ in 0..50 {
            let sequence = orchestrator
                .spin("alice", "classic", Wager::new(10))
                .await
                .unwrap();
            for outcome in std::iter::once(&sequence.initial).chain(&sequence.free_spins) {
                let settlement = outcome.settlement;
                assert_eq!(
                    settlement.new_balance,
                    expected - settlement.wager_amount + settlement.win_amount
                );
                expected = settlement.new_balance;
            }
        }
        assert_eq!(balances.balance("alice").await.unwrap(), expected);
    }

    struct FailingLedger;

    #[async_trait]
    impl SessionLedger for FailingLedger {
        async fn record_spin(&self, _record: &SpinRecord) -> EngineResult<String> {
            Err(PersistenceError::LedgerWrite("disk full".to_string()).into())
        }

        async fn records_for(&self, _player_id: &str) -> EngineResult<Vec<SpinRecord>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_persistence_failure_leaves_balance_unchanged() {
        let balances = Arc::new(InMemoryBalanceStore::with_balance("alice", 1_000));
        let orchestrator = orchestrator_with(
            balances.clone(),
            Arc::new(FailingLedger),
            Box::new(SeededRng::new(1)),
        );
        let err = orchestrator
            .spin("alice", "classic", Wager::new(10))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Persistence(_)));
        assert_eq!(balances.balance("alice").await.unwrap(), 1_000);
    }

    #[tokio::test]
    async fn test_ledger_records_every_spin() {
        let balances = Arc::new(InMemoryBalanceStore::with_balance("alice", 100_000));
        let ledger = Arc::new(InMemoryLedger::new());
        let orchestrator =
            orchestrator_with(balances, ledger.clone(), Box::new(SeededRng::new(3)));

        let sequence = orchestrator
            .spin("alice", "golden_lion", Wager::new(100))
            .await
            .unwrap();
        let records = ledger.records_for("alice").await.unwrap();
        assert_eq!(records.len(), 1 + sequence.free_spins.len());
        assert_eq!(records[0].wager_amount, 100);
        for record in &records[1..] {
            assert!(record.free_spin);
            assert_eq!(record.wager_amount, 0);
        }
    }

    #[tokio::test]
    async fn test_tier_draw_at_jackpot_bound_goes_to_next_tier() {
        // First draw exactly at the jackpot bound (0.002 for single_line)
        // must not produce the all-top-symbol grid.
        let balances = Arc::new(InMemoryBalanceStore::with_balance("alice", 1_000));
        let ledger = Arc::new(InMemoryLedger::new());
        let orchestrator = orchestrator_with(
            balances,
            ledger.clone(),
            Box::new(ScriptedRng::new(vec![0.002, 0.5])),
        );
        let sequence = orchestrator
            .spin("alice", "single_line", Wager::new(10))
            .await
            .unwrap();
        let grid = &sequence.initial.grid;
        let all_top = (0..3).all(|reel| (0..3).all(|row| grid.at(reel, row).as_str() == "💎"));
        assert!(!all_top, "draw at the bound must fall through to major");
    }
}
