//! Reelcore - slot-game outcome engine.
//!
//! Produces randomized symbol grids shaped by a tiered outcome policy,
//! evaluates them against payline or ways-to-win payout models, resolves
//! secondary awards (bonus rounds, free spins, jackpot tiers) and
//! orchestrates settlement against pluggable balance/ledger boundaries,
//! all while honoring a configured long-run return-to-player target.

pub mod config;
pub mod engine;
pub mod errors;
pub mod rng;
pub mod session;
pub mod stats;
pub mod stores;
pub mod symbols;
pub mod traits;
pub mod variant;

pub use crate::config::{ConfigLoader, VariantRegistry};
pub use crate::engine::{
    evaluate, generate_grid, select_tier, Amount, Grid, OrchestratorConfig, Settlement, SpinEvent,
    SpinOrchestrator, SpinOutcome, SpinRecord, SpinSequence, Wager, WinEvaluation, WinningLine,
};
pub use crate::errors::{ConfigError, EngineError, EngineResult, PersistenceError};
pub use crate::rng::{EntropyRng, RngSource, ScriptedRng, SeededRng};
pub use crate::session::{SessionManager, SessionState};
pub use crate::stats::{RtpSnapshot, RtpTracker};
pub use crate::stores::{BroadcastNotifier, InMemoryBalanceStore, InMemoryLedger, NullNotifier};
pub use crate::symbols::{SymbolDef, SymbolId, SymbolTable};
pub use crate::traits::{BalanceStore, NotificationSink, SessionLedger};
pub use crate::variant::{
    BonusRange, BonusRule, EvaluationMode, FreeSpinAward, FreeSpinRule, GameVariant, JackpotTier,
    OutcomeTier, PayEntry, PayTable, Payline, TierRule,
};
