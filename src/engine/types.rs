//! Value types flowing through the spin pipeline.

use crate::symbols::SymbolId;
use crate::variant::{EvaluationMode, GameVariant, JackpotTier};
use serde::{Deserialize, Serialize};

/// Monetary amount in integer cents. Keeping money integral makes the
/// balance invariant `new_balance = balance - wager + win` exact.
pub type Amount = u64;

/// Stake declared for one spin: bet per line in payline mode, total stake
/// in ways mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wager {
    pub stake: Amount,
}

impl Wager {
    pub fn new(stake: Amount) -> Self {
        Self { stake }
    }

    /// Total amount debited for this wager under the given variant.
    pub fn total_for(&self, variant: &GameVariant) -> Amount {
        match variant.evaluation_mode {
            EvaluationMode::Payline => self.stake * variant.paylines.len() as Amount,
            EvaluationMode::Ways => self.stake,
        }
    }
}

/// Immutable symbol grid for one spin, indexed `[reel][row]`. Produced
/// fresh by the generator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    reels: Vec<Vec<SymbolId>>,
}

impl Grid {
    /// Build from reel columns. Panics on a ragged matrix; the generator
    /// always produces rectangular grids and tests construct them directly.
    pub fn from_reels(reels: Vec<Vec<SymbolId>>) -> Self {
        if let Some(first) = reels.first() {
            let rows = first.len();
            assert!(
                reels.iter().all(|reel| reel.len() == rows),
                "all reels must have the same row count"
            );
        }
        Self { reels }
    }

    /// Convenience constructor from row-major string rows, for tests and
    /// crafted fixtures.
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        let row_count = rows.len();
        let reel_count = rows.first().map(|row| row.len()).unwrap_or(0);
        let mut reels = vec![Vec::with_capacity(row_count); reel_count];
        for row in rows {
            assert_eq!(row.len(), reel_count, "all rows must have the same length");
            for (reel, symbol) in row.iter().enumerate() {
                reels[reel].push(SymbolId::new(*symbol));
            }
        }
        Self { reels }
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    pub fn row_count(&self) -> usize {
        self.reels.first().map(|reel| reel.len()).unwrap_or(0)
    }

    pub fn at(&self, reel: usize, row: usize) -> &SymbolId {
        &self.reels[reel][row]
    }

    pub fn reel(&self, reel: usize) -> &[SymbolId] {
        &self.reels[reel]
    }

    /// Whether `symbol` appears anywhere in the given reel's column, the
    /// ways-mode run-extension test.
    pub fn reel_contains(&self, reel: usize, symbol: &SymbolId) -> bool {
        self.reels[reel].iter().any(|s| s == symbol)
    }
}

/// One winning line or run, kept for UI highlighting; not used in any
/// further math.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WinningLine {
    /// Index into the variant's payline list.
    Payline {
        index: usize,
        symbol: SymbolId,
        consolation: bool,
    },
    /// Ways run headed at (reel, row).
    Run {
        reel: usize,
        row: usize,
        symbol: SymbolId,
        length: usize,
    },
}

/// Deterministic result of evaluating one grid against one wager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinEvaluation {
    pub total_win: Amount,
    pub winning_lines: Vec<WinningLine>,
    pub bonus_triggered: bool,
    pub free_spins_awarded: u32,
    pub jackpot_tier: Option<JackpotTier>,
}

impl WinEvaluation {
    pub fn no_win() -> Self {
        Self {
            total_win: 0,
            winning_lines: Vec::new(),
            bonus_triggered: false,
            free_spins_awarded: 0,
            jackpot_tier: None,
        }
    }
}

/// The settled outcome of one spin: the unit of record handed to the
/// ledger. Immutable once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub wager_amount: Amount,
    pub win_amount: Amount,
    pub new_balance: Amount,
    pub free_spins_remaining: u32,
    pub bonus_active: bool,
}

/// Append-only ledger record for one spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinRecord {
    pub record_id: String,
    pub player_id: String,
    pub variant_id: String,
    pub wager_amount: Amount,
    pub win_amount: Amount,
    pub grid: Grid,
    pub winning_lines: Vec<WinningLine>,
    pub bonus_triggered: bool,
    pub free_spins_awarded: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jackpot_tier: Option<JackpotTier>,
    /// True when this spin consumed a granted free spin.
    pub free_spin: bool,
    /// Unix timestamp, seconds.
    pub timestamp: u64,
}

/// Everything a caller gets back for one executed spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub record_id: String,
    pub grid: Grid,
    pub evaluation: WinEvaluation,
    pub settlement: Settlement,
}

/// A paid spin plus any free spins the orchestrator chained onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinSequence {
    pub initial: SpinOutcome,
    pub free_spins: Vec<SpinOutcome>,
}

/// User-facing events pushed to the notification sink. Fire-and-forget,
/// not part of financial correctness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SpinEvent {
    Win {
        player_id: String,
        amount: Amount,
    },
    BonusTriggered {
        player_id: String,
        bonus_win: Amount,
    },
    FreeSpinsGranted {
        player_id: String,
        count: u32,
    },
    JackpotWon {
        player_id: String,
        tier: JackpotTier,
    },
}

/// Phases of the per-spin state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinPhase {
    Idle,
    WagerValidated,
    Generating,
    Evaluating,
    Resolving,
    Settled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_from_rows_transposes() {
        let grid = Grid::from_rows(&[
            &["A", "B", "C"],
            &["D", "E", "F"],
        ]);
        assert_eq!(grid.reel_count(), 3);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.at(0, 0).as_str(), "A");
        assert_eq!(grid.at(0, 1).as_str(), "D");
        assert_eq!(grid.at(2, 0).as_str(), "C");
    }

    #[test]
    fn test_reel_contains_scans_whole_column() {
        let grid = Grid::from_rows(&[
            &["A", "B"],
            &["C", "A"],
        ]);
        assert!(grid.reel_contains(0, &"C".into()));
        assert!(grid.reel_contains(1, &"A".into()));
        assert!(!grid.reel_contains(0, &"B".into()));
    }

    #[test]
    fn test_wager_total_per_mode() {
        let payline = GameVariant::enhanced();
        let ways = GameVariant::golden_lion();
        let wager = Wager::new(100);
        assert_eq!(wager.total_for(&payline), 500);
        assert_eq!(wager.total_for(&ways), 100);
    }
}
