//! Game variant definitions.
//!
//! A [`GameVariant`] bundles everything that distinguishes one slot game
//! from another: symbol set, grid dimensions, evaluation mode, payout
//! tables, trigger rules and the tier-generation table. Variants are
//! immutable once loaded and read-only to the engine; RTP tuning is a
//! configuration change, not a code change.

use crate::errors::ConfigError;
use crate::symbols::{SymbolId, SymbolTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a grid is scanned for wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    /// Fixed paylines, one configured cell per reel.
    Payline,
    /// Consecutive-matching-symbol runs from the leftmost reel, matching
    /// anywhere in each subsequent reel's column.
    Ways,
}

/// One payline: an ordered list of (reel, row) cells, exactly one per reel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    pub cells: Vec<(usize, usize)>,
}

impl Payline {
    pub fn new(cells: Vec<(usize, usize)>) -> Self {
        Self { cells }
    }

    /// A horizontal line across the given row.
    pub fn row(row: usize, reels: usize) -> Self {
        Self::new((0..reels).map(|reel| (reel, row)).collect())
    }
}

/// Payout multipliers for one symbol as (run length, multiplier) pairs.
/// Payline variants consult only the full line length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayEntry {
    pub symbol: SymbolId,
    pub multipliers: Vec<(usize, f64)>,
}

impl PayEntry {
    pub fn new(symbol: impl Into<SymbolId>, multipliers: &[(usize, f64)]) -> Self {
        Self {
            symbol: symbol.into(),
            multipliers: multipliers.to_vec(),
        }
    }
}

/// The 2-D (symbol x run length) payout table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayTable {
    entries: Vec<PayEntry>,
}

impl PayTable {
    pub fn new(entries: Vec<PayEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PayEntry] {
        &self.entries
    }

    pub fn multiplier(&self, symbol: &SymbolId, run_length: usize) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| &entry.symbol == symbol)
            .and_then(|entry| {
                entry
                    .multipliers
                    .iter()
                    .find(|(length, _)| *length == run_length)
                    .map(|(_, multiplier)| *multiplier)
            })
    }
}

/// How many free spins a qualifying line or run grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "spins", rename_all = "lowercase")]
pub enum FreeSpinAward {
    /// A fixed number of spins per qualifying line.
    Fixed(u32),
    /// The run length itself (ways variants).
    RunLength,
}

/// Free-spin trigger: a symbol that grants spins when it wins with at
/// least `min_run` matching reels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeSpinRule {
    pub symbol: SymbolId,
    pub min_run: usize,
    pub award: FreeSpinAward,
}

/// Bonus-round trigger: a symbol that starts the bonus round when it wins
/// with at least `min_run` matching reels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusRule {
    pub symbol: SymbolId,
    pub min_run: usize,
}

/// Bounded secondary payout range for the bonus round, as multiples of the
/// stake. The payout is drawn uniformly from `[min_multiplier, max_multiplier)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BonusRange {
    pub min_multiplier: f64,
    pub max_multiplier: f64,
}

/// Progressive jackpot ladder, ascending so `Ord` ranks `Grand` highest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum JackpotTier {
    Mini,
    Minor,
    Major,
    Grand,
}

impl std::fmt::Display for JackpotTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JackpotTier::Mini => write!(f, "mini"),
            JackpotTier::Minor => write!(f, "minor"),
            JackpotTier::Major => write!(f, "major"),
            JackpotTier::Grand => write!(f, "grand"),
        }
    }
}

/// Outcome tiers in fixed priority order. Generation selects exactly one
/// per spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeTier {
    /// Every cell forced to the top-value symbol.
    Jackpot,
    /// A favored high-value symbol forced across one full row.
    MajorWin,
    /// One line (or row prefix, in ways mode) forced to match.
    MediumWin,
    /// Fully independent uniform draw per cell.
    NoForcedWin,
}

impl OutcomeTier {
    /// Position in the fixed priority order.
    pub fn priority(self) -> usize {
        match self {
            OutcomeTier::Jackpot => 0,
            OutcomeTier::MajorWin => 1,
            OutcomeTier::MediumWin => 2,
            OutcomeTier::NoForcedWin => 3,
        }
    }
}

/// One row of the ordered tier table. `NoForcedWin` takes whatever
/// probability mass the listed tiers leave over, so it never appears here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierRule {
    pub tier: OutcomeTier,
    pub probability: f64,
}

impl TierRule {
    pub fn new(tier: OutcomeTier, probability: f64) -> Self {
        Self { tier, probability }
    }
}

/// Complete configuration for one slot game.
///
/// Scalar fields are declared ahead of table-valued fields so the variant
/// serializes cleanly to TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameVariant {
    pub id: String,
    pub name: String,
    pub reels: usize,
    pub rows: usize,
    pub evaluation_mode: EvaluationMode,
    /// Shortest run that pays (ways mode).
    pub min_run_length: usize,
    /// Payline-mode pair pay: applied when two of the first three cells on
    /// a line match but the line is not a full win.
    #[serde(default)]
    pub consolation_multiplier: Option<f64>,
    /// How many leading (highest-value) symbols the major-win tier may
    /// force. Weighted by the symbol table.
    pub favored_symbols: usize,
    /// Long-run expected `win / wager`, a property verified by simulation.
    pub rtp_target: f64,
    pub symbols: SymbolTable,
    /// Payline mode only; empty for ways variants.
    #[serde(default)]
    pub paylines: Vec<Payline>,
    pub paytable: PayTable,
    /// Ordered tier table; the remainder falls to `NoForcedWin`.
    pub tiers: Vec<TierRule>,
    #[serde(default)]
    pub free_spin_rules: Vec<FreeSpinRule>,
    #[serde(default)]
    pub bonus_rules: Vec<BonusRule>,
    #[serde(default)]
    pub bonus_range: Option<BonusRange>,
    /// Full-width runs of these symbols win the mapped jackpot tier.
    #[serde(default)]
    pub jackpot_runs: HashMap<SymbolId, JackpotTier>,
    /// Advertised jackpot amounts in cents, reporting only.
    #[serde(default)]
    pub jackpot_display: HashMap<JackpotTier, u64>,
}

impl GameVariant {
    pub fn cell_count(&self) -> usize {
        self.reels * self.rows
    }

    /// Validate the variant definition. Called by the registry on insert;
    /// a malformed variant never becomes visible to the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::MissingRequired("variant.id".to_string()));
        }
        if self.reels == 0 || self.rows == 0 {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.grid", self.id),
                value: format!("{}x{}", self.reels, self.rows),
                reason: "grid dimensions must be non-zero".to_string(),
            });
        }
        if self.symbols.is_empty() {
            return Err(ConfigError::MissingRequired(format!("{}.symbols", self.id)));
        }
        for def in self.symbols.defs() {
            if !(def.weight > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.symbols.{}", self.id, def.id),
                    value: def.weight.to_string(),
                    reason: "symbol weight must be positive".to_string(),
                });
            }
        }

        match self.evaluation_mode {
            EvaluationMode::Payline => self.validate_paylines()?,
            EvaluationMode::Ways => {
                if self.min_run_length < 2 || self.min_run_length > self.reels {
                    return Err(ConfigError::InvalidValue {
                        field: format!("{}.min_run_length", self.id),
                        value: self.min_run_length.to_string(),
                        reason: format!("must be within 2..={}", self.reels),
                    });
                }
                if self.consolation_multiplier.is_some() {
                    return Err(ConfigError::InvalidValue {
                        field: format!("{}.consolation_multiplier", self.id),
                        value: "set".to_string(),
                        reason: "consolation pay applies to payline variants only".to_string(),
                    });
                }
            }
        }

        self.validate_paytable()?;
        self.validate_triggers()?;
        self.validate_tiers()?;

        if self.favored_symbols == 0 || self.favored_symbols > self.symbols.len() {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.favored_symbols", self.id),
                value: self.favored_symbols.to_string(),
                reason: format!("must be within 1..={}", self.symbols.len()),
            });
        }
        if !(self.rtp_target > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.rtp_target", self.id),
                value: self.rtp_target.to_string(),
                reason: "RTP target must be positive".to_string(),
            });
        }

        Ok(())
    }

    fn validate_paylines(&self) -> Result<(), ConfigError> {
        if self.paylines.is_empty() {
            return Err(ConfigError::MissingRequired(format!(
                "{}.paylines",
                self.id
            )));
        }
        for (index, line) in self.paylines.iter().enumerate() {
            if line.cells.len() != self.reels {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.paylines[{}]", self.id, index),
                    value: line.cells.len().to_string(),
                    reason: format!("payline must name one cell per reel ({})", self.reels),
                });
            }
            for (position, &(reel, row)) in line.cells.iter().enumerate() {
                if reel != position || row >= self.rows {
                    return Err(ConfigError::InvalidValue {
                        field: format!("{}.paylines[{}]", self.id, index),
                        value: format!("({reel},{row})"),
                        reason: "payline references an out-of-range cell".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_paytable(&self) -> Result<(), ConfigError> {
        for entry in self.paytable.entries() {
            if !self.symbols.contains(&entry.symbol) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.paytable", self.id),
                    value: entry.symbol.to_string(),
                    reason: "paytable names a symbol outside the variant's set".to_string(),
                });
            }
            for &(length, multiplier) in &entry.multipliers {
                if length < 2 || length > self.reels || !(multiplier > 0.0) {
                    return Err(ConfigError::InvalidValue {
                        field: format!("{}.paytable.{}", self.id, entry.symbol),
                        value: format!("{length} -> {multiplier}"),
                        reason: "run length out of range or non-positive multiplier".to_string(),
                    });
                }
            }
        }
        for symbol in self.jackpot_runs.keys() {
            if !self.symbols.contains(symbol) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.jackpot_runs", self.id),
                    value: symbol.to_string(),
                    reason: "jackpot map names a symbol outside the variant's set".to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate_triggers(&self) -> Result<(), ConfigError> {
        for rule in &self.free_spin_rules {
            if !self.symbols.contains(&rule.symbol) || rule.min_run < 2 || rule.min_run > self.reels
            {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.free_spin_rules", self.id),
                    value: format!("{} at {}", rule.symbol, rule.min_run),
                    reason: "unknown symbol or run requirement out of range".to_string(),
                });
            }
        }
        for rule in &self.bonus_rules {
            if !self.symbols.contains(&rule.symbol) || rule.min_run < 2 || rule.min_run > self.reels
            {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.bonus_rules", self.id),
                    value: format!("{} at {}", rule.symbol, rule.min_run),
                    reason: "unknown symbol or run requirement out of range".to_string(),
                });
            }
        }
        if !self.bonus_rules.is_empty() {
            match self.bonus_range {
                Some(range) if range.min_multiplier >= 0.0 && range.max_multiplier > range.min_multiplier => {}
                Some(range) => {
                    return Err(ConfigError::InvalidValue {
                        field: format!("{}.bonus_range", self.id),
                        value: format!("[{}, {})", range.min_multiplier, range.max_multiplier),
                        reason: "bonus range must be non-negative and non-empty".to_string(),
                    });
                }
                None => {
                    return Err(ConfigError::MissingRequired(format!(
                        "{}.bonus_range",
                        self.id
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_tiers(&self) -> Result<(), ConfigError> {
        let mut sum = 0.0;
        let mut last_priority: Option<usize> = None;
        for rule in &self.tiers {
            if rule.tier == OutcomeTier::NoForcedWin {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.tiers", self.id),
                    value: "noforcedwin".to_string(),
                    reason: "the fallback tier takes the remaining probability implicitly"
                        .to_string(),
                });
            }
            if !(rule.probability >= 0.0 && rule.probability <= 1.0) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.tiers", self.id),
                    value: rule.probability.to_string(),
                    reason: "tier probability must lie in [0, 1]".to_string(),
                });
            }
            let priority = rule.tier.priority();
            if let Some(last) = last_priority {
                if priority <= last {
                    return Err(ConfigError::InvalidValue {
                        field: format!("{}.tiers", self.id),
                        value: format!("{:?}", rule.tier),
                        reason: "tiers must be listed once each, in priority order".to_string(),
                    });
                }
            }
            last_priority = Some(priority);
            sum += rule.probability;
        }
        if sum > 1.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "{}: tier probabilities sum to {sum}, which exceeds 1",
                self.id
            )));
        }
        Ok(())
    }
}

// --- Built-in variants ----------------------------------------------------
//
// These mirror the three production games: a classic 3x3 fruit machine, a
// five-payline machine with bonus features, and the 5x5 ways flagship.

impl GameVariant {
    /// Classic 3x3 machine: three row paylines, flat three-of-a-kind pays,
    /// pair consolation. No bonus features.
    pub fn classic() -> Self {
        let symbols = SymbolTable::from_ranked_ids(&["💎", "7️⃣", "⭐", "🍇", "🍊", "🍋", "🍒"]);
        let paytable = PayTable::new(vec![
            PayEntry::new("💎", &[(3, 50.0)]),
            PayEntry::new("7️⃣", &[(3, 25.0)]),
            PayEntry::new("⭐", &[(3, 15.0)]),
            PayEntry::new("🍇", &[(3, 5.0)]),
            PayEntry::new("🍊", &[(3, 5.0)]),
            PayEntry::new("🍋", &[(3, 5.0)]),
            PayEntry::new("🍒", &[(3, 5.0)]),
        ]);
        Self {
            id: "classic".to_string(),
            name: "Classic Slots".to_string(),
            reels: 3,
            rows: 3,
            evaluation_mode: EvaluationMode::Payline,
            symbols,
            paylines: vec![
                Payline::row(0, 3),
                Payline::row(1, 3),
                Payline::row(2, 3),
            ],
            paytable,
            min_run_length: 3,
            consolation_multiplier: Some(2.0),
            free_spin_rules: vec![],
            bonus_rules: vec![],
            bonus_range: None,
            jackpot_runs: HashMap::new(),
            jackpot_display: HashMap::new(),
            tiers: vec![
                TierRule::new(OutcomeTier::Jackpot, 0.002),
                TierRule::new(OutcomeTier::MajorWin, 0.098),
                TierRule::new(OutcomeTier::MediumWin, 0.20),
            ],
            favored_symbols: 3,
            rtp_target: 0.90,
        }
    }

    /// Five-payline 3x3 machine with bonus round, free spins and a
    /// three-sevens jackpot.
    pub fn enhanced() -> Self {
        let symbols = SymbolTable::from_ranked_ids(&[
            "7️⃣", "💎", "👑", "💰", "BAR", "⭐", "🔔", "🍒", "🍇", "🍊",
        ]);
        let paytable = PayTable::new(vec![
            PayEntry::new("7️⃣", &[(3, 100.0)]),
            PayEntry::new("💎", &[(3, 50.0)]),
            PayEntry::new("👑", &[(3, 30.0)]),
            PayEntry::new("💰", &[(3, 25.0)]),
            PayEntry::new("BAR", &[(3, 20.0)]),
            PayEntry::new("⭐", &[(3, 15.0)]),
            PayEntry::new("🔔", &[(3, 10.0)]),
            PayEntry::new("🍒", &[(3, 8.0)]),
            PayEntry::new("🍇", &[(3, 6.0)]),
            PayEntry::new("🍊", &[(3, 4.0)]),
        ]);
        Self {
            id: "enhanced".to_string(),
            name: "Enhanced Slots".to_string(),
            reels: 3,
            rows: 3,
            evaluation_mode: EvaluationMode::Payline,
            symbols,
            paylines: vec![
                Payline::row(0, 3),
                Payline::row(1, 3),
                Payline::row(2, 3),
                // Diagonals.
                Payline::new(vec![(0, 0), (1, 1), (2, 2)]),
                Payline::new(vec![(0, 2), (1, 1), (2, 0)]),
            ],
            paytable,
            min_run_length: 3,
            consolation_multiplier: Some(1.5),
            free_spin_rules: vec![FreeSpinRule {
                symbol: "⭐".into(),
                min_run: 3,
                award: FreeSpinAward::Fixed(3),
            }],
            bonus_rules: vec![BonusRule {
                symbol: "💰".into(),
                min_run: 3,
            }],
            bonus_range: Some(BonusRange {
                min_multiplier: 5.0,
                max_multiplier: 15.0,
            }),
            jackpot_runs: HashMap::from([("7️⃣".into(), JackpotTier::Grand)]),
            jackpot_display: HashMap::from([(JackpotTier::Grand, 200_000)]),
            tiers: vec![
                TierRule::new(OutcomeTier::Jackpot, 0.05),
                TierRule::new(OutcomeTier::MajorWin, 0.08),
                TierRule::new(OutcomeTier::MediumWin, 0.25),
            ],
            favored_symbols: 5,
            rtp_target: 0.94,
        }
    }

    /// 5x5 ways flagship: runs extend through any row of the next reel,
    /// length-scaled paytable, four-tier jackpot ladder.
    pub fn golden_lion() -> Self {
        let symbols = SymbolTable::from_ranked_ids(&[
            "🦁", "👑", "💎", "🔔", "⚡", "🌟", "A", "K", "Q", "J", "10", "9",
        ]);
        let paytable = PayTable::new(vec![
            PayEntry::new("🦁", &[(3, 25.0), (4, 100.0), (5, 500.0)]),
            PayEntry::new("👑", &[(3, 15.0), (4, 50.0), (5, 250.0)]),
            PayEntry::new("💎", &[(3, 10.0), (4, 30.0), (5, 150.0)]),
            PayEntry::new("🔔", &[(3, 8.0), (4, 20.0), (5, 100.0)]),
            PayEntry::new("⚡", &[(3, 6.0), (4, 15.0), (5, 75.0)]),
            PayEntry::new("🌟", &[(3, 5.0), (4, 12.0), (5, 50.0)]),
            PayEntry::new("A", &[(3, 4.0), (4, 10.0), (5, 40.0)]),
            PayEntry::new("K", &[(3, 3.0), (4, 8.0), (5, 30.0)]),
            PayEntry::new("Q", &[(3, 2.5), (4, 6.0), (5, 25.0)]),
            PayEntry::new("J", &[(3, 2.0), (4, 5.0), (5, 20.0)]),
            PayEntry::new("10", &[(3, 1.5), (4, 4.0), (5, 15.0)]),
            PayEntry::new("9", &[(3, 1.5), (4, 4.0), (5, 15.0)]),
        ]);
        Self {
            id: "golden_lion".to_string(),
            name: "Great Golden Lion".to_string(),
            reels: 5,
            rows: 5,
            evaluation_mode: EvaluationMode::Ways,
            symbols,
            paylines: vec![],
            paytable,
            min_run_length: 3,
            consolation_multiplier: None,
            free_spin_rules: vec![FreeSpinRule {
                symbol: "🌟".into(),
                min_run: 3,
                award: FreeSpinAward::RunLength,
            }],
            bonus_rules: vec![BonusRule {
                symbol: "⚡".into(),
                min_run: 4,
            }],
            bonus_range: Some(BonusRange {
                min_multiplier: 10.0,
                max_multiplier: 25.0,
            }),
            jackpot_runs: HashMap::from([
                ("🦁".into(), JackpotTier::Grand),
                ("👑".into(), JackpotTier::Major),
                ("💎".into(), JackpotTier::Minor),
                ("🔔".into(), JackpotTier::Mini),
            ]),
            jackpot_display: HashMap::from([
                (JackpotTier::Grand, 200_000),
                (JackpotTier::Major, 40_000),
                (JackpotTier::Minor, 9_920),
                (JackpotTier::Mini, 4_000),
            ]),
            tiers: vec![
                TierRule::new(OutcomeTier::Jackpot, 0.03),
                TierRule::new(OutcomeTier::MajorWin, 0.10),
            ],
            favored_symbols: 6,
            rtp_target: 0.96,
        }
    }

    /// Single-payline variant whose tier table and paytable are calibrated
    /// analytically so the expected return equals `rtp_target`:
    /// base EV = (14+9+6+3)/64 = 0.5, medium EV = 8, so
    /// 0.002*14 + 0.03*0.5 + 0.05*8 + 0.918*0.5 = 0.902.
    pub fn single_line() -> Self {
        let symbols = SymbolTable::from_ranked_ids(&["💎", "🔔", "🍇", "🍒"]);
        let paytable = PayTable::new(vec![
            PayEntry::new("💎", &[(3, 14.0)]),
            PayEntry::new("🔔", &[(3, 9.0)]),
            PayEntry::new("🍇", &[(3, 6.0)]),
            PayEntry::new("🍒", &[(3, 3.0)]),
        ]);
        Self {
            id: "single_line".to_string(),
            name: "Single Line".to_string(),
            reels: 3,
            rows: 3,
            evaluation_mode: EvaluationMode::Payline,
            symbols,
            paylines: vec![Payline::row(1, 3)],
            paytable,
            min_run_length: 3,
            consolation_multiplier: None,
            free_spin_rules: vec![],
            bonus_rules: vec![],
            bonus_range: None,
            jackpot_runs: HashMap::new(),
            jackpot_display: HashMap::new(),
            tiers: vec![
                TierRule::new(OutcomeTier::Jackpot, 0.002),
                TierRule::new(OutcomeTier::MajorWin, 0.03),
                TierRule::new(OutcomeTier::MediumWin, 0.05),
            ],
            favored_symbols: 2,
            rtp_target: 0.902,
        }
    }

    /// All built-in variants.
    pub fn builtins() -> Vec<Self> {
        vec![
            Self::classic(),
            Self::enhanced(),
            Self::golden_lion(),
            Self::single_line(),
        ]
    }
}
