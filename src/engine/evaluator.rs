//! Win evaluation.
//!
//! Pure and deterministic: for a fixed (grid, wager, variant) the output is
//! identical on every call. This is the financial correctness boundary, so
//! nothing in here touches randomness, time or I/O.

use crate::engine::types::{Amount, Grid, Wager, WinEvaluation, WinningLine};
use crate::symbols::SymbolId;
use crate::variant::{EvaluationMode, FreeSpinAward, GameVariant, JackpotTier};

/// Evaluate one grid against one wager under the given variant.
pub fn evaluate(grid: &Grid, wager: Wager, variant: &GameVariant) -> WinEvaluation {
    match variant.evaluation_mode {
        EvaluationMode::Payline => evaluate_paylines(grid, wager, variant),
        EvaluationMode::Ways => evaluate_ways(grid, wager, variant),
    }
}

/// Round a stake-scaled multiplier to whole cents.
fn scale(stake: Amount, multiplier: f64) -> Amount {
    (stake as f64 * multiplier).round() as Amount
}

fn evaluate_paylines(grid: &Grid, wager: Wager, variant: &GameVariant) -> WinEvaluation {
    let mut evaluation = WinEvaluation::no_win();

    for (index, line) in variant.paylines.iter().enumerate() {
        let symbols: Vec<&SymbolId> = line
            .cells
            .iter()
            .map(|&(reel, row)| grid.at(reel, row))
            .collect();
        let first = symbols[0];

        if symbols.iter().all(|symbol| *symbol == first) {
            let length = symbols.len();
            if let Some(multiplier) = variant.paytable.multiplier(first, length) {
                evaluation.total_win += scale(wager.stake, multiplier);
                evaluation.winning_lines.push(WinningLine::Payline {
                    index,
                    symbol: first.clone(),
                    consolation: false,
                });
            }
            apply_triggers(&mut evaluation, variant, first, length);
        } else if let Some(consolation) = variant.consolation_multiplier {
            // Two of the first three consecutive cells matching earns the
            // fixed consolation pay.
            if let Some(pair) = leading_pair(&symbols) {
                evaluation.total_win += scale(wager.stake, consolation);
                evaluation.winning_lines.push(WinningLine::Payline {
                    index,
                    symbol: pair.clone(),
                    consolation: true,
                });
            }
        }
    }

    evaluation
}

/// The matching symbol of an adjacent pair among the first three cells of
/// a line, if any.
fn leading_pair<'a>(symbols: &[&'a SymbolId]) -> Option<&'a SymbolId> {
    if symbols.len() >= 2 && symbols[0] == symbols[1] {
        return Some(symbols[0]);
    }
    if symbols.len() >= 3 && symbols[1] == symbols[2] {
        return Some(symbols[1]);
    }
    None
}

fn evaluate_ways(grid: &Grid, wager: Wager, variant: &GameVariant) -> WinEvaluation {
    let mut evaluation = WinEvaluation::no_win();

    for reel in 0..grid.reel_count() {
        for row in 0..grid.row_count() {
            let symbol = grid.at(reel, row);
            let mut length = 1;
            for next in reel + 1..grid.reel_count() {
                if grid.reel_contains(next, symbol) {
                    length += 1;
                } else {
                    break;
                }
            }

            if length < variant.min_run_length {
                continue;
            }
            if let Some(multiplier) = variant.paytable.multiplier(symbol, length) {
                evaluation.total_win += scale(wager.stake, multiplier);
                evaluation.winning_lines.push(WinningLine::Run {
                    reel,
                    row,
                    symbol: symbol.clone(),
                    length,
                });
            }
            apply_triggers(&mut evaluation, variant, symbol, length);
        }
    }

    evaluation
}

/// Accumulate bonus / free-spin / jackpot awards for one qualifying line
/// or run.
fn apply_triggers(
    evaluation: &mut WinEvaluation,
    variant: &GameVariant,
    symbol: &SymbolId,
    length: usize,
) {
    for rule in &variant.free_spin_rules {
        if &rule.symbol == symbol && length >= rule.min_run {
            evaluation.free_spins_awarded += match rule.award {
                FreeSpinAward::Fixed(spins) => spins,
                FreeSpinAward::RunLength => length as u32,
            };
        }
    }
    for rule in &variant.bonus_rules {
        if &rule.symbol == symbol && length >= rule.min_run {
            evaluation.bonus_triggered = true;
        }
    }
    if length == variant.reels {
        if let Some(&tier) = variant.jackpot_runs.get(symbol) {
            evaluation.jackpot_tier = Some(best_tier(evaluation.jackpot_tier, tier));
        }
    }
}

fn best_tier(current: Option<JackpotTier>, candidate: JackpotTier) -> JackpotTier {
    match current {
        Some(tier) if tier > candidate => tier,
        _ => candidate,
    }
}
