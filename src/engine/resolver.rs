//! Award resolution.
//!
//! Turns a [`WinEvaluation`] plus current session state into a
//! [`Settlement`]. Pure transformation apart from the bounded bonus-round
//! draw; the wager-side balance check happened in the orchestrator before
//! generation.

use crate::engine::types::{Amount, Settlement, WinEvaluation};
use crate::rng::RngSource;
use crate::session::SessionState;
use crate::variant::GameVariant;
use tracing::debug;

/// Outcome of resolving one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Resolution {
    pub settlement: Settlement,
    /// Bonus-round component of the win, zero when no bonus triggered.
    pub bonus_win: Amount,
}

/// Resolve an evaluation into a settlement.
///
/// `stake` is the scaling base for the bonus payout (the bet unit, not the
/// total wager); `wager_total` is the amount actually debited, which is
/// zero for a free spin. Bonus payout and jackpot label are additive when
/// both land on one spin; they are computed independently.
pub fn resolve(
    rng: &mut dyn RngSource,
    variant: &GameVariant,
    evaluation: &WinEvaluation,
    stake: Amount,
    wager_total: Amount,
    balance: Amount,
    session: &mut SessionState,
) -> Resolution {
    let mut win = evaluation.total_win;

    let mut bonus_win = 0;
    if evaluation.bonus_triggered {
        if let Some(range) = variant.bonus_range {
            bonus_win = draw_bonus(rng, stake, range.min_multiplier, range.max_multiplier);
            win = win.saturating_add(bonus_win);
            session.bonus_active = true;
            debug!(variant = %variant.id, bonus_win, "bonus round resolved");
        }
    }

    if evaluation.free_spins_awarded > 0 {
        session.free_spins_remaining += evaluation.free_spins_awarded;
        if stake > 0 {
            // Free spins replay the stake that won them.
            session.free_spin_stake = stake;
        }
    }

    // wager_total <= balance was validated before generation, so the
    // debit cannot underflow.
    let new_balance = balance - wager_total + win;

    Resolution {
        settlement: Settlement {
            wager_amount: wager_total,
            win_amount: win,
            new_balance,
            free_spins_remaining: session.free_spins_remaining,
            bonus_active: evaluation.bonus_triggered,
        },
        bonus_win,
    }
}

/// Uniform draw from `[stake * min, stake * max)`, rounded down to whole
/// cents.
fn draw_bonus(rng: &mut dyn RngSource, stake: Amount, min: f64, max: f64) -> Amount {
    let floor = (stake as f64 * min).round() as Amount;
    let span = stake as f64 * (max - min);
    floor + (rng.next_uniform() * span).floor() as Amount
}
