//! Batch spin simulator.
//!
//! Runs a fixed-stake session against the in-memory stores and reports
//! win rate, house edge and measured vs configured RTP. Useful for tuning
//! a variant's tier table without touching code.

use clap::Parser;
use reelcore::{
    BalanceStore, ConfigLoader, EntropyRng, InMemoryBalanceStore, InMemoryLedger, NullNotifier,
    RngSource, SeededRng, SpinOrchestrator, Wager,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "simulate", about = "Batch slot spin simulator")]
struct Args {
    /// Variant id to spin.
    #[arg(long, default_value = "golden_lion")]
    variant: String,

    /// Number of paid spins.
    #[arg(long, default_value_t = 10_000)]
    spins: u64,

    /// Stake per spin in cents (per line for payline variants).
    #[arg(long, default_value_t = 100)]
    stake: u64,

    /// Seed for a deterministic run; omit for OS entropy.
    #[arg(long)]
    seed: Option<u64>,

    /// Optional variant configuration file layered over the built-ins.
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let registry = Arc::new(loader.load()?);
    let variant = registry
        .get(&args.variant)
        .ok_or_else(|| format!("unknown variant: {}", args.variant))?;

    let player = "simulator";
    // Enough headroom that even a full losing streak cannot drain the
    // balance mid-run.
    let bankroll = args
        .spins
        .saturating_mul(args.stake)
        .saturating_mul(variant.paylines.len().max(1) as u64)
        .saturating_add(1_000_000);
    let balances = Arc::new(InMemoryBalanceStore::with_balance(player, bankroll));
    let ledger = Arc::new(InMemoryLedger::new());

    let rng: Box<dyn RngSource> = match args.seed {
        Some(seed) => Box::new(SeededRng::new(seed)),
        None => Box::new(EntropyRng::new()),
    };

    let orchestrator = SpinOrchestrator::new(
        registry.clone(),
        balances.clone(),
        ledger.clone(),
        Arc::new(NullNotifier),
        rng,
    );

    info!(variant = %args.variant, spins = args.spins, stake = args.stake, "starting run");

    let mut wins = 0u64;
    for _ in 0..args.spins {
        let sequence = orchestrator
            .spin(player, &args.variant, Wager::new(args.stake))
            .await?;
        if sequence.initial.settlement.win_amount > 0 {
            wins += 1;
        }
    }

    let stats = orchestrator.stats().snapshot();
    let final_balance = balances.balance(player).await?;

    println!("=== {} ({} paid spins) ===", variant.name, args.spins);
    println!(
        "spins:        {} total, {} free",
        stats.spin_count, stats.free_spin_count
    );
    println!(
        "win rate:     {:.2}%",
        wins as f64 / args.spins as f64 * 100.0
    );
    println!(
        "wagered:      {:.2}, paid out: {:.2}",
        stats.total_wagered as f64 / 100.0,
        stats.total_paid_out as f64 / 100.0
    );
    println!(
        "RTP:          {:.4} measured vs {:.4} configured",
        stats.measured_rtp(),
        variant.rtp_target
    );
    println!("house edge:   {:.2}%", stats.house_edge() * 100.0);
    println!(
        "bonus rounds: {}, jackpots: {}",
        stats.bonus_count, stats.jackpot_count
    );
    println!(
        "bankroll:     {:.2} -> {:.2}",
        bankroll as f64 / 100.0,
        final_balance as f64 / 100.0
    );

    Ok(())
}
