//! Long-run return-to-player simulation.
//!
//! The `single_line` variant is calibrated analytically (see its
//! constructor): expected return 0.902 of the wager. A seeded StdRng is a
//! real uniform generator, so a 200k-spin run must land within a tolerance
//! that is several standard deviations wide.

use reelcore::{evaluate, generate_grid, GameVariant, SeededRng, Wager};

#[test]
fn measured_rtp_matches_configured_target() {
    let variant = GameVariant::single_line();
    let mut rng = SeededRng::new(0x5EED_CAFE);

    let stake = 100u64;
    let spins = 200_000u64;

    let mut wagered = 0u64;
    let mut paid_out = 0u64;
    for _ in 0..spins {
        let grid = generate_grid(&mut rng, &variant);
        let evaluation = evaluate(&grid, Wager::new(stake), &variant);
        wagered += stake * variant.paylines.len() as u64;
        paid_out += evaluation.total_win;
    }

    let measured = paid_out as f64 / wagered as f64;
    let target = variant.rtp_target;
    assert!(
        (measured - target).abs() < 0.05,
        "measured RTP {measured:.4} strayed from target {target:.4}"
    );
}

#[test]
fn win_amount_is_never_negative_and_scales_with_stake() {
    let variant = GameVariant::single_line();
    let mut rng = SeededRng::new(7);
    for _ in 0..10_000 {
        let grid = generate_grid(&mut rng, &variant);
        let small = evaluate(&grid, Wager::new(10), &variant);
        let large = evaluate(&grid, Wager::new(100), &variant);
        // Integer-cent rounding aside, a tenfold stake pays tenfold.
        assert_eq!(small.total_win * 10, large.total_win);
    }
}
