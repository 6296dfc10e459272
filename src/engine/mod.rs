//! The spin pipeline: generation, evaluation, resolution, orchestration.

pub mod evaluator;
pub mod generator;
pub mod orchestrator;
pub mod resolver;
pub mod types;

pub use evaluator::evaluate;
pub use generator::{generate_grid, select_tier};
pub use orchestrator::{OrchestratorConfig, SpinOrchestrator};
pub use resolver::{resolve, Resolution};
pub use types::{
    Amount, Grid, Settlement, SpinEvent, SpinOutcome, SpinPhase, SpinRecord, SpinSequence, Wager,
    WinEvaluation, WinningLine,
};
