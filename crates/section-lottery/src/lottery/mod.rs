//! Two-section registration lottery.
//!
//! [`run_lottery`] strings the pieces together: cohort filter, seeded draw order, then the
//! [`AssignmentEngine`]. Each piece is public so callers can replay a recorded draw order or
//! drive the engine directly.

pub mod domain;
mod draw;
mod eligibility;
mod engine;
mod outcome;

#[cfg(test)]
mod tests;

pub use domain::{ApplicantRecord, Availability, Section};
pub use draw::{DrawSequence, DrawSequencer};
pub use eligibility::{filter_eligible, CohortSelector};
pub use engine::{
    AssignmentEngine, LotteryError, RunSnapshot, SectionCondition, SectionCounts, SectionState,
};
pub use outcome::{
    AvailabilityAnomaly, LotteryEvent, LotteryOutcome, OutcomeSummary, Phase, TerminalState,
};

use crate::config::LotteryConfig;
use tracing::info;

/// Filters `pool` to the configured cohort, shuffles it, and runs the assignment engine.
pub fn run_lottery(
    config: &LotteryConfig,
    pool: Vec<ApplicantRecord>,
) -> Result<LotteryOutcome, LotteryError> {
    let submitted = pool.len();
    let eligible = filter_eligible(pool, config.cohort());
    info!(
        cohort = config.cohort().label(),
        submitted,
        eligible = eligible.len(),
        "eligible pool selected"
    );

    let sequence = DrawSequencer::new(config.seed()).sequence(eligible);
    AssignmentEngine::new(config).run(sequence)
}
