use crate::config::LotteryConfig;
use crate::lottery::{
    ApplicantRecord, AssignmentEngine, CohortSelector, DrawSequence, LotteryError,
    LotteryOutcome,
};

pub(super) fn slot_a(name: &str) -> ApplicantRecord {
    ApplicantRecord::new(name, "Applicant", true, false, false)
}

pub(super) fn slot_b(name: &str) -> ApplicantRecord {
    ApplicantRecord::new(name, "Applicant", false, true, false)
}

pub(super) fn both(name: &str) -> ApplicantRecord {
    ApplicantRecord::new(name, "Applicant", true, true, false)
}

pub(super) fn neither(name: &str) -> ApplicantRecord {
    ApplicantRecord::new(name, "Applicant", false, false, false)
}

pub(super) fn config(section_limit: usize, seed: u64) -> LotteryConfig {
    LotteryConfig::new(section_limit, CohortSelector::FirstTime, Some(seed))
        .expect("valid lottery config")
}

/// Runs the engine over an explicit draw order, bypassing the shuffle.
pub(super) fn run_in_order(
    section_limit: usize,
    order: Vec<ApplicantRecord>,
) -> Result<LotteryOutcome, LotteryError> {
    let engine = AssignmentEngine::new(&config(section_limit, 0));
    engine.run(DrawSequence::from_draw_order(0, order))
}

pub(super) fn names(records: &[ApplicantRecord]) -> Vec<&str> {
    records
        .iter()
        .map(|record| record.first_name.as_str())
        .collect()
}

/// Every input applicant lands in exactly one bucket or the anomaly list.
pub(super) fn assert_partition(outcome: &LotteryOutcome, input: &[ApplicantRecord]) {
    let mut seen: Vec<&str> = Vec::new();
    for bucket in [
        outcome.assigned_a(),
        outcome.assigned_b(),
        outcome.flexible(),
        outcome.deferred_after_full(),
        outcome.never_drawn(),
    ] {
        seen.extend(names(bucket));
    }
    seen.extend(
        outcome
            .anomalies()
            .iter()
            .map(|anomaly| anomaly.applicant.first_name.as_str()),
    );
    seen.sort_unstable();

    let mut expected = names(input);
    expected.sort_unstable();

    assert_eq!(seen, expected, "outcome must partition the eligible pool");
    assert_eq!(outcome.accounted_for(), input.len());
}

/// Mixed pool with unique first names.
pub(super) fn mixed_pool(size: usize) -> Vec<ApplicantRecord> {
    (0..size)
        .map(|idx| {
            let name = format!("Entrant{idx:03}");
            match idx % 7 {
                0 | 3 => slot_a(&name),
                1 | 4 => slot_b(&name),
                6 => neither(&name),
                _ => both(&name),
            }
        })
        .collect()
}
