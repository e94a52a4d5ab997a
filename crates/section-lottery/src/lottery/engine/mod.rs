mod sections;

pub use sections::{SectionCondition, SectionCounts, SectionState};

use super::domain::{ApplicantRecord, Availability, Section};
use super::draw::DrawSequence;
use super::outcome::{AvailabilityAnomaly, LotteryEvent, LotteryOutcome, Phase, TerminalState};
use crate::config::LotteryConfig;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Runs the three-phase allocation over a drawn pool.
///
/// Phase 1 assigns single-section applicants directly and holds flexible ones back until
/// either a section fills, the combined capacity is reached, or the pool runs dry. If a
/// section filled, phase 2 moves every flexible applicant into the other section and phase 3
/// keeps drawing to fill it.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentEngine {
    config: LotteryConfig,
}

impl AssignmentEngine {
    pub fn new(config: &LotteryConfig) -> Self {
        Self { config: *config }
    }

    pub fn run(&self, pool: DrawSequence) -> Result<LotteryOutcome, LotteryError> {
        let mut run = LotteryRun::new(&self.config, pool);

        info!(
            seed = run.pool.seed(),
            section_limit = self.config.section_limit(),
            capacity = run.capacity,
            pool_size = run.pool.remaining(),
            "lottery run starting"
        );

        run.open_draw()?;
        if run.admitted() == run.capacity || (run.pool.is_empty() && run.sections.all_open()) {
            return Ok(run.finish(TerminalState::DoneBothOpen));
        }

        run.resolve_flexible()?;
        run.backfill()?;

        let terminal = if run.admitted() == run.capacity {
            TerminalState::DoneBothFilled
        } else {
            TerminalState::DonePoolExhausted
        };
        Ok(run.finish(terminal))
    }
}

/// Mutable state of one run. Owned by [`AssignmentEngine::run`] and consumed into the
/// outcome when the run terminates.
#[derive(Debug)]
pub(super) struct LotteryRun {
    pub(super) phase: Phase,
    pub(super) sections: SectionState,
    pub(super) flexible: Vec<ApplicantRecord>,
    pub(super) deferred_after_full: Vec<ApplicantRecord>,
    pub(super) anomalies: Vec<AvailabilityAnomaly>,
    pub(super) events: Vec<LotteryEvent>,
    pub(super) underfull: Option<Section>,
    pub(super) pool: DrawSequence,
    capacity: usize,
    draws: usize,
}

impl LotteryRun {
    pub(super) fn new(config: &LotteryConfig, pool: DrawSequence) -> Self {
        Self {
            phase: Phase::Phase1Open,
            sections: SectionState::new(config.section_limit()),
            flexible: Vec::new(),
            deferred_after_full: Vec::new(),
            anomalies: Vec::new(),
            events: Vec::new(),
            underfull: None,
            pool,
            capacity: config.total_capacity(),
            draws: 0,
        }
    }

    /// Applicants holding a place, flexible ones included.
    pub(super) fn admitted(&self) -> usize {
        self.sections.total() + self.flexible.len()
    }

    pub(super) fn open_draw(&mut self) -> Result<(), LotteryError> {
        self.enter(Phase::Phase1Open);

        while self.sections.all_open() && self.admitted() < self.capacity {
            let Some(applicant) = self.pool.draw() else {
                break;
            };
            let draw = self.note_draw(&applicant);

            match applicant.availability() {
                Availability::Both => {
                    self.record(LotteryEvent::HeldFlexible {
                        draw,
                        applicant: applicant.display_name(),
                    });
                    self.flexible.push(applicant);
                }
                Availability::Only(section) => self.assign(draw, section, applicant)?,
                Availability::Neither => self.report_anomaly(draw, applicant),
            }
        }

        Ok(())
    }

    pub(super) fn resolve_flexible(&mut self) -> Result<(), LotteryError> {
        self.enter(Phase::Phase2Resolve);

        let underfull = match self.sections.underfull() {
            Ok(section) => section,
            Err(condition) => {
                return Err(LotteryError::UnresolvableSections {
                    condition,
                    snapshot: Box::new(self.snapshot(None)),
                })
            }
        };

        let moved = self.flexible.len();
        let mut pending = std::mem::take(&mut self.flexible).into_iter();
        while let Some(applicant) = pending.next() {
            if let Err(applicant) = self.sections.admit(underfull, applicant) {
                self.flexible = pending.collect();
                return Err(self.section_full(underfull, applicant));
            }
        }

        self.underfull = Some(underfull);
        self.record(LotteryEvent::FlexibleResolved {
            filled: underfull.other(),
            underfull,
            moved,
        });
        Ok(())
    }

    pub(super) fn backfill(&mut self) -> Result<(), LotteryError> {
        self.enter(Phase::Phase3Backfill);
        let underfull = match self.underfull {
            Some(section) => section,
            None => {
                return Err(LotteryError::UnresolvableSections {
                    condition: SectionCondition::BothOpen,
                    snapshot: Box::new(self.snapshot(None)),
                })
            }
        };

        while self.admitted() < self.capacity {
            let Some(applicant) = self.pool.draw() else {
                break;
            };
            let draw = self.note_draw(&applicant);

            match applicant.availability() {
                Availability::Neither => self.report_anomaly(draw, applicant),
                availability if availability.allows(underfull) => {
                    self.assign(draw, underfull, applicant)?
                }
                _ => {
                    self.record(LotteryEvent::Deferred {
                        draw,
                        applicant: applicant.display_name(),
                        wanted: underfull.other(),
                    });
                    self.deferred_after_full.push(applicant);
                }
            }
        }

        Ok(())
    }

    fn assign(
        &mut self,
        draw: usize,
        section: Section,
        applicant: ApplicantRecord,
    ) -> Result<(), LotteryError> {
        let name = applicant.display_name();
        match self.sections.admit(section, applicant) {
            Ok(_) => {
                self.record(LotteryEvent::Assigned {
                    draw,
                    applicant: name,
                    section,
                });
                Ok(())
            }
            Err(applicant) => Err(self.section_full(section, applicant)),
        }
    }

    fn report_anomaly(&mut self, draw: usize, applicant: ApplicantRecord) {
        self.record(LotteryEvent::Anomaly {
            draw,
            applicant: applicant.display_name(),
        });
        self.anomalies.push(AvailabilityAnomaly {
            draw,
            phase: self.phase,
            applicant,
        });
    }

    fn note_draw(&mut self, applicant: &ApplicantRecord) -> usize {
        self.draws += 1;
        let draw = self.draws;
        self.record(LotteryEvent::Drew {
            draw,
            applicant: applicant.display_name(),
        });
        draw
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.record(LotteryEvent::PhaseStarted { phase });
    }

    fn record(&mut self, event: LotteryEvent) {
        match &event {
            LotteryEvent::PhaseStarted { phase } => info!(
                %phase,
                counts = %self.sections.counts(),
                flexible = self.flexible.len(),
                pool_remaining = self.pool.remaining(),
                "phase started"
            ),
            LotteryEvent::Anomaly { draw, applicant } => {
                warn!(draw, applicant = %applicant, phase = %self.phase, "entry has no valid availability")
            }
            LotteryEvent::FlexibleResolved { .. } | LotteryEvent::Finished { .. } => {
                info!("{event}")
            }
            _ => debug!("{event}"),
        }
        self.events.push(event);
    }

    fn section_full(&self, section: Section, applicant: ApplicantRecord) -> LotteryError {
        LotteryError::SectionFull {
            section,
            snapshot: Box::new(self.snapshot(Some(applicant))),
        }
    }

    fn snapshot(&self, offending: Option<ApplicantRecord>) -> RunSnapshot {
        let partial = LotteryOutcome {
            seed: self.pool.seed(),
            section_limit: self.sections.limit(),
            terminal: TerminalState::ErrorNeitherFilled,
            underfull_section: self.underfull,
            assigned_a: self.sections.assigned(Section::A).to_vec(),
            assigned_b: self.sections.assigned(Section::B).to_vec(),
            flexible: self.flexible.clone(),
            deferred_after_full: self.deferred_after_full.clone(),
            never_drawn: self.pool.draw_order().cloned().collect(),
            anomalies: self.anomalies.clone(),
            events: self.events.clone(),
        };

        RunSnapshot {
            phase: self.phase,
            counts: self.sections.counts(),
            flexible: self.flexible.len(),
            pool_remaining: self.pool.remaining(),
            offending,
            partial,
        }
    }

    pub(super) fn finish(mut self, terminal: TerminalState) -> LotteryOutcome {
        let admitted = self.admitted();
        self.record(LotteryEvent::Finished {
            terminal,
            admitted,
            never_drawn: self.pool.remaining(),
        });

        let seed = self.pool.seed();
        let section_limit = self.sections.limit();
        let (assigned_a, assigned_b) = self.sections.into_parts();

        LotteryOutcome {
            seed,
            section_limit,
            terminal,
            underfull_section: self.underfull,
            assigned_a,
            assigned_b,
            flexible: self.flexible,
            deferred_after_full: self.deferred_after_full,
            never_drawn: self.pool.into_undrawn(),
            anomalies: self.anomalies,
            events: self.events,
        }
    }
}

/// Engine state captured when a run halts on an invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSnapshot {
    pub phase: Phase,
    pub counts: SectionCounts,
    pub flexible: usize,
    pub pool_remaining: usize,
    /// Applicant being placed when the run halted, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offending: Option<ApplicantRecord>,
    pub partial: LotteryOutcome,
}

impl fmt::Display for RunSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} flexible, {} left in pool",
            self.phase, self.counts, self.flexible, self.pool_remaining
        )
    }
}

/// Fatal invariant violations. Both carry the partial state of the run.
#[derive(Debug, thiserror::Error)]
pub enum LotteryError {
    #[error("cannot pick an underfull section because {condition} ({snapshot})")]
    UnresolvableSections {
        condition: SectionCondition,
        snapshot: Box<RunSnapshot>,
    },
    #[error("{section} is already at capacity ({snapshot})")]
    SectionFull {
        section: Section,
        snapshot: Box<RunSnapshot>,
    },
}

impl LotteryError {
    pub fn snapshot(&self) -> &RunSnapshot {
        match self {
            LotteryError::UnresolvableSections { snapshot, .. }
            | LotteryError::SectionFull { snapshot, .. } => snapshot,
        }
    }
}
