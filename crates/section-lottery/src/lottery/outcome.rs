use super::domain::{ApplicantRecord, Section};
use serde::Serialize;
use std::fmt;

/// Phase of the assignment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Direct assignment while both sections have room.
    Phase1Open,
    /// One section filled; flexible applicants move to the other.
    Phase2Resolve,
    /// Backfill the remaining section from the pool.
    Phase3Backfill,
}

impl Phase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Phase1Open => "phase 1 (open draw)",
            Self::Phase2Resolve => "phase 2 (resolve flexible)",
            Self::Phase3Backfill => "phase 3 (backfill)",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// State a run ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalState {
    /// Neither section filled on its own; staff balance the flexible list by hand.
    DoneBothOpen,
    DoneBothFilled,
    DonePoolExhausted,
    /// Phase 2 found both sections open or both full. Only ever seen on the partial outcome
    /// carried by [`super::LotteryError`].
    ErrorNeitherFilled,
}

impl TerminalState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::DoneBothOpen => "both sections open; flexible entrants need manual placement",
            Self::DoneBothFilled => "both sections filled",
            Self::DonePoolExhausted => "pool exhausted before both sections filled",
            Self::ErrorNeitherFilled => "halted: could not determine the filled section",
        }
    }

    pub const fn is_success(self) -> bool {
        !matches!(self, Self::ErrorNeitherFilled)
    }
}

/// Applicant drawn with no usable availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityAnomaly {
    pub draw: usize,
    pub phase: Phase,
    pub applicant: ApplicantRecord,
}

/// Discrete step of a run, kept for audit and mirrored to tracing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LotteryEvent {
    PhaseStarted {
        phase: Phase,
    },
    Drew {
        draw: usize,
        applicant: String,
    },
    Assigned {
        draw: usize,
        applicant: String,
        section: Section,
    },
    HeldFlexible {
        draw: usize,
        applicant: String,
    },
    Deferred {
        draw: usize,
        applicant: String,
        wanted: Section,
    },
    Anomaly {
        draw: usize,
        applicant: String,
    },
    FlexibleResolved {
        filled: Section,
        underfull: Section,
        moved: usize,
    },
    Finished {
        terminal: TerminalState,
        admitted: usize,
        never_drawn: usize,
    },
}

impl LotteryEvent {
    /// Writes the event with `name` supplying the section names.
    pub fn write_with<W, F, S>(&self, out: &mut W, name: F) -> fmt::Result
    where
        W: fmt::Write,
        F: Fn(Section) -> S,
        S: fmt::Display,
    {
        match self {
            LotteryEvent::PhaseStarted { phase } => write!(out, "starting {phase}"),
            LotteryEvent::Drew { draw, applicant } => write!(out, "#{draw} drew {applicant}"),
            LotteryEvent::Assigned {
                draw,
                applicant,
                section,
            } => write!(out, "#{draw} assigned {applicant} to {}", name(*section)),
            LotteryEvent::HeldFlexible { draw, applicant } => {
                write!(out, "#{draw} keeping {applicant}, flexible")
            }
            LotteryEvent::Deferred {
                draw,
                applicant,
                wanted,
            } => write!(
                out,
                "#{draw} cannot assign {applicant}: only available for {}, which is full",
                name(*wanted)
            ),
            LotteryEvent::Anomaly { draw, applicant } => {
                write!(out, "#{draw} {applicant} has no valid availability")
            }
            LotteryEvent::FlexibleResolved {
                filled,
                underfull,
                moved,
            } => write!(
                out,
                "{} filled up; assigned {moved} flexible entrants to {}",
                name(*filled),
                name(*underfull)
            ),
            LotteryEvent::Finished {
                terminal,
                admitted,
                never_drawn,
            } => write!(
                out,
                "finished: {} ({admitted} admitted, {never_drawn} never drawn)",
                terminal.label()
            ),
        }
    }
}

impl fmt::Display for LotteryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_with(f, Section::label)
    }
}

/// Categorized result of one lottery run.
///
/// Every applicant handed to the engine ends up in exactly one of the five lists or in
/// [`LotteryOutcome::anomalies`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LotteryOutcome {
    pub(super) seed: u64,
    pub(super) section_limit: usize,
    pub(super) terminal: TerminalState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) underfull_section: Option<Section>,
    pub(super) assigned_a: Vec<ApplicantRecord>,
    pub(super) assigned_b: Vec<ApplicantRecord>,
    pub(super) flexible: Vec<ApplicantRecord>,
    pub(super) deferred_after_full: Vec<ApplicantRecord>,
    pub(super) never_drawn: Vec<ApplicantRecord>,
    pub(super) anomalies: Vec<AvailabilityAnomaly>,
    pub(super) events: Vec<LotteryEvent>,
}

impl LotteryOutcome {
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub const fn section_limit(&self) -> usize {
        self.section_limit
    }

    pub const fn terminal(&self) -> TerminalState {
        self.terminal
    }

    /// Section that received the flexible applicants, when phase 2 ran.
    pub const fn underfull_section(&self) -> Option<Section> {
        self.underfull_section
    }

    pub fn assigned(&self, section: Section) -> &[ApplicantRecord] {
        match section {
            Section::A => &self.assigned_a,
            Section::B => &self.assigned_b,
        }
    }

    pub fn assigned_a(&self) -> &[ApplicantRecord] {
        &self.assigned_a
    }

    pub fn assigned_b(&self) -> &[ApplicantRecord] {
        &self.assigned_b
    }

    pub fn flexible(&self) -> &[ApplicantRecord] {
        &self.flexible
    }

    pub fn deferred_after_full(&self) -> &[ApplicantRecord] {
        &self.deferred_after_full
    }

    pub fn never_drawn(&self) -> &[ApplicantRecord] {
        &self.never_drawn
    }

    pub fn anomalies(&self) -> &[AvailabilityAnomaly] {
        &self.anomalies
    }

    pub fn events(&self) -> &[LotteryEvent] {
        &self.events
    }

    pub fn total_admitted(&self) -> usize {
        self.assigned_a.len() + self.assigned_b.len() + self.flexible.len()
    }

    /// Number of applicants accounted for across all buckets, anomalies included.
    pub fn accounted_for(&self) -> usize {
        self.total_admitted()
            + self.deferred_after_full.len()
            + self.never_drawn.len()
            + self.anomalies.len()
    }

    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            terminal: self.terminal,
            terminal_label: self.terminal.label(),
            seed: self.seed,
            section_limit: self.section_limit,
            assigned_a: self.assigned_a.len(),
            assigned_b: self.assigned_b.len(),
            flexible: self.flexible.len(),
            deferred_after_full: self.deferred_after_full.len(),
            never_drawn: self.never_drawn.len(),
            anomalies: self.anomalies.len(),
        }
    }
}

/// Bucket sizes for quick audit views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeSummary {
    pub terminal: TerminalState,
    pub terminal_label: &'static str,
    pub seed: u64,
    pub section_limit: usize,
    pub assigned_a: usize,
    pub assigned_b: usize,
    pub flexible: usize,
    pub deferred_after_full: usize,
    pub never_drawn: usize,
    pub anomalies: usize,
}
