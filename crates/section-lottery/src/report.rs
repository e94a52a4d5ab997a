//! Plain-text rendering of a lottery outcome for staff audit.

use crate::config::ReportConfig;
use crate::lottery::{ApplicantRecord, LotteryError, LotteryOutcome, Section};
use std::fmt::{self, Write};

/// Options controlling how much of the run is printed.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub labels: ReportConfig,
    pub show_events: bool,
}

impl ReportOptions {
    fn section_label(&self, section: Section) -> &str {
        match section {
            Section::A => &self.labels.slot_a_label,
            Section::B => &self.labels.slot_b_label,
        }
    }
}

pub fn render_outcome<W: Write>(
    outcome: &LotteryOutcome,
    options: &ReportOptions,
    out: &mut W,
) -> fmt::Result {
    let summary = outcome.summary();
    writeln!(
        out,
        "Lottery results (seed {}, section limit {})",
        summary.seed, summary.section_limit
    )?;
    writeln!(out, "Outcome: {}", summary.terminal_label)?;
    writeln!(
        out,
        "Totals: {} {}, {} {}, {} flexible, {} drawn after full, {} never drawn, {} without valid availability",
        summary.assigned_a,
        options.section_label(Section::A),
        summary.assigned_b,
        options.section_label(Section::B),
        summary.flexible,
        summary.deferred_after_full,
        summary.never_drawn,
        summary.anomalies
    )?;
    if let Some(section) = outcome.underfull_section() {
        writeln!(
            out,
            "{} filled first; flexible entrants went to {}",
            options.section_label(section.other()),
            options.section_label(section)
        )?;
    }

    for section in Section::ordered() {
        let heading = format!("Accepted {}", options.section_label(section));
        render_list(out, &heading, outcome.assigned(section))?;
    }
    render_list(out, "Accepted flexible", outcome.flexible())?;
    render_list(out, "Drawn after full", outcome.deferred_after_full())?;
    render_list(out, "Never drawn", outcome.never_drawn())?;

    writeln!(
        out,
        "\nNo valid availability ({}):",
        outcome.anomalies().len()
    )?;
    for anomaly in outcome.anomalies() {
        write!(
            out,
            "{} (draw #{}, {}",
            anomaly.applicant.display_name(),
            anomaly.draw,
            anomaly.phase
        )?;
        if let Some(line) = anomaly.applicant.source_line {
            write!(out, ", line {line}")?;
        }
        writeln!(out, ")")?;
    }

    if options.show_events {
        writeln!(out, "\nDraw log:")?;
        for event in outcome.events() {
            write!(out, "- ")?;
            event.write_with(out, |section| options.section_label(section))?;
            writeln!(out)?;
        }
    }

    Ok(())
}

/// Renders a halted run: the violation first, then everything the engine had placed so far.
pub fn render_halt<W: Write>(
    error: &LotteryError,
    options: &ReportOptions,
    out: &mut W,
) -> fmt::Result {
    let snapshot = error.snapshot();
    writeln!(out, "Error! The lottery halted: {error}")?;
    if let Some(applicant) = &snapshot.offending {
        writeln!(out, "While placing: {}", applicant.display_name())?;
    }
    writeln!(out, "Partial state follows.\n")?;
    render_outcome(&snapshot.partial, options, out)
}

fn render_list<W: Write>(out: &mut W, heading: &str, entries: &[ApplicantRecord]) -> fmt::Result {
    writeln!(out, "\n{heading} ({}):", entries.len())?;
    for entry in entries {
        writeln!(out, "{}", entry.display_name())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LotteryConfig;
    use crate::lottery::{AssignmentEngine, CohortSelector, DrawSequence};

    fn outcome() -> LotteryOutcome {
        let config = LotteryConfig::new(1, CohortSelector::FirstTime, Some(42)).expect("config");
        let order = vec![
            ApplicantRecord::new("Xia", "Chen", true, false, false),
            ApplicantRecord::new("Yusuf", "Ali", true, false, false),
            ApplicantRecord::new("Nobody", "Free", false, false, false),
            ApplicantRecord::new("Zoe", "Park", false, true, false),
        ];
        AssignmentEngine::new(&config)
            .run(DrawSequence::from_draw_order(42, order))
            .expect("run completes")
    }

    #[test]
    fn renders_every_bucket_with_counts() {
        let mut text = String::new();
        render_outcome(&outcome(), &ReportOptions::default(), &mut text).expect("render");

        assert!(text.starts_with("Lottery results (seed 42, section limit 1)"));
        assert!(text.contains("Outcome: both sections filled"));
        assert!(text.contains(
            "Totals: 1 Tuesday, 1 Friday, 0 flexible, 1 drawn after full, 0 never drawn, 1 without valid availability"
        ));
        assert!(text.contains("Tuesday filled first; flexible entrants went to Friday"));
        assert!(text.contains("\nAccepted Tuesday (1):\nXia Chen\n"));
        assert!(text.contains("\nAccepted Friday (1):\nZoe Park\n"));
        assert!(text.contains("\nAccepted flexible (0):\n"));
        assert!(text.contains("\nDrawn after full (1):\nYusuf Ali\n"));
        assert!(text.contains("\nNever drawn (0):\n"));
        assert!(text.contains("Nobody Free (draw #3, phase 3 (backfill))"));
        assert!(!text.contains("Draw log:"));
    }

    #[test]
    fn summary_counts_match_the_buckets() {
        let summary = outcome().summary();
        assert_eq!(summary.terminal, crate::lottery::TerminalState::DoneBothFilled);
        assert_eq!(summary.seed, 42);
        assert_eq!((summary.assigned_a, summary.assigned_b), (1, 1));
        assert_eq!(summary.flexible, 0);
        assert_eq!(summary.deferred_after_full, 1);
        assert_eq!(summary.never_drawn, 0);
        assert_eq!(summary.anomalies, 1);
    }

    #[test]
    fn event_log_is_opt_in() {
        let options = ReportOptions {
            show_events: true,
            ..ReportOptions::default()
        };
        let mut text = String::new();
        render_outcome(&outcome(), &options, &mut text).expect("render");

        assert!(text.contains("Draw log:"));
        assert!(text.contains("- #1 drew Xia Chen"));
        assert!(text.contains("- #1 assigned Xia Chen to Tuesday"));
        assert!(text.contains("- #2 cannot assign Yusuf Ali: only available for Tuesday, which is full"));
        assert!(text.contains("- Tuesday filled up; assigned 0 flexible entrants to Friday"));
        assert!(!text.contains("Section A"));
    }
}
