use clap::{Args, ValueEnum};
use section_lottery::config::{parse_section_limit, AppConfig, ConfigError, LotteryConfig};
use section_lottery::error::AppError;
use section_lottery::intake::{DiscardReason, RegistrationImporter};
use section_lottery::lottery::{run_lottery, CohortSelector};
use section_lottery::report::{render_halt, render_outcome, ReportOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct CleanArgs {
    /// Raw registration export (CSV)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Where to write the cleaned export
    #[arg(long)]
    pub(crate) output: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct DrawArgs {
    /// Registration export to draw from (CSV)
    #[arg(long)]
    pub(crate) responses: PathBuf,
    /// Seats per section. Falls back to LOTTERY_SECTION_LIMIT.
    #[arg(long, value_parser = parse_section_limit)]
    pub(crate) section_limit: Option<usize>,
    /// Draw returning members only
    #[arg(long)]
    pub(crate) returning: bool,
    /// Draw first-time applicants only
    #[arg(long)]
    pub(crate) firsttime: bool,
    /// Seed for a reproducible draw. A fresh seed is generated and reported when omitted.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Drop repeat submissions and dummy entries before drawing
    #[arg(long)]
    pub(crate) dedupe: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
    /// Append the step-by-step draw log to text output
    #[arg(long)]
    pub(crate) show_events: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

pub(crate) fn run_clean<W: Write>(
    args: CleanArgs,
    config: &AppConfig,
    out: &mut W,
) -> Result<(), AppError> {
    let CleanArgs { input, output } = args;

    let sheet = RegistrationImporter::from_path(&input, &config.intake)?;
    let received = sheet.rows.len();
    let (cleaned, discarded) = sheet.deduplicated(&config.intake.dummy_entries);
    cleaned.write_to_path(&output)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        received,
        kept = cleaned.rows.len(),
        "registration export cleaned"
    );

    writeln!(
        out,
        "Read {received} entries from {}; kept {} distinct entrants",
        input.display(),
        cleaned.rows.len()
    )?;
    writeln!(out, "Discarded {} entries:", discarded.len())?;
    for entry in &discarded {
        let name = entry.row.identity_key();
        match entry.reason {
            DiscardReason::Duplicate { kept_line } => writeln!(
                out,
                "- line {}: {name} (replaced by line {kept_line})",
                entry.row.line
            )?,
            DiscardReason::DummyEntry => {
                writeln!(out, "- line {}: {name} (dummy entry)", entry.row.line)?
            }
        }
    }
    writeln!(out, "Cleaned export written to {}", output.display())?;

    Ok(())
}

pub(crate) fn run_draw<W: Write>(
    args: DrawArgs,
    config: &AppConfig,
    out: &mut W,
) -> Result<(), AppError> {
    let DrawArgs {
        responses,
        section_limit,
        returning,
        firsttime,
        seed,
        dedupe,
        format,
        show_events,
    } = args;

    let section_limit = section_limit
        .or(config.default_section_limit)
        .ok_or(ConfigError::MissingSectionLimit)?;
    let cohort = CohortSelector::from_flags(returning, firsttime)?;
    let lottery = LotteryConfig::new(section_limit, cohort, seed)?;

    let mut sheet = RegistrationImporter::from_path(&responses, &config.intake)?;
    if dedupe {
        let (cleaned, discarded) = sheet.deduplicated(&config.intake.dummy_entries);
        info!(discarded = discarded.len(), "dropped repeat and dummy entries");
        sheet = cleaned;
    }
    let applicants = RegistrationImporter::applicants(&sheet, &config.intake);

    let options = ReportOptions {
        labels: config.report.clone(),
        show_events,
    };

    match run_lottery(&lottery, applicants) {
        Ok(outcome) => {
            match format {
                OutputFormat::Text => {
                    let mut text = String::new();
                    render_outcome(&outcome, &options, &mut text)
                        .map_err(|_| std::io::Error::other("failed to render report"))?;
                    out.write_all(text.as_bytes())?;
                }
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut *out, &outcome)?;
                    writeln!(out)?;
                }
            }
            Ok(())
        }
        Err(err) => {
            match format {
                OutputFormat::Text => {
                    let mut text = String::new();
                    render_halt(&err, &options, &mut text)
                        .map_err(|_| std::io::Error::other("failed to render report"))?;
                    out.write_all(text.as_bytes())?;
                }
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut *out, err.snapshot())?;
                    writeln!(out)?;
                }
            }
            Err(err.into())
        }
    }
}
