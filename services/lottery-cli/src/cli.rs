use crate::commands::{run_clean, run_draw, CleanArgs, DrawArgs};
use clap::{Parser, Subcommand};
use section_lottery::config::AppConfig;
use section_lottery::error::AppError;
use section_lottery::telemetry;
use std::io;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "section-lottery",
    about = "Clean registration exports and run the two-section enrollment lottery",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Remove repeat submissions and dummy entries from a registration export
    Clean(CleanArgs),
    /// Draw applicants into the two sections and print the categorized result
    Draw(DrawArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Clean(args) => run_clean(args, &config, &mut out),
        Command::Draw(args) => run_draw(args, &config, &mut out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::OutputFormat;
    use std::path::PathBuf;

    #[test]
    fn draw_accepts_every_flag() {
        let cli = Cli::try_parse_from([
            "section-lottery",
            "draw",
            "--responses",
            "responses.csv",
            "--section-limit",
            "12",
            "--firsttime",
            "--seed",
            "2016",
            "--dedupe",
            "--format",
            "json",
            "--show-events",
        ])
        .expect("arguments parse");

        let Command::Draw(args) = cli.command else {
            panic!("expected draw command");
        };
        assert_eq!(args.responses, PathBuf::from("responses.csv"));
        assert_eq!(args.section_limit, Some(12));
        assert!(args.firsttime);
        assert!(!args.returning);
        assert_eq!(args.seed, Some(2016));
        assert!(args.dedupe);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.show_events);
    }

    #[test]
    fn draw_defaults_to_text_without_a_seed() {
        let cli = Cli::try_parse_from([
            "section-lottery",
            "draw",
            "--responses",
            "responses.csv",
            "--returning",
        ])
        .expect("arguments parse");

        let Command::Draw(args) = cli.command else {
            panic!("expected draw command");
        };
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.seed.is_none());
        assert!(args.section_limit.is_none());
    }

    #[test]
    fn clean_requires_input_and_output() {
        let cli = Cli::try_parse_from([
            "section-lottery",
            "clean",
            "--input",
            "raw.csv",
            "--output",
            "clean.csv",
        ])
        .expect("arguments parse");
        assert!(matches!(cli.command, Command::Clean(_)));

        let missing = Cli::try_parse_from(["section-lottery", "clean", "--input", "raw.csv"]);
        assert!(missing.is_err());
    }

    #[test]
    fn section_limit_is_validated_while_parsing() {
        for bad in ["0", "twelve", "-3"] {
            let result = Cli::try_parse_from([
                "section-lottery",
                "draw",
                "--responses",
                "responses.csv",
                "--firsttime",
                "--section-limit",
                bad,
            ]);
            assert!(result.is_err(), "{bad} accepted as a section limit");
        }
    }

    #[test]
    fn seed_must_be_an_unsigned_integer() {
        let result = Cli::try_parse_from([
            "section-lottery",
            "draw",
            "--responses",
            "responses.csv",
            "--seed",
            "-4",
        ]);
        assert!(result.is_err());
    }
}
