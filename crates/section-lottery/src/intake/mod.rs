//! Registration export intake: CSV parsing, normalization, and repeat-entry cleanup.

mod dedup;
mod normalizer;
mod parser;

pub use dedup::{deduplicate, DedupReport, DiscardReason, DiscardedEntry};

use crate::config::IntakeConfig;
use crate::lottery::ApplicantRecord;
use chrono::NaiveDateTime;
use csv::StringRecord;
use std::io::{Read, Write};
use std::path::Path;

/// Header names of the registration export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub first_name: String,
    pub last_name: String,
    pub availability: String,
    pub returning: String,
    /// Optional; rows without it fall back to file order when deduplicating.
    pub timestamp: Option<String>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            first_name: "Child's first name".to_string(),
            last_name: "Child's last name".to_string(),
            availability:
                "Which sections are you entering the lottery for (you'll be assigned to at most one)?"
                    .to_string(),
            returning: "Are you a returning Newton GWC Club member?".to_string(),
            timestamp: Some("Timestamp".to_string()),
        }
    }
}

/// One parsed row of the export. The raw record is kept so a cleaned file can be written back
/// unchanged.
#[derive(Debug, Clone)]
pub struct RegistrationRow {
    pub line: u64,
    pub first_name: String,
    pub last_name: String,
    pub availability: String,
    pub returning: bool,
    pub submitted_at: Option<NaiveDateTime>,
    raw: StringRecord,
}

impl RegistrationRow {
    pub fn identity_key(&self) -> String {
        normalizer::identity_key(&self.first_name, &self.last_name)
    }

    pub fn raw(&self) -> &StringRecord {
        &self.raw
    }

    pub fn to_applicant(&self, config: &IntakeConfig) -> ApplicantRecord {
        ApplicantRecord {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            available_slot_a: normalizer::mentions_token(&self.availability, &config.slot_a_token),
            available_slot_b: normalizer::mentions_token(&self.availability, &config.slot_b_token),
            is_returning: self.returning,
            submitted_at: self.submitted_at,
            source_line: Some(self.line),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationSheet {
    pub headers: StringRecord,
    pub rows: Vec<RegistrationRow>,
}

impl RegistrationSheet {
    /// Writes the sheet back out with its original headers and raw field values.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), IntakeError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row.raw())?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), IntakeError> {
        let file = std::fs::File::create(path)?;
        self.write_to(file)
    }

    /// Drops repeat and dummy entries, returning the cleaned sheet and what was removed.
    pub fn deduplicated(self, dummy_entries: &[String]) -> (Self, Vec<DiscardedEntry>) {
        let DedupReport { kept, discarded } = deduplicate(self.rows, dummy_entries);
        (
            Self {
                headers: self.headers,
                rows: kept,
            },
            discarded,
        )
    }
}

pub struct RegistrationImporter;

impl RegistrationImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        config: &IntakeConfig,
    ) -> Result<RegistrationSheet, IntakeError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, config)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        config: &IntakeConfig,
    ) -> Result<RegistrationSheet, IntakeError> {
        parser::parse_sheet(reader, &config.columns)
    }

    /// Converts rows into lottery applicants, preserving sheet order.
    pub fn applicants(sheet: &RegistrationSheet, config: &IntakeConfig) -> Vec<ApplicantRecord> {
        sheet
            .rows
            .iter()
            .map(|row| row.to_applicant(config))
            .collect()
    }
}

#[derive(Debug)]
pub enum IntakeError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn { column: String },
}

impl std::fmt::Display for IntakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeError::Io(err) => write!(f, "failed to access registration export: {}", err),
            IntakeError::Csv(err) => write!(f, "invalid registration CSV data: {}", err),
            IntakeError::MissingColumn { column } => {
                write!(f, "registration export has no '{}' column", column)
            }
        }
    }
}

impl std::error::Error for IntakeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IntakeError::Io(err) => Some(err),
            IntakeError::Csv(err) => Some(err),
            IntakeError::MissingColumn { .. } => None,
        }
    }
}

impl From<std::io::Error> for IntakeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for IntakeError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}
