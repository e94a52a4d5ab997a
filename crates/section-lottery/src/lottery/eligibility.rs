use super::domain::ApplicantRecord;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Cohort a lottery run draws from. Returning and first-time registrants are never mixed in
/// one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortSelector {
    Returning,
    FirstTime,
}

impl CohortSelector {
    /// Resolves the pair of command-line switches into a single cohort.
    pub fn from_flags(returning: bool, first_time: bool) -> Result<Self, ConfigError> {
        match (returning, first_time) {
            (true, false) => Ok(Self::Returning),
            (false, true) => Ok(Self::FirstTime),
            (true, true) => Err(ConfigError::CohortConflict),
            (false, false) => Err(ConfigError::CohortUnselected),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Returning => "returning",
            Self::FirstTime => "first-time",
        }
    }

    pub const fn admits(self, record: &ApplicantRecord) -> bool {
        match self {
            Self::Returning => record.is_returning,
            Self::FirstTime => !record.is_returning,
        }
    }
}

/// Keeps the records of the selected cohort, preserving input order.
pub fn filter_eligible(pool: Vec<ApplicantRecord>, cohort: CohortSelector) -> Vec<ApplicantRecord> {
    pool.into_iter()
        .filter(|record| cohort.admits(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, returning: bool) -> ApplicantRecord {
        ApplicantRecord::new(name, "Example", true, false, returning)
    }

    #[test]
    fn flags_resolve_to_exactly_one_cohort() {
        assert_eq!(
            CohortSelector::from_flags(true, false),
            Ok(CohortSelector::Returning)
        );
        assert_eq!(
            CohortSelector::from_flags(false, true),
            Ok(CohortSelector::FirstTime)
        );
        assert_eq!(
            CohortSelector::from_flags(true, true),
            Err(ConfigError::CohortConflict)
        );
        assert_eq!(
            CohortSelector::from_flags(false, false),
            Err(ConfigError::CohortUnselected)
        );
    }

    #[test]
    fn filter_keeps_selected_cohort_in_order() {
        let pool = vec![
            record("Ada", true),
            record("Bea", false),
            record("Cal", true),
            record("Dot", false),
        ];

        let returning = filter_eligible(pool.clone(), CohortSelector::Returning);
        let names: Vec<_> = returning.iter().map(|r| r.first_name.as_str()).collect();
        assert_eq!(names, ["Ada", "Cal"]);

        let first_time = filter_eligible(pool, CohortSelector::FirstTime);
        let names: Vec<_> = first_time.iter().map(|r| r.first_name.as_str()).collect();
        assert_eq!(names, ["Bea", "Dot"]);
    }
}
