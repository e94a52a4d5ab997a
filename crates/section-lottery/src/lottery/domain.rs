use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two parallel sections filled by the lottery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    A,
    B,
}

impl Section {
    pub const fn ordered() -> [Self; 2] {
        [Self::A, Self::B]
    }

    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "Section A",
            Self::B => "Section B",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which sections an applicant declared they can attend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Both,
    Only(Section),
    Neither,
}

impl Availability {
    pub const fn from_flags(slot_a: bool, slot_b: bool) -> Self {
        match (slot_a, slot_b) {
            (true, true) => Self::Both,
            (true, false) => Self::Only(Section::A),
            (false, true) => Self::Only(Section::B),
            (false, false) => Self::Neither,
        }
    }

    pub const fn allows(self, section: Section) -> bool {
        match self {
            Self::Both => true,
            Self::Only(only) => matches!(
                (only, section),
                (Section::A, Section::A) | (Section::B, Section::B)
            ),
            Self::Neither => false,
        }
    }
}

/// Normalized registration entry handed to the lottery core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub first_name: String,
    pub last_name: String,
    pub available_slot_a: bool,
    pub available_slot_b: bool,
    pub is_returning: bool,
    /// Submission time from the registration export, when it carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<NaiveDateTime>,
    /// Line in the source export, for audit trails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_line: Option<u64>,
}

impl ApplicantRecord {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        available_slot_a: bool,
        available_slot_b: bool,
        is_returning: bool,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            available_slot_a,
            available_slot_b,
            is_returning,
            submitted_at: None,
            source_line: None,
        }
    }

    pub const fn availability(&self) -> Availability {
        Availability::from_flags(self.available_slot_a, self.available_slot_b)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
