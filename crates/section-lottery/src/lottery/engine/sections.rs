use super::super::domain::{ApplicantRecord, Section};
use serde::Serialize;
use std::fmt;

/// Assigned applicants for both sections plus their shared capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionState {
    limit: usize,
    section_a: Vec<ApplicantRecord>,
    section_b: Vec<ApplicantRecord>,
}

impl SectionState {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            section_a: Vec::new(),
            section_b: Vec::new(),
        }
    }

    pub const fn limit(&self) -> usize {
        self.limit
    }

    pub fn assigned(&self, section: Section) -> &[ApplicantRecord] {
        match section {
            Section::A => &self.section_a,
            Section::B => &self.section_b,
        }
    }

    pub fn count(&self, section: Section) -> usize {
        self.assigned(section).len()
    }

    pub fn is_open(&self, section: Section) -> bool {
        self.count(section) < self.limit
    }

    pub fn all_open(&self) -> bool {
        Section::ordered()
            .into_iter()
            .all(|section| self.is_open(section))
    }

    pub fn total(&self) -> usize {
        self.section_a.len() + self.section_b.len()
    }

    /// Appends `record` to `section` if it still has room, handing the record back otherwise.
    pub fn admit(
        &mut self,
        section: Section,
        record: ApplicantRecord,
    ) -> Result<usize, ApplicantRecord> {
        if !self.is_open(section) {
            return Err(record);
        }

        let seats = match section {
            Section::A => &mut self.section_a,
            Section::B => &mut self.section_b,
        };
        seats.push(record);
        Ok(seats.len())
    }

    /// The single section that still has room once the other one filled.
    pub fn underfull(&self) -> Result<Section, SectionCondition> {
        match (self.is_open(Section::A), self.is_open(Section::B)) {
            (true, false) => Ok(Section::A),
            (false, true) => Ok(Section::B),
            (true, true) => Err(SectionCondition::BothOpen),
            (false, false) => Err(SectionCondition::BothFull),
        }
    }

    pub fn counts(&self) -> SectionCounts {
        SectionCounts {
            section_a: self.section_a.len(),
            section_b: self.section_b.len(),
            limit: self.limit,
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<ApplicantRecord>, Vec<ApplicantRecord>) {
        (self.section_a, self.section_b)
    }
}

/// Why flexible applicants could not be routed to a single open section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionCondition {
    BothOpen,
    BothFull,
}

impl fmt::Display for SectionCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionCondition::BothOpen => f.write_str("neither section is full"),
            SectionCondition::BothFull => f.write_str("both sections are full"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionCounts {
    pub section_a: usize,
    pub section_b: usize,
    pub limit: usize,
}

impl fmt::Display for SectionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "section A {}/{}, section B {}/{}",
            self.section_a, self.limit, self.section_b, self.limit
        )
    }
}
