//! Reproducible lottery that assigns registrants to one of two parallel sections.
//!
//! The [`lottery`] module holds the allocation core (eligibility filter, draw sequencer and the
//! three-phase assignment engine). [`intake`] turns a registration export into applicant
//! records, and the remaining modules carry configuration, telemetry and error plumbing shared
//! with the command-line front end.

pub mod config;
pub mod error;
pub mod intake;
pub mod lottery;
pub mod report;
pub mod telemetry;
