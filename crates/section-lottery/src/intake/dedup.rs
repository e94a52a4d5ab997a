use super::normalizer::normalize_name;
use super::RegistrationRow;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{info, warn};

/// Why a registration row was dropped during cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DiscardReason {
    /// Superseded by a more recent submission for the same child.
    Duplicate { kept_line: u64 },
    /// Matches a configured test/placeholder identity.
    DummyEntry,
}

#[derive(Debug, Clone)]
pub struct DiscardedEntry {
    pub row: RegistrationRow,
    pub reason: DiscardReason,
}

#[derive(Debug, Clone, Default)]
pub struct DedupReport {
    pub kept: Vec<RegistrationRow>,
    pub discarded: Vec<DiscardedEntry>,
}

impl DedupReport {
    pub fn duplicates(&self) -> usize {
        self.discarded
            .iter()
            .filter(|entry| matches!(entry.reason, DiscardReason::Duplicate { .. }))
            .count()
    }
}

/// Keeps the most recent row per child and drops configured dummy identities.
///
/// Rows are taken in file order. A repeat replaces the earlier row and moves to the end of the
/// kept list, unless both rows carry timestamps and the repeat is strictly older.
pub fn deduplicate(rows: Vec<RegistrationRow>, dummy_entries: &[String]) -> DedupReport {
    let dummies: Vec<String> = dummy_entries
        .iter()
        .map(|entry| normalize_name(entry).to_lowercase())
        .collect();

    // Identity -> (position of the surviving row, row).
    let mut latest: HashMap<String, (usize, RegistrationRow)> = HashMap::new();
    let mut discarded = Vec::new();

    for (position, row) in rows.into_iter().enumerate() {
        let key = row.identity_key();

        if dummies.contains(&key.to_lowercase()) {
            warn!(line = row.line, entrant = %key, "discarding dummy registration");
            discarded.push(DiscardedEntry {
                row,
                reason: DiscardReason::DummyEntry,
            });
            continue;
        }

        match latest.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert((position, row));
            }
            Entry::Occupied(mut slot) => {
                let (kept_at, existing) = slot.get_mut();
                if is_older(&row, existing) {
                    warn!(
                        entrant = %key,
                        kept_line = existing.line,
                        discarded_line = row.line,
                        "duplicate registration is older than the one on file; discarding it"
                    );
                    discarded.push(DiscardedEntry {
                        row,
                        reason: DiscardReason::Duplicate {
                            kept_line: existing.line,
                        },
                    });
                } else {
                    let previous = std::mem::replace(existing, row);
                    *kept_at = position;
                    warn!(
                        entrant = %key,
                        kept_line = existing.line,
                        discarded_line = previous.line,
                        "duplicate registration; keeping the newer entry"
                    );
                    discarded.push(DiscardedEntry {
                        row: previous,
                        reason: DiscardReason::Duplicate {
                            kept_line: existing.line,
                        },
                    });
                }
            }
        }
    }

    let mut survivors: Vec<(usize, RegistrationRow)> = latest.into_values().collect();
    survivors.sort_by_key(|(position, _)| *position);
    let kept: Vec<RegistrationRow> = survivors.into_iter().map(|(_, row)| row).collect();
    info!(
        distinct = kept.len(),
        discarded = discarded.len(),
        "registration cleanup complete"
    );

    DedupReport { kept, discarded }
}

fn is_older(candidate: &RegistrationRow, existing: &RegistrationRow) -> bool {
    match (candidate.submitted_at, existing.submitted_at) {
        (Some(candidate), Some(existing)) => candidate < existing,
        _ => false,
    }
}
