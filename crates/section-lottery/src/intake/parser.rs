use super::normalizer::{is_affirmative, normalize_name, parse_timestamp};
use super::{ColumnLayout, IntakeError, RegistrationRow, RegistrationSheet};
use csv::StringRecord;
use std::io::Read;
use tracing::{debug, warn};

struct ColumnIndex {
    first_name: usize,
    last_name: usize,
    availability: usize,
    returning: usize,
    timestamp: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, layout: &ColumnLayout) -> Result<Self, IntakeError> {
        let find = |wanted: &str| {
            let wanted = normalize_name(wanted);
            headers
                .iter()
                .position(|header| normalize_name(header) == wanted)
        };
        let require = |wanted: &str| {
            find(wanted).ok_or_else(|| IntakeError::MissingColumn {
                column: wanted.to_string(),
            })
        };

        Ok(Self {
            first_name: require(&layout.first_name)?,
            last_name: require(&layout.last_name)?,
            availability: require(&layout.availability)?,
            returning: require(&layout.returning)?,
            timestamp: layout.timestamp.as_deref().and_then(find),
        })
    }
}

pub(crate) fn parse_sheet<R: Read>(
    reader: R,
    layout: &ColumnLayout,
) -> Result<RegistrationSheet, IntakeError> {
    let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers, layout)?;
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let raw = record?;
        let field = |idx: usize| raw.get(idx).unwrap_or_default();
        let line = raw.position().map(|position| position.line()).unwrap_or(0);

        let submitted_at = match columns.timestamp.map(field) {
            Some(value) if !value.trim().is_empty() => {
                let parsed = parse_timestamp(value);
                if parsed.is_none() {
                    warn!(line, value, "unrecognized submission timestamp");
                }
                parsed
            }
            _ => None,
        };

        let row = RegistrationRow {
            line,
            first_name: normalize_name(field(columns.first_name)),
            last_name: normalize_name(field(columns.last_name)),
            availability: field(columns.availability).trim().to_string(),
            returning: is_affirmative(field(columns.returning)),
            submitted_at,
            raw: raw.clone(),
        };
        debug!(line, entrant = %row.identity_key(), "parsed registration");
        rows.push(row);
    }

    Ok(RegistrationSheet { headers, rows })
}
