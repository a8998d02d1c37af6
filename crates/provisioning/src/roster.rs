//! Roster loading.
//!
//! A roster is a comma-separated file whose first line is a header and whose
//! remaining lines are `team_number,email` pairs:
//!
//! ```text
//! team_no,email
//! 5,a@x.com
//! 6,b@x.com
//! ```
//!
//! Blank lines are ignored. Lines that do not have exactly two fields, a
//! positive team number and a plausible email are skipped with a warning;
//! the run continues with the rest. A file that yields no usable row at all
//! is fatal. Fields are read verbatim: quote characters have no special
//! meaning, so a stray quote only spoils its own line.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{EmailAddress, ProvisionError, RosterRow, TeamNumber};

/// Why a roster line was not turned into a [`RosterRow`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SkipReason {
    #[error("expected 2 fields, found {found}")]
    WrongFieldCount { found: usize },

    #[error("'{value}' is not a positive team number")]
    InvalidTeamNumber { value: String },

    #[error("'{value}' is not a valid email address")]
    InvalidEmail { value: String },

    #[error("line could not be parsed: {message}")]
    Unparseable { message: String },
}

/// A roster line that was skipped, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: SkipReason,
}

/// The validated contents of a roster file.
#[derive(Debug, Clone)]
pub struct Roster {
    source: PathBuf,
    rows: Vec<RosterRow>,
    skipped: Vec<SkippedRow>,
}

impl Roster {
    /// Path the roster was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Accepted rows, in file order.
    pub fn rows(&self) -> &[RosterRow] {
        &self.rows
    }

    /// Lines rejected during loading, in file order.
    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }

    /// Distinct team numbers mentioned by accepted rows, ascending.
    pub fn team_numbers(&self) -> BTreeSet<TeamNumber> {
        self.rows.iter().map(|row| row.team).collect()
    }
}

/// Reads and validates the roster at `path`.
///
/// # Errors
///
/// - [`ProvisionError::RosterUnreadable`] if the file cannot be opened or read.
/// - [`ProvisionError::RosterEmpty`] if no line survives validation.
pub fn load_roster(path: &Path) -> Result<Roster, ProvisionError> {
    let file = File::open(path).map_err(|err| ProvisionError::RosterUnreadable {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    parse_roster(file, path)
}

/// Parses roster text from any reader. `source` is used for diagnostics only.
pub fn parse_roster<R: Read>(input: R, source: &Path) -> Result<Roster, ProvisionError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .quoting(false)
        .from_reader(input);

    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) if err.is_io_error() => {
                return Err(ProvisionError::RosterUnreadable {
                    path: source.to_path_buf(),
                    message: err.to_string(),
                });
            }
            Err(err) => {
                let line = err.position().map(|p| p.line()).unwrap_or_default();
                skipped.push(SkippedRow {
                    line,
                    reason: SkipReason::Unparseable {
                        message: err.to_string(),
                    },
                });
                continue;
            }
        };

        if record.iter().all(str::is_empty) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        match parse_row(&record, line) {
            Ok(row) => rows.push(row),
            Err(reason) => skipped.push(SkippedRow { line, reason }),
        }
    }

    for row in &skipped {
        warn!(
            roster = %source.display(),
            line = row.line,
            reason = %row.reason,
            "Skipping malformed roster row"
        );
    }

    if rows.is_empty() {
        return Err(ProvisionError::RosterEmpty {
            path: source.to_path_buf(),
            skipped: skipped.len(),
        });
    }

    info!(
        roster = %source.display(),
        rows = rows.len(),
        skipped = skipped.len(),
        "Loaded roster"
    );

    Ok(Roster {
        source: source.to_path_buf(),
        rows,
        skipped,
    })
}

fn parse_row(record: &csv::StringRecord, line: u64) -> Result<RosterRow, SkipReason> {
    if record.len() != 2 {
        return Err(SkipReason::WrongFieldCount {
            found: record.len(),
        });
    }
    let (team_field, email_field) = (&record[0], &record[1]);
    let team = TeamNumber::parse(team_field).ok_or_else(|| SkipReason::InvalidTeamNumber {
        value: team_field.to_string(),
    })?;
    let email = EmailAddress::parse(email_field).ok_or_else(|| SkipReason::InvalidEmail {
        value: email_field.to_string(),
    })?;
    Ok(RosterRow { line, team, email })
}
