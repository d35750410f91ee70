//! Reader for the plain-text problem description.
//!
//! ```text
//! # comment lines and blank lines are ignored
//! 3 2        <- num_vms num_pms
//! 2 4        <- one `cpu ram` line per VM
//! 1 2
//! 3 3
//! 8 8        <- remaining lines: `cpu_capacity ram_capacity` per PM
//! 4 8
//! ```

use crate::models::{Instance, Resources, ValidationError};
use std::path::Path;
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("MissingHeader: expected `num_vms num_pms` before any record")]
    MissingHeader,
    #[error("ParseError: line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("ValidationError: {0}")]
    Validation(#[from] ValidationError),
}

/// Reads, parses and validates the file at `path`.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load(path: impl AsRef<Path>) -> Result<Resources, Error> {
    let instance = read_instance(path)?;
    tracing::info!(
        num_vms = instance.num_vms,
        num_pms = instance.num_pms,
        "Instance loaded"
    );

    Ok(Resources::try_from(instance)?)
}

pub fn read_instance(path: impl AsRef<Path>) -> Result<Instance, Error> {
    let input = std::fs::read_to_string(path)?;

    parse(&input)
}

/// Parses the text format into an unvalidated [`Instance`].
///
/// The first `num_vms` records are VMs and every record after them is a PM, so
/// a file with too few or too many lines still parses and is rejected when the
/// instance is turned into [`Resources`].
pub fn parse(input: &str) -> Result<Instance, Error> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let (line, header) = lines.next().ok_or(Error::MissingHeader)?;
    let (num_vms, num_pms) = parse_pair(line, header)?;
    let num_vms = to_count(line, num_vms)?;
    let num_pms = to_count(line, num_pms)?;

    let mut instance = Instance {
        num_vms,
        num_pms,
        vm_records: Vec::with_capacity(num_vms),
        pm_records: Vec::with_capacity(num_pms),
    };

    for (line, record) in lines {
        let pair = parse_pair(line, record)?;
        if instance.vm_records.len() < num_vms {
            instance.vm_records.push(pair);
        } else {
            instance.pm_records.push(pair);
        }
    }

    Ok(instance)
}

fn parse_pair(line: usize, text: &str) -> Result<(u64, u64), Error> {
    let values = text
        .split_whitespace()
        .map(|field| {
            field.parse::<u64>().map_err(|err| Error::Parse {
                line,
                reason: format!("{field:?} is not a non-negative integer: {err}"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    match values.as_slice() {
        [first, second] => Ok((*first, *second)),
        _ => Err(Error::Parse {
            line,
            reason: format!("expected 2 values, found {}", values.len()),
        }),
    }
}

fn to_count(line: usize, value: u64) -> Result<usize, Error> {
    usize::try_from(value).map_err(|err| Error::Parse {
        line,
        reason: format!("count {value} does not fit in memory: {err}"),
    })
}
