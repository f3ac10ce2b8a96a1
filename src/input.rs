//! Parser for process description files.
//!
//! One process per line, five `|`-separated fields:
//!
//! ```text
//! # pid|arrival-time|cpu-burst-time|num-bursts|io-time
//! A|0|168|5|287
//! B|0|385|1|0
//! ```
//!
//! Lines starting with `#` and blank lines are ignored. Every numeric field
//! must be a plain run of ASCII digits.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::process::ProcessSpec;
use crate::scenario::{Horizon, SimConfig};
use crate::types::TimeMs;

const FIELD_NAMES: [&str; 4] = ["arrival time", "CPU burst time", "number of bursts", "I/O time"];

/// Parse a whole input text into validated process descriptors.
pub fn parse_processes(text: &str) -> SimResult<Vec<ProcessSpec>> {
    let mut specs = Vec::new();
    let mut seen = HashSet::new();
    let mut horizon = Horizon::new(SimConfig::default());
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        if raw.starts_with('#') || raw.trim().is_empty() {
            continue;
        }
        let spec = parse_line(raw.trim(), line_no)?;
        if !seen.insert(spec.pid.clone()) {
            return Err(SimError::invalid(
                line_no,
                format!("duplicate process id {:?}", spec.pid),
            ));
        }
        horizon.add(&spec, line_no)?;
        specs.push(spec);
    }
    debug!(count = specs.len(), "parsed process descriptors");
    Ok(specs)
}

/// Parse one non-comment line.
pub fn parse_line(line: &str, line_no: usize) -> SimResult<ProcessSpec> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() != 5 {
        return Err(SimError::invalid(
            line_no,
            format!("expected 5 '|'-separated fields, found {}", fields.len()),
        ));
    }

    let pid = fields[0];
    let mut values = [0u64; 4];
    for (slot, (field, name)) in values
        .iter_mut()
        .zip(fields[1..].iter().zip(FIELD_NAMES))
    {
        *slot = parse_number(field, name, line_no)?;
    }

    let num_bursts = u32::try_from(values[2]).map_err(|_| {
        SimError::invalid(line_no, format!("number of bursts {} is too large", values[2]))
    })?;
    let spec = ProcessSpec::new(pid, values[0], values[1], num_bursts, values[3]);
    spec.validate(line_no)?;
    Ok(spec)
}

fn parse_number(field: &str, name: &str, line_no: usize) -> SimResult<TimeMs> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SimError::invalid(
            line_no,
            format!("{name} {field:?} is not a non-negative integer"),
        ));
    }
    field
        .parse::<TimeMs>()
        .map_err(|e| SimError::invalid(line_no, format!("{name} {field:?}: {e}")))
}

/// Validate descriptors that did not come through the text parser.
pub(crate) fn validate_specs(specs: &[ProcessSpec], config: SimConfig) -> SimResult<()> {
    let mut seen = HashSet::new();
    let mut horizon = Horizon::new(config);
    for spec in specs {
        spec.validate(0)?;
        if !seen.insert(spec.pid.as_str()) {
            return Err(SimError::invalid(
                0,
                format!("duplicate process id {:?}", spec.pid),
            ));
        }
        horizon.add(spec, 0)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let text = "\
# pid|arrival|burst|bursts|io
A|0|168|5|287

B|0|385|1|0
   \n\
C|190|97|5|2499
";
        let specs = parse_processes(text).unwrap();
        assert_eq!(
            specs,
            vec![
                ProcessSpec::new("A", 0, 168, 5, 287),
                ProcessSpec::new("B", 0, 385, 1, 0),
                ProcessSpec::new("C", 190, 97, 5, 2499),
            ]
        );
    }

    #[test]
    fn test_parse_trims_fields() {
        let spec = parse_line(" P1 | 4 | 2 | 1 | 0 ", 1).unwrap();
        assert_eq!(spec, ProcessSpec::new("P1", 4, 2, 1, 0));
    }

    #[test]
    fn test_rejects_wrong_field_count() {
        let err = parse_processes("A|0|5|1\n").unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidProcessSpec {
                line: 1,
                reason: "expected 5 '|'-separated fields, found 4".into(),
            }
        );
    }

    #[test]
    fn test_rejects_non_numeric_and_signed() {
        for bad in ["A|x|5|1|0", "A|0|-5|1|0", "A|0|+5|1|0", "A|0|5|1.0|0", "A|0|5|1|"] {
            let err = parse_processes(bad).unwrap_err();
            assert!(
                matches!(err, SimError::InvalidProcessSpec { line: 1, .. }),
                "{bad:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_rejects_zero_burst_and_duplicate() {
        assert!(parse_processes("A|0|0|1|0").is_err());
        assert!(parse_processes("A|0|5|0|0").is_err());

        let err = parse_processes("A|0|5|1|0\n#\nA|3|5|1|0\n").unwrap_err();
        assert!(matches!(err, SimError::InvalidProcessSpec { line: 3, .. }));
    }

    #[test]
    fn test_error_message_names_line() {
        let err = parse_processes("A|0|5|1|0\nB|zz|5|1|0").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("invalid process spec on line 2"), "{msg}");
        assert!(msg.contains("arrival time"), "{msg}");
    }

    #[test]
    fn test_rejects_values_that_overflow_the_clock() {
        for (text, line) in [
            ("A|0|5|2|18446744073709551615", 1),
            ("A|18446744073709551614|5|1|0", 1),
            ("A|0|18446744073709551615|1|0", 1),
            // Each fits alone; together the stats totals would not.
            ("A|0|5|1|0\nB|9223372036854775807|5|1|0", 2),
        ] {
            let err = parse_processes(text).unwrap_err();
            assert!(
                matches!(err, SimError::InvalidProcessSpec { line: l, .. } if l == line),
                "{text:?}: {err:?}"
            );
            assert!(err.to_string().contains("overflow the simulated clock"));
        }
    }

    #[test]
    fn test_accepts_large_in_range_values() {
        let specs = parse_processes("A|1000000000|5|1|0\nB|0|100000|1000|3600000").unwrap();
        assert_eq!(specs.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_processes("# nothing\n\n").unwrap().is_empty());
    }
}
