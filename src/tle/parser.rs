use std::ops::Range;

use thiserror::Error;

use crate::propagator::GravityModel;
use crate::time::{expand_tle_year, JulianDate};
use crate::tle::TleRecord;

const LINE_LEN: usize = 69;

#[derive(Debug, Error)]
pub enum TleError {
    #[error("line {line} is {len} characters, expected {LINE_LEN}")]
    Length { line: u8, len: usize },
    #[error("line {line} does not start with '{line}'")]
    LineNumber { line: u8 },
    #[error("line {line} checksum mismatch: computed {computed}, found {found}")]
    Checksum { line: u8, computed: u32, found: char },
    #[error("catalog number differs between lines: {line1} vs {line2}")]
    CatalogMismatch { line1: String, line2: String },
    #[error("line {line} columns {start}-{end} ({name}): unreadable field {text:?}")]
    Field {
        line: u8,
        start: usize,
        end: usize,
        name: &'static str,
        text: String,
    },
    #[error("{name} {value} outside physical range ({reason})")]
    ElementRange {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Verify the mod-10 checksum in column 69 of each line.
    pub validate_checksum: bool,
    pub gravity_model: GravityModel,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            validate_checksum: true,
            gravity_model: GravityModel::Wgs84,
        }
    }
}

/// Parse a two-line element set with default options (checksums on, WGS-84).
pub fn parse(line1: &str, line2: &str) -> Result<TleRecord, TleError> {
    parse_with(line1, line2, ParseOptions::default())
}

pub fn parse_with(
    line1: &str,
    line2: &str,
    options: ParseOptions,
) -> Result<TleRecord, TleError> {
    check_line(1, line1, '1', options.validate_checksum)?;
    check_line(2, line2, '2', options.validate_checksum)?;

    let catalog1 = line1[2..7].trim().to_string();
    let catalog2 = line2[2..7].trim().to_string();
    if catalog1 != catalog2 {
        return Err(TleError::CatalogMismatch {
            line1: catalog1,
            line2: catalog2,
        });
    }

    let epoch_year = expand_tle_year(field_u32(line1, 1, 18..20, "epoch year")?);
    let epoch_day = field_f64(line1, 1, 20..32, "epoch day")?;

    let record = TleRecord {
        catalog_number: catalog1,
        classification: line1.as_bytes()[7] as char,
        international_designator: line1[9..17].trim().to_string(),
        epoch: JulianDate::from_year_and_days(epoch_year, epoch_day),
        epoch_year,
        epoch_day,
        mean_motion_dot: field_f64(line1, 1, 33..43, "mean motion dot")?,
        mean_motion_ddot: field_exponent(line1, 1, 44..52, "mean motion ddot")?,
        bstar: field_exponent(line1, 1, 53..61, "bstar")?,
        inclination_deg: field_f64(line2, 2, 8..16, "inclination")?,
        right_ascension_deg: field_f64(line2, 2, 17..25, "right ascension")?,
        eccentricity: implied_decimal(line2, 2, 26..33, "eccentricity")?,
        arg_perigee_deg: field_f64(line2, 2, 34..42, "argument of perigee")?,
        mean_anomaly_deg: field_f64(line2, 2, 43..51, "mean anomaly")?,
        mean_motion_rev_day: field_f64(line2, 2, 52..63, "mean motion")?,
        element_set_number: field_u32(line1, 1, 64..68, "element set number")?,
        revolution_number: field_u32(line2, 2, 63..68, "revolution number")?,
        gravity_model: options.gravity_model,
    };

    validate_elements(&record)?;
    Ok(record)
}

fn validate_elements(record: &TleRecord) -> Result<(), TleError> {
    if record.mean_motion_rev_day <= 0.0 {
        return Err(TleError::ElementRange {
            name: "mean motion",
            value: record.mean_motion_rev_day,
            reason: "must be positive",
        });
    }
    if !(0.0..1.0).contains(&record.eccentricity) {
        return Err(TleError::ElementRange {
            name: "eccentricity",
            value: record.eccentricity,
            reason: "must be in [0, 1)",
        });
    }
    if !(0.0..=180.0).contains(&record.inclination_deg) {
        return Err(TleError::ElementRange {
            name: "inclination",
            value: record.inclination_deg,
            reason: "must be in [0, 180] degrees",
        });
    }
    if !(0.0..366.5).contains(&record.epoch_day) {
        return Err(TleError::ElementRange {
            name: "epoch day",
            value: record.epoch_day,
            reason: "must be a day of year",
        });
    }
    Ok(())
}

fn check_line(
    which: u8,
    line: &str,
    expected_first: char,
    validate_checksum: bool,
) -> Result<(), TleError> {
    if line.len() != LINE_LEN || !line.is_ascii() {
        return Err(TleError::Length {
            line: which,
            len: line.chars().count(),
        });
    }
    if !line.starts_with(expected_first) || line.as_bytes()[1] != b' ' {
        return Err(TleError::LineNumber { line: which });
    }
    if validate_checksum {
        let computed = checksum(&line[..LINE_LEN - 1]);
        let found = line.as_bytes()[LINE_LEN - 1] as char;
        if found.to_digit(10) != Some(computed) {
            return Err(TleError::Checksum {
                line: which,
                computed,
                found,
            });
        }
    }
    Ok(())
}

/// Mod-10 sum over the first 68 columns: digits count their value, a minus
/// sign counts one, everything else counts zero.
fn checksum(body: &str) -> u32 {
    body.chars()
        .map(|c| match c {
            '-' => 1,
            _ => c.to_digit(10).unwrap_or(0),
        })
        .sum::<u32>()
        % 10
}

fn field<'a>(line: &'a str, cols: Range<usize>) -> &'a str {
    line[cols].trim()
}

fn field_f64(
    line: &str,
    which: u8,
    cols: Range<usize>,
    name: &'static str,
) -> Result<f64, TleError> {
    let text = field(line, cols.clone());
    text.parse().map_err(|_| TleError::Field {
        line: which,
        start: cols.start + 1,
        end: cols.end,
        name,
        text: text.to_string(),
    })
}

fn field_u32(
    line: &str,
    which: u8,
    cols: Range<usize>,
    name: &'static str,
) -> Result<u32, TleError> {
    let text = field(line, cols.clone());
    if text.is_empty() {
        return Ok(0);
    }
    text.parse().map_err(|_| TleError::Field {
        line: which,
        start: cols.start + 1,
        end: cols.end,
        name,
        text: text.to_string(),
    })
}

/// A field printed without its leading "0." (the eccentricity column).
fn implied_decimal(
    line: &str,
    which: u8,
    cols: Range<usize>,
    name: &'static str,
) -> Result<f64, TleError> {
    let text = field(line, cols.clone());
    format!("0.{text}").parse().map_err(|_| TleError::Field {
        line: which,
        start: cols.start + 1,
        end: cols.end,
        name,
        text: text.to_string(),
    })
}

/// The compressed exponential form used for the drag fields: an optional
/// sign, a five-digit mantissa with implied leading decimal point, and a
/// signed single-digit power of ten, e.g. `-11606-4` = -0.11606e-4.
fn field_exponent(
    line: &str,
    which: u8,
    cols: Range<usize>,
    name: &'static str,
) -> Result<f64, TleError> {
    let raw = &line[cols.clone()];
    let err = || TleError::Field {
        line: which,
        start: cols.start + 1,
        end: cols.end,
        name,
        text: raw.to_string(),
    };

    let bytes = raw.as_bytes();
    if bytes.len() != 8 {
        return Err(err());
    }
    let sign = match bytes[0] {
        b'-' => -1.0,
        b'+' | b' ' | b'0' => 1.0,
        _ => return Err(err()),
    };
    let mantissa_text = raw[1..6].trim();
    if mantissa_text.is_empty() {
        return Ok(0.0);
    }
    let mantissa: f64 = mantissa_text.parse().map_err(|_| err())?;
    let exponent: i32 = raw[6..8].trim().parse().map_err(|_| err())?;
    Ok(sign * (mantissa / 1.0e5) * 10f64.powi(exponent))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISS_LINE1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str =
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    #[test]
    fn parses_reference_set() {
        let record = parse(ISS_LINE1, ISS_LINE2).unwrap();
        assert_eq!(record.catalog_number, "25544");
        assert_eq!(record.classification, 'U');
        assert_eq!(record.international_designator, "98067A");
        assert_eq!(record.epoch_year, 2008);
        assert!((record.epoch_day - 264.51782528).abs() < 1.0e-10);
        assert!((record.inclination_deg - 51.6416).abs() < 1.0e-10);
        assert!((record.right_ascension_deg - 247.4627).abs() < 1.0e-10);
        assert!((record.eccentricity - 0.0006703).abs() < 1.0e-12);
        assert!((record.mean_motion_rev_day - 15.72125391).abs() < 1.0e-10);
        assert!((record.bstar - (-0.11606e-4)).abs() < 1.0e-12);
        assert!((record.mean_motion_dot - (-0.00002182)).abs() < 1.0e-12);
        assert_eq!(record.element_set_number, 292);
        assert_eq!(record.revolution_number, 56353);
    }

    #[test]
    fn rejects_short_line() {
        let err = parse(&ISS_LINE1[..68], ISS_LINE2).unwrap_err();
        assert!(matches!(err, TleError::Length { line: 1, .. }));
    }

    #[test]
    fn rejects_swapped_lines() {
        let err = parse(ISS_LINE2, ISS_LINE1).unwrap_err();
        assert!(matches!(err, TleError::LineNumber { line: 1 }));
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut corrupted = ISS_LINE1.to_string();
        corrupted.replace_range(68..69, "0");
        let err = parse(&corrupted, ISS_LINE2).unwrap_err();
        assert!(matches!(err, TleError::Checksum { line: 1, .. }));
    }

    #[test]
    fn checksum_can_be_disabled() {
        let mut corrupted = ISS_LINE1.to_string();
        corrupted.replace_range(68..69, "0");
        let options = ParseOptions {
            validate_checksum: false,
            ..ParseOptions::default()
        };
        assert!(parse_with(&corrupted, ISS_LINE2, options).is_ok());
    }

    #[test]
    fn rejects_non_numeric_field() {
        let mut corrupted = ISS_LINE2.to_string();
        // inclination column; keep the checksum contribution unchanged
        corrupted.replace_range(9..10, "x");
        let options = ParseOptions {
            validate_checksum: false,
            ..ParseOptions::default()
        };
        let err = parse_with(ISS_LINE1, &corrupted, options).unwrap_err();
        assert!(matches!(err, TleError::Field { line: 2, .. }));
    }

    #[test]
    fn rejects_catalog_mismatch() {
        let mut other = ISS_LINE2.to_string();
        other.replace_range(2..7, "25545");
        let options = ParseOptions {
            validate_checksum: false,
            ..ParseOptions::default()
        };
        let err = parse_with(ISS_LINE1, &other, options).unwrap_err();
        assert!(matches!(err, TleError::CatalogMismatch { .. }));
    }

    #[test]
    fn exponent_field_forms() {
        assert!((field_exponent(" 00000-0", 1, 0..8, "f").unwrap()).abs() < 1.0e-15);
        assert!(
            (field_exponent("-11606-4", 1, 0..8, "f").unwrap() - (-0.11606e-4)).abs() < 1.0e-15
        );
        assert!((field_exponent(" 13844-3", 1, 0..8, "f").unwrap() - 0.13844e-3).abs() < 1.0e-15);
    }
}
