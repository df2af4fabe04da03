//! Parser and validator for the bracketed archive date-range mini-language.
//!
//! An expression names one hourly archive or a range of them:
//! `YYYY-MM-DD-H[H]`, where each of the four `-`-joined fields is either a
//! literal or a braced range (`{a..b}` or `{a,b}`). The expression resolves
//! to a lower/upper bound pair, both of which must name archives the service
//! actually published. Validation is a gate, not a transform: on success the
//! caller gets the original string back for URL substitution.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;
use tracing::debug;

/// Which side of a braced range a field value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Lower => write!(f, "lower"),
            Bound::Upper => write!(f, "upper"),
        }
    }
}

/// The four fields of an expression, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Year,
    Month,
    Day,
    Hour,
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateField::Year => write!(f, "year"),
            DateField::Month => write!(f, "month"),
            DateField::Day => write!(f, "day"),
            DateField::Hour => write!(f, "hour"),
        }
    }
}

/// Failure modes of expression validation, in the order they are checked.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateExpressionError {
    #[error("`{expr}` does not match the yyyy-mm-dd-h[h] format")]
    MissingValue { expr: String },

    #[error("improper {field} value ({bound} bound) in `{expr}`")]
    ImproperValue {
        field: DateField,
        bound: Bound,
        expr: String,
    },

    #[error("date figures must all be integers in `{expr}`")]
    ImproperType { expr: String },

    #[error("the {bound} bound of `{expr}` is not a valid date and hour")]
    Calendar { bound: Bound, expr: String },

    #[error("`{expr}` is not between February 12, 2011 and the current time")]
    OutOfRange { expr: String },
}

/// Resolved bound pair of a validated expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub lower: NaiveDateTime,
    pub upper: NaiveDateTime,
}

/// The first instant for which the service published hourly archives.
pub fn earliest_archive() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2011, 2, 12)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("fixed service start date")
}

/// Validate `expr`, returning the borrowed original for URL substitution.
pub fn validate(expr: &str) -> Result<&str, DateExpressionError> {
    let range = parse(expr)?;
    debug!(expr, lower = %range.lower, upper = %range.upper, "date expression validated");
    Ok(expr)
}

/// Parse and fully validate `expr`, resolving its bound pair.
pub fn parse(expr: &str) -> Result<DateRange, DateExpressionError> {
    let fields = split_fields(expr)?;
    check_widths(&fields, expr)?;
    let lower = integers(&fields, Bound::Lower, expr)?;
    let upper = integers(&fields, Bound::Upper, expr)?;
    let lower = instant(lower, Bound::Lower, expr)?;
    let upper = instant(upper, Bound::Upper, expr)?;

    let now = Utc::now().naive_utc();
    let earliest = earliest_archive();
    let in_range = |t: NaiveDateTime| earliest < t && t < now;
    if !in_range(lower) || !in_range(upper) {
        return Err(DateExpressionError::OutOfRange {
            expr: expr.to_owned(),
        });
    }
    Ok(DateRange { lower, upper })
}

/// One field of the expression with its range resolved: a literal
/// contributes the same text to both bounds.
struct Field {
    lower: String,
    upper: String,
}

impl Field {
    fn side(&self, bound: Bound) -> &str {
        match bound {
            Bound::Lower => &self.lower,
            Bound::Upper => &self.upper,
        }
    }
}

/// Split on `-` into the four fields. Anything past the fourth is ignored.
fn split_fields(expr: &str) -> Result<Vec<Field>, DateExpressionError> {
    let parts: Vec<&str> = expr.split('-').collect();
    if parts.len() < 4 {
        return Err(DateExpressionError::MissingValue {
            expr: expr.to_owned(),
        });
    }
    Ok(parts[..4].iter().map(|raw| field(raw)).collect())
}

/// Parse one raw field: strip braces, then look for `..` before `,` as the
/// range delimiter. No delimiter means the value serves as both bounds.
fn field(raw: &str) -> Field {
    let stripped = raw.trim_matches(|c| c == '{' || c == '}');
    let split = |delimiter: &str| {
        let mut sides = stripped.split(delimiter);
        match (sides.next(), sides.next()) {
            (Some(lower), Some(upper)) => Some(Field {
                lower: lower.to_owned(),
                upper: upper.to_owned(),
            }),
            _ => None,
        }
    };
    if stripped.contains("..") {
        split("..")
    } else if stripped.contains(',') {
        split(",")
    } else {
        None
    }
    .unwrap_or_else(|| Field {
        lower: stripped.to_owned(),
        upper: stripped.to_owned(),
    })
}

/// Structural check: year is four characters, month and day two, on both
/// sides of every range. Hour width is deliberately unconstrained so a
/// single-digit hour stays valid.
fn check_widths(fields: &[Field], expr: &str) -> Result<(), DateExpressionError> {
    for bound in [Bound::Lower, Bound::Upper] {
        let widths = [
            (DateField::Year, 4usize),
            (DateField::Month, 2),
            (DateField::Day, 2),
        ];
        for ((field, width), value) in widths.iter().zip(fields) {
            if value.side(bound).len() != *width {
                return Err(DateExpressionError::ImproperValue {
                    field: *field,
                    bound,
                    expr: expr.to_owned(),
                });
            }
        }
    }
    Ok(())
}

fn integers(fields: &[Field], bound: Bound, expr: &str) -> Result<[u32; 4], DateExpressionError> {
    let mut values = [0u32; 4];
    for (value, field) in values.iter_mut().zip(fields) {
        *value = field
            .side(bound)
            .parse()
            .map_err(|_| DateExpressionError::ImproperType {
                expr: expr.to_owned(),
            })?;
    }
    Ok(values)
}

fn instant(
    [year, month, day, hour]: [u32; 4],
    bound: Bound,
    expr: &str,
) -> Result<NaiveDateTime, DateExpressionError> {
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .ok_or_else(|| DateExpressionError::Calendar {
            bound,
            expr: expr.to_owned(),
        })
}
