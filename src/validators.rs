//! Column validators.
//!
//! A validator looks at every value of one column and returns one
//! [`Verdict`] per row. Validators never fail: a column that cannot be
//! scanned value by value is reported as invalid on every row.

use std::{fmt, sync::LazyLock};

use regex::Regex;

use crate::data::{Cell, ColumnValues};

static ISO_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("timestamp pattern compiles")
});

/// Outcome for one row; `Invalid` carries the message shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(String),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    IntegerLike,
    IntegerLikeOrNull,
    String,
    IsoTimestamp,
}

impl Validator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Validator::IntegerLike => "integer-like",
            Validator::IntegerLikeOrNull => "integer-like-or-null",
            Validator::String => "string",
            Validator::IsoTimestamp => "iso-timestamp",
        }
    }

    pub fn validate(&self, column: &ColumnValues) -> Vec<Verdict> {
        match column {
            ColumnValues::Cells(cells) => cells.iter().map(|cell| self.check(cell)).collect(),
            ColumnValues::Unscannable { rows, reason } => {
                let message = format!("column could not be scanned as {}: {reason}", self);
                vec![Verdict::Invalid(message); *rows]
            }
        }
    }

    pub fn check(&self, cell: &Cell) -> Verdict {
        let predicate = match self {
            Validator::IntegerLike => is_integer_like,
            Validator::IntegerLikeOrNull => is_integer_like_or_null,
            Validator::String => is_string,
            Validator::IsoTimestamp => is_iso_timestamp,
        };
        if predicate(cell) {
            Verdict::Valid
        } else {
            Verdict::Invalid(self.failure_message(cell))
        }
    }

    fn failure_message(&self, cell: &Cell) -> String {
        match self {
            Validator::IntegerLike => format!(
                "the value \"{cell}\" ({}) is not an integer",
                cell.type_name()
            ),
            Validator::IntegerLikeOrNull => format!(
                "the value \"{cell}\" ({}) is neither an integer nor empty",
                cell.type_name()
            ),
            Validator::String => {
                format!("the value \"{cell}\" ({}) is not a string", cell.type_name())
            }
            Validator::IsoTimestamp => format!(
                "the value \"{cell}\" does not match the format YYYY-MM-DDTHH:MM:SSZ"
            ),
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_integer_like(cell: &Cell) -> bool {
    !cell.is_null() && cell.as_integer().is_some()
}

pub fn is_integer_like_or_null(cell: &Cell) -> bool {
    cell.is_null() || cell.as_integer().is_some()
}

pub fn is_string(cell: &Cell) -> bool {
    cell.is_null() || matches!(cell, Cell::Text(_))
}

pub fn is_iso_timestamp(cell: &Cell) -> bool {
    if cell.is_null() {
        return true;
    }
    cell.as_text()
        .is_some_and(|text| ISO_TIMESTAMP.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_like_accepts_whole_numbers_only() {
        assert!(is_integer_like(&Cell::Integer(3)));
        assert!(is_integer_like(&Cell::Float(3.0)));
        assert!(!is_integer_like(&Cell::Float(3.5)));
        assert!(!is_integer_like(&Cell::Null));
        assert!(!is_integer_like(&Cell::Float(f64::NAN)));
        assert!(!is_integer_like(&Cell::Text("3".into())));
    }

    #[test]
    fn integer_like_or_null_accepts_missing_values() {
        assert!(is_integer_like_or_null(&Cell::Null));
        assert!(is_integer_like_or_null(&Cell::Float(f64::NAN)));
        assert!(is_integer_like_or_null(&Cell::Integer(0)));
        assert!(!is_integer_like_or_null(&Cell::Float(0.25)));
    }

    #[test]
    fn string_accepts_text_and_null() {
        assert!(is_string(&Cell::Text("Sales".into())));
        assert!(is_string(&Cell::Null));
        assert!(!is_string(&Cell::Integer(12)));
    }

    #[test]
    fn iso_timestamp_requires_exact_pattern() {
        let valid = Cell::Text("2021-06-15T10:00:00Z".into());
        assert!(is_iso_timestamp(&valid));
        assert!(is_iso_timestamp(&Cell::Null));
        for bad in [
            "2021-06-15",
            "2021-06-15T10:00:00",
            "2021-06-15T10:00:00.123Z",
            "2021-06-15T10:00:00+02:00",
            "2021-06-15 10:00:00Z",
            " 2021-06-15T10:00:00Z",
        ] {
            assert!(!is_iso_timestamp(&Cell::Text(bad.into())), "{bad}");
        }
        assert!(!is_iso_timestamp(&Cell::Integer(20210615)));
    }

    #[test]
    fn validate_returns_one_verdict_per_row() {
        let column = ColumnValues::Cells(vec![
            Cell::Integer(1),
            Cell::Text("two".into()),
            Cell::Float(3.0),
        ]);
        let verdicts = Validator::IntegerLike.validate(&column);
        assert_eq!(verdicts.len(), 3);
        assert!(verdicts[0].is_valid());
        assert_eq!(
            verdicts[1],
            Verdict::Invalid("the value \"two\" (string) is not an integer".into())
        );
        assert!(verdicts[2].is_valid());
    }

    #[test]
    fn unscannable_column_is_invalid_on_every_row() {
        let column = ColumnValues::Unscannable {
            rows: 2,
            reason: "invalid utf-8".into(),
        };
        for validator in [
            Validator::IntegerLike,
            Validator::IntegerLikeOrNull,
            Validator::String,
            Validator::IsoTimestamp,
        ] {
            let verdicts = validator.validate(&column);
            assert_eq!(verdicts.len(), 2);
            assert!(verdicts.iter().all(|v| !v.is_valid()));
        }
    }
}
