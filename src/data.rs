use std::fmt;

use serde::Serialize;

/// 2^63, the first float past `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// A single scanned CSV field.
///
/// Fields are classified independently: the same column may hold integers
/// next to text, and it is the column validator that decides what is legal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// True for an explicit null and for float `NaN`, which stands in for a
    /// missing value once a numeric field has been scanned.
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// The integer this cell represents, accepting floats with no fraction
    /// that lie inside the `i64` range.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            Cell::Float(f)
                if f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(f) =>
            {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Integer(_) => "integer",
            Cell::Float(_) => "float",
            Cell::Text(_) => "string",
        }
    }

    /// Replaces `NaN` with an explicit [`Cell::Null`].
    pub fn normalized(self) -> Cell {
        if self.is_null() { Cell::Null } else { self }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "null"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
        }
    }
}

/// The values of one positional column.
///
/// `Unscannable` marks a column whose raw bytes could not be decoded, so no
/// per-value classification is possible.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Cells(Vec<Cell>),
    Unscannable { rows: usize, reason: String },
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Cells(cells) => cells.len(),
            ColumnValues::Unscannable { rows, .. } => *rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tokens read as missing values, compared case-insensitively.
const NULL_TOKENS: &[&str] = &[
    "#n/a", "#n/a n/a", "#na", "-1.#ind", "-1.#qnan", "-nan", "1.#ind", "1.#qnan", "<na>", "n/a",
    "na", "null", "nan", "none",
];

pub fn is_null_token(value: &str) -> bool {
    let lowered = value.trim().to_ascii_lowercase();
    lowered.is_empty() || NULL_TOKENS.contains(&lowered.as_str())
}

/// Scans one decoded field into a [`Cell`].
pub fn scan_cell(raw: &str) -> Cell {
    if is_null_token(raw) {
        return Cell::Null;
    }
    let trimmed = raw.trim();
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Cell::Integer(parsed);
    }
    if looks_numeric(trimmed)
        && let Ok(parsed) = trimmed.parse::<f64>()
    {
        return Cell::Float(parsed);
    }
    Cell::Text(raw.to_string())
}

// Rust's float parser also accepts "inf" and "infinity"; only digit-led tokens
// count as numbers here so words such as "Infinity Corp" stay text.
fn looks_numeric(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    unsigned
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.')
}
