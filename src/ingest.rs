//! Upload ingestion: file checks, headerless parsing, positional column
//! assignment, accumulated validation, null normalization and projection into
//! typed records.

use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};

use crate::{
    data::{Cell, ColumnValues, scan_cell},
    error::{CellFailure, Error, Result},
    io_utils,
    records::{Batch, Department, Employee, Job},
    schema::{EntityKind, Schema},
    validators::Verdict,
};

/// A parsed upload with schema column names assigned by position.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub rows: usize,
    pub columns: Vec<NamedColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedColumn {
    pub name: &'static str,
    pub values: ColumnValues,
}

impl Frame {
    fn cells(&self, name: &str) -> &[Cell] {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| match &c.values {
                ColumnValues::Cells(cells) => Some(cells.as_slice()),
                ColumnValues::Unscannable { .. } => None,
            })
            .unwrap_or(&[])
    }
}

/// Raw upload rows; a `None` field could not be decoded.
pub type RawRows = Vec<Vec<Option<String>>>;

pub fn ingest(file_name: &str, bytes: &[u8], declared_kind: &str) -> Result<Batch> {
    ingest_with_encoding(file_name, bytes, declared_kind, UTF_8)
}

pub fn ingest_with_encoding(
    file_name: &str,
    bytes: &[u8],
    declared_kind: &str,
    encoding: &'static Encoding,
) -> Result<Batch> {
    ensure_csv_file_name(file_name)?;
    let kind: EntityKind = declared_kind.parse()?;
    let raw = read_headerless(bytes, encoding)?;
    let schema = kind.schema();
    let mut frame = assign_columns(raw, schema)?;
    validate_frame(&frame, schema)?;
    normalize_nulls(&mut frame);
    let batch = project(&frame, kind)?;
    info!(
        "Validated {} {} row(s) from '{}'",
        batch.len(),
        kind,
        file_name
    );
    Ok(batch)
}

pub fn ensure_csv_file_name(file_name: &str) -> Result<()> {
    if file_name.ends_with(".csv") {
        Ok(())
    } else {
        Err(Error::UnsupportedFormat {
            file_name: file_name.to_string(),
        })
    }
}

pub fn read_headerless(bytes: &[u8], encoding: &'static Encoding) -> Result<RawRows> {
    let mut reader = io_utils::open_headerless_reader(io_utils::strip_bom(bytes, encoding));
    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.map_err(|err| Error::MalformedInput {
            reason: format!("row {row_idx}: {err}"),
        })?;
        rows.push(
            record
                .iter()
                .map(|field| io_utils::decode_field(field, encoding))
                .collect(),
        );
    }
    if rows.is_empty() {
        return Err(Error::EmptyInput);
    }
    debug!("Read {} headerless row(s)", rows.len());
    Ok(rows)
}

/// Names the raw columns after the schema, in order.
pub fn assign_columns(raw: RawRows, schema: &Schema) -> Result<Frame> {
    let width = raw.first().map(Vec::len).unwrap_or_default();
    if width != schema.width() {
        return Err(Error::SchemaMismatch {
            expected: schema.column_names(),
            found: width,
        });
    }
    let rows = raw.len();
    let mut by_column: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(rows); width];
    for record in raw {
        for (idx, field) in record.into_iter().enumerate() {
            by_column[idx].push(field);
        }
    }
    let columns = schema
        .columns
        .iter()
        .zip(by_column)
        .map(|(spec, fields)| NamedColumn {
            name: spec.name,
            values: scan_column(fields),
        })
        .collect();
    Ok(Frame { rows, columns })
}

fn scan_column(fields: Vec<Option<String>>) -> ColumnValues {
    if let Some(row) = fields.iter().position(Option::is_none) {
        return ColumnValues::Unscannable {
            rows: fields.len(),
            reason: format!("row {row} is not valid text in the declared encoding"),
        };
    }
    ColumnValues::Cells(fields.iter().flatten().map(|f| scan_cell(f)).collect())
}

/// Runs every column validator and reports all failures together.
pub fn validate_frame(frame: &Frame, schema: &Schema) -> Result<()> {
    let failures = collect_failures(frame, schema);
    if failures.is_empty() {
        return Ok(());
    }
    info!(
        "Content validation found {} failing cell(s) across {} row(s)",
        failures.len(),
        frame.rows
    );
    Err(Error::ContentValidation { failures })
}

pub fn collect_failures(frame: &Frame, schema: &Schema) -> Vec<CellFailure> {
    let mut failures = Vec::new();
    for (spec, column) in schema.columns.iter().zip(&frame.columns) {
        for (row, verdict) in spec.validator.validate(&column.values).into_iter().enumerate() {
            if let Verdict::Invalid(message) = verdict {
                failures.push(CellFailure {
                    row,
                    column: column.name.to_string(),
                    message,
                });
            }
        }
    }
    failures
}

pub fn normalize_nulls(frame: &mut Frame) {
    for column in &mut frame.columns {
        if let ColumnValues::Cells(cells) = &mut column.values {
            for cell in cells.iter_mut() {
                *cell = std::mem::replace(cell, Cell::Null).normalized();
            }
        }
    }
}

/// Turns a validated, normalized frame into typed records.
pub fn project(frame: &Frame, kind: EntityKind) -> Result<Batch> {
    let ids = frame
        .cells("id")
        .iter()
        .enumerate()
        .map(|(row, cell)| required_integer(cell, row, "id"))
        .collect::<Result<Vec<_>>>()?;

    let batch = match kind {
        EntityKind::Jobs => Batch::Jobs(
            ids.iter()
                .zip(frame.cells("job"))
                .map(|(&id, job)| Job {
                    id,
                    job: optional_text(job),
                })
                .collect(),
        ),
        EntityKind::Departments => Batch::Departments(
            ids.iter()
                .zip(frame.cells("department"))
                .map(|(&id, department)| Department {
                    id,
                    department: optional_text(department),
                })
                .collect(),
        ),
        EntityKind::Employees => {
            let names = frame.cells("name");
            let datetimes = frame.cells("datetime");
            let departments = frame.cells("department_id");
            let jobs = frame.cells("job_id");
            let mut employees = Vec::with_capacity(ids.len());
            for (row, &id) in ids.iter().enumerate() {
                employees.push(Employee {
                    id,
                    name: names.get(row).and_then(optional_text),
                    datetime: datetimes.get(row).and_then(optional_text),
                    department_id: optional_integer(departments.get(row), row, "department_id")?,
                    job_id: optional_integer(jobs.get(row), row, "job_id")?,
                });
            }
            Batch::Employees(employees)
        }
    };
    Ok(batch)
}

fn required_integer(cell: &Cell, row: usize, column: &str) -> Result<i64> {
    cell.as_integer().ok_or_else(|| not_projectable(cell, row, column))
}

// Absence is decided by the cell being null, never by its value: an explicit
// 0 stays 0.
fn optional_integer(cell: Option<&Cell>, row: usize, column: &str) -> Result<Option<i64>> {
    match cell {
        None | Some(Cell::Null) => Ok(None),
        Some(cell) => required_integer(cell, row, column).map(Some),
    }
}

fn optional_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Null => None,
        Cell::Text(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn not_projectable(cell: &Cell, row: usize, column: &str) -> Error {
    Error::ContentValidation {
        failures: vec![CellFailure {
            row,
            column: column.to_string(),
            message: format!("the value \"{cell}\" cannot be stored as an integer"),
        }],
    }
}
