//! Entity schema registry.
//!
//! Each [`EntityKind`] owns a fixed, ordered list of columns. The order is the
//! positional layout of the headerless upload file; the names are what the
//! store writes and what error payloads show to the caller.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::{error::Error, validators::Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Jobs,
    Departments,
    Employees,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Jobs,
        EntityKind::Departments,
        EntityKind::Employees,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Jobs => "jobs",
            EntityKind::Departments => "departments",
            EntityKind::Employees => "employees",
        }
    }

    pub fn schema(&self) -> &'static Schema {
        match self {
            EntityKind::Jobs => &JOBS,
            EntityKind::Departments => &DEPARTMENTS,
            EntityKind::Employees => &EMPLOYEES,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    /// Matching is exact: `EMPLOYEES` is not a known kind.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| Error::UnknownEntityKind(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub validator: Validator,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub kind: EntityKind,
    pub columns: &'static [ColumnSpec],
}

impl Schema {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.to_string()).collect()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Every column but the first, which is always the primary key `id`.
    pub fn value_columns(&self) -> &'static [ColumnSpec] {
        &self.columns[1..]
    }
}

const fn column(name: &'static str, validator: Validator) -> ColumnSpec {
    ColumnSpec { name, validator }
}

static JOBS: Schema = Schema {
    kind: EntityKind::Jobs,
    columns: &[
        column("id", Validator::IntegerLike),
        column("job", Validator::String),
    ],
};

static DEPARTMENTS: Schema = Schema {
    kind: EntityKind::Departments,
    columns: &[
        column("id", Validator::IntegerLike),
        column("department", Validator::String),
    ],
};

static EMPLOYEES: Schema = Schema {
    kind: EntityKind::Employees,
    columns: &[
        column("id", Validator::IntegerLike),
        column("name", Validator::String),
        column("datetime", Validator::IsoTimestamp),
        column("department_id", Validator::IntegerLikeOrNull),
        column("job_id", Validator::IntegerLikeOrNull),
    ],
};

/// Looks up the schema for an entity kind given as text.
pub fn get_schema(kind: &str) -> Result<&'static Schema, Error> {
    kind.parse::<EntityKind>().map(|kind| kind.schema())
}
