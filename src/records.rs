//! Normalized records, one struct per entity kind.
//!
//! Records are plain data. How they are written is decided by the store,
//! which only needs the ordered column values from [`Batch::rows`].

use rusqlite::types::Value as SqlValue;
use serde::Serialize;

use crate::schema::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: i64,
    pub job: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Department {
    pub id: i64,
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    pub id: i64,
    pub name: Option<String>,
    pub datetime: Option<String>,
    pub department_id: Option<i64>,
    pub job_id: Option<i64>,
}

/// All records of one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", content = "records", rename_all = "lowercase")]
pub enum Batch {
    Jobs(Vec<Job>),
    Departments(Vec<Department>),
    Employees(Vec<Employee>),
}

impl Batch {
    pub fn kind(&self) -> EntityKind {
        match self {
            Batch::Jobs(_) => EntityKind::Jobs,
            Batch::Departments(_) => EntityKind::Departments,
            Batch::Employees(_) => EntityKind::Employees,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Batch::Jobs(rows) => rows.len(),
            Batch::Departments(rows) => rows.len(),
            Batch::Employees(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column values in schema order, primary key first.
    pub fn rows(&self) -> Vec<Vec<SqlValue>> {
        match self {
            Batch::Jobs(rows) => rows
                .iter()
                .map(|r| vec![SqlValue::Integer(r.id), text(&r.job)])
                .collect(),
            Batch::Departments(rows) => rows
                .iter()
                .map(|r| vec![SqlValue::Integer(r.id), text(&r.department)])
                .collect(),
            Batch::Employees(rows) => rows
                .iter()
                .map(|r| {
                    vec![
                        SqlValue::Integer(r.id),
                        text(&r.name),
                        text(&r.datetime),
                        integer(r.department_id),
                        integer(r.job_id),
                    ]
                })
                .collect(),
        }
    }
}

fn text(value: &Option<String>) -> SqlValue {
    value.clone().map_or(SqlValue::Null, SqlValue::Text)
}

fn integer(value: Option<i64>) -> SqlValue {
    value.map_or(SqlValue::Null, SqlValue::Integer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_rows_keep_schema_order_and_nulls() {
        let batch = Batch::Employees(vec![Employee {
            id: 4,
            name: Some("Ada".into()),
            datetime: None,
            department_id: Some(0),
            job_id: None,
        }]);
        assert_eq!(batch.kind(), EntityKind::Employees);
        assert_eq!(
            batch.rows(),
            vec![vec![
                SqlValue::Integer(4),
                SqlValue::Text("Ada".into()),
                SqlValue::Null,
                SqlValue::Integer(0),
                SqlValue::Null,
            ]]
        );
    }

    #[test]
    fn batch_serializes_with_entity_tag() {
        let batch = Batch::Jobs(vec![Job {
            id: 1,
            job: Some("engineer".into()),
        }]);
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["entity"], "jobs");
        assert_eq!(json["records"][0]["job"], "engineer");
    }
}
