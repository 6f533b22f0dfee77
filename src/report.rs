//! Hiring reports computed directly from the store.
//!
//! Both reports read current table contents on every call. Hire dates are the
//! employees' `datetime` strings, interpreted by SQLite's date functions; a
//! value that is not a real instant yields no year and is never counted in a
//! year-filtered total.

use log::info;
use rusqlite::params;
use serde::Serialize;

use crate::{
    error::{Error, Result, StoreError},
    store::Store,
};

pub const REPORT_YEAR: i32 = 2021;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarterlyHires {
    pub department: String,
    pub job: String,
    #[serde(rename = "Q1")]
    pub q1: i64,
    #[serde(rename = "Q2")]
    pub q2: i64,
    #[serde(rename = "Q3")]
    pub q3: i64,
    #[serde(rename = "Q4")]
    pub q4: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentHires {
    pub id: i64,
    pub department: String,
    pub hired: i64,
}

const QUARTERLY_SQL: &str = "
WITH hires AS (
    SELECT d.department AS department,
           j.job AS job,
           (CAST(strftime('%m', e.datetime) AS INTEGER) + 2) / 3 AS quarter
    FROM employees e
    JOIN departments d ON d.id = e.department_id
    JOIN jobs j ON j.id = e.job_id
    WHERE CAST(strftime('%Y', e.datetime) AS INTEGER) = ?1
)
SELECT COALESCE(department, ''),
       COALESCE(job, ''),
       SUM(CASE WHEN quarter = 1 THEN 1 ELSE 0 END),
       SUM(CASE WHEN quarter = 2 THEN 1 ELSE 0 END),
       SUM(CASE WHEN quarter = 3 THEN 1 ELSE 0 END),
       SUM(CASE WHEN quarter = 4 THEN 1 ELSE 0 END)
FROM hires
GROUP BY department, job
ORDER BY department, job
";

/// Hires per (department, job) in each calendar quarter of `year`.
pub fn quarterly_hires(store: &Store, year: i32) -> Result<Vec<QuarterlyHires>> {
    let mut stmt = store
        .connection()
        .prepare(QUARTERLY_SQL)
        .map_err(StoreError::from)?;
    let rows = stmt
        .query_map(params![year], |row| {
            Ok(QuarterlyHires {
                department: row.get(0)?,
                job: row.get(1)?,
                q1: row.get(2)?,
                q2: row.get(3)?,
                q3: row.get(4)?,
                q4: row.get(5)?,
            })
        })
        .map_err(StoreError::from)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)?;
    info!("Quarterly report for {year}: {} row(s)", rows.len());
    Ok(rows)
}

const HIRES_IN_YEAR_SQL: &str = "
SELECT e.department_id, COUNT(*)
FROM employees e
JOIN departments d ON d.id = e.department_id
WHERE CAST(strftime('%Y', e.datetime) AS INTEGER) = ?1
GROUP BY e.department_id
";

const HIRES_ABOVE_SQL: &str = "
SELECT d.id, COALESCE(d.department, ''), COUNT(*) AS hired
FROM employees e
JOIN departments d ON d.id = e.department_id
GROUP BY d.id, d.department
HAVING COUNT(*) > ?1
ORDER BY hired DESC, d.id
";

/// Per-department hire counts restricted to `year`, for departments with at
/// least one hire that year.
pub fn department_hires_in_year(store: &Store, year: i32) -> Result<Vec<(i64, i64)>> {
    let mut stmt = store
        .connection()
        .prepare(HIRES_IN_YEAR_SQL)
        .map_err(StoreError::from)?;
    let counts = stmt
        .query_map(params![year], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(StoreError::from)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)?;
    Ok(counts)
}

/// Arithmetic mean of the per-department counts; `None` when there are none.
pub fn average_hires(counts: &[(i64, i64)]) -> Option<f64> {
    if counts.is_empty() {
        return None;
    }
    let total: i64 = counts.iter().map(|(_, count)| count).sum();
    Some(total as f64 / counts.len() as f64)
}

/// Departments whose all-time hire count is strictly above `threshold`.
pub fn departments_hiring_above(store: &Store, threshold: f64) -> Result<Vec<DepartmentHires>> {
    let mut stmt = store
        .connection()
        .prepare(HIRES_ABOVE_SQL)
        .map_err(StoreError::from)?;
    let rows = stmt
        .query_map(params![threshold], |row| {
            Ok(DepartmentHires {
                id: row.get(0)?,
                department: row.get(1)?,
                hired: row.get(2)?,
            })
        })
        .map_err(StoreError::from)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)?;
    Ok(rows)
}

/// Departments whose all-time hires exceed the mean of per-department hires
/// in `year`.
///
/// The threshold is year-restricted while the compared totals are not; the
/// two passes are kept separate for that reason.
pub fn above_average_hiring(store: &Store, year: i32) -> Result<Vec<DepartmentHires>> {
    let counts = department_hires_in_year(store, year)?;
    let average = average_hires(&counts).ok_or(Error::InsufficientData)?;
    info!(
        "Average hires per department in {year}: {average:.2} across {} department(s)",
        counts.len()
    );
    let rows = departments_hiring_above(store, average)?;
    info!("{} department(s) hired above the {year} average", rows.len());
    Ok(rows)
}
