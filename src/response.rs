//! Boundary translation of results into HTTP-style responses.
//!
//! Validation-side failures become 400 responses with a structured body the
//! caller can act on. Store failures become a generic 500; the engine detail
//! only reaches the log.

use chrono::{SecondsFormat, Utc};
use log::error;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{error::Error, schema::EntityKind};

pub const UPLOAD_FAILURE: &str = "Upload Failure";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

/// Upload acknowledgment.
#[derive(Debug, Clone, Serialize)]
pub struct UploadAck {
    pub message: &'static str,
    pub entity: EntityKind,
    pub rows: usize,
    pub received_at: String,
}

impl UploadAck {
    pub fn new(entity: EntityKind, rows: usize) -> Self {
        Self {
            message: "File uploaded correctly",
            entity,
            rows,
            received_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

pub fn error_response(err: &Error) -> Response {
    let (status, detail) = match err {
        Error::UnsupportedFormat { .. } => (
            400,
            json!("The file format is not allowed, please use CSV files!"),
        ),
        Error::UnknownEntityKind(_) | Error::EmptyInput | Error::InsufficientData => {
            (400, json!(err.to_string()))
        }
        Error::MalformedInput { reason } => (
            400,
            json!({
                "status": UPLOAD_FAILURE,
                "error_message": "Parsing error reading the CSV file, please verify the file content!",
                "reason": reason,
            }),
        ),
        Error::SchemaMismatch { expected, found } => (
            400,
            json!({
                "status": UPLOAD_FAILURE,
                "error_message": "The file provided doesn't match the expected schema!",
                "suggestion": format!(
                    "Please provide file with the following schema: {expected:?}"
                ),
                "expected_columns": expected,
                "found_columns": found,
            }),
        ),
        Error::ContentValidation { failures } => (
            400,
            json!({
                "status": UPLOAD_FAILURE,
                "content_validation_error": failures,
            }),
        ),
        Error::Store(store_err) => {
            error!("Store failure: {store_err}");
            (500, json!("Internal store error, the operation was not applied"))
        }
    };
    Response {
        status,
        body: json!({ "detail": detail }),
    }
}

/// Translates an error that escaped a command handler. Anything that is not
/// part of the ingestion taxonomy is an internal failure reported by its
/// message.
pub fn from_anyhow(err: &anyhow::Error) -> Response {
    match err.chain().find_map(|cause| cause.downcast_ref::<Error>()) {
        Some(known) => error_response(known),
        None => Response {
            status: 500,
            body: json!({ "detail": format!("{err:#}") }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CellFailure, StoreError};

    #[test]
    fn validation_failures_list_every_cell() {
        let err = Error::ContentValidation {
            failures: vec![
                CellFailure {
                    row: 0,
                    column: "id".into(),
                    message: "bad".into(),
                },
                CellFailure {
                    row: 2,
                    column: "id".into(),
                    message: "worse".into(),
                },
            ],
        };
        let response = error_response(&err);
        assert_eq!(response.status, 400);
        let list = &response.body["detail"]["content_validation_error"];
        assert_eq!(list.as_array().unwrap().len(), 2);
        assert_eq!(list[1]["row"], 2);
        assert_eq!(list[1]["column"], "id");
        assert_eq!(response.body["detail"]["status"], UPLOAD_FAILURE);
    }

    #[test]
    fn schema_mismatch_suggests_expected_columns() {
        let response = error_response(&Error::SchemaMismatch {
            expected: vec!["id".into(), "job".into()],
            found: 3,
        });
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body["detail"]["expected_columns"],
            json!(["id", "job"])
        );
        assert_eq!(
            response.body["detail"]["suggestion"],
            "Please provide file with the following schema: [\"id\", \"job\"]"
        );
    }

    #[test]
    fn flat_messages_for_simple_rejections() {
        let response = error_response(&Error::UnknownEntityKind("X".into()));
        assert_eq!(response.body["detail"], "File type: 'X' is not valid file");
        let response = error_response(&Error::InsufficientData);
        assert_eq!(response.status, 400);
        assert!(response.is_client_error());
    }

    #[test]
    fn store_errors_hide_engine_detail() {
        let err = Error::Store(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows));
        let response = error_response(&err);
        assert_eq!(response.status, 500);
        let detail = response.body["detail"].as_str().unwrap();
        assert!(!detail.contains("Query returned no rows"));
    }

    #[test]
    fn unknown_errors_are_internal() {
        let err = anyhow::anyhow!("disk on fire");
        let response = from_anyhow(&err);
        assert_eq!(response.status, 500);
        assert_eq!(response.body["detail"], "disk on fire");

        let wrapped = anyhow::Error::new(Error::EmptyInput).context("Uploading jobs.csv");
        assert_eq!(from_anyhow(&wrapped).status, 400);
    }
}
