//! Error types for record normalization and graph writes.

use thiserror::Error;

/// A record that cannot be imported as-is. The line is logged and skipped.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Not valid JSON, or a field with the wrong type.
    #[error("Invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The line parsed, but is not a JSON object.
    #[error("Record is not a JSON object")]
    NotAnObject,

    /// A field needed to derive an identity key is absent or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Graph-side failure that is not a transport error.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A relationship write found no `Person` node to attach to.
    #[error("Person {0} not found in graph; relationship not written")]
    PersonNotFound(String),
}
