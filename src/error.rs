//! Error types shared across coercion, validation and execution.

use std::fmt;

use derive_more::{Display, Error, From};
use serde::Serialize;

use crate::executor::path::ResponsePath;
use crate::parser::SourcePosition;

/// One source location attached to an error, in 1-based line/column form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl From<SourcePosition> for Location {
    fn from(pos: SourcePosition) -> Self {
        Location {
            line: pos.line() as u32 + 1,
            column: pos.column() as u32 + 1,
        }
    }
}

/// A validation-rule error: user reportable unless it is [`RuleError::secondary`]
/// and a primary error exists elsewhere in the same validation run.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
#[display("{message}")]
pub struct RuleError {
    message: String,
    locations: Vec<SourcePosition>,
    secondary: bool,
}

impl RuleError {
    pub fn new(message: impl Into<String>, locations: &[SourcePosition]) -> Self {
        RuleError {
            message: message.into(),
            locations: locations.to_vec(),
            secondary: false,
        }
    }

    pub fn secondary(message: impl Into<String>, locations: &[SourcePosition]) -> Self {
        RuleError {
            message: message.into(),
            locations: locations.to_vec(),
            secondary: true,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn locations(&self) -> &[SourcePosition] {
        &self.locations
    }

    pub fn is_secondary(&self) -> bool {
        self.secondary
    }
}

impl PartialOrd for RuleError {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RuleError {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.locations, &self.message).cmp(&(&other.locations, &other.message))
    }
}

/// An error produced by a user resolver, or synthesized by the executor
/// (cancellation, null-for-non-null bubbling).
#[derive(Clone, Debug, Display, Error)]
#[display("{message}")]
pub struct FieldError {
    message: String,
    extensions: Option<serde_json::Value>,
    #[error(not(source))]
    source: Option<std::sync::Arc<dyn std::error::Error + Send + Sync>>,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        FieldError {
            message: message.into(),
            extensions: None,
            source: None,
        }
    }

    pub fn with_extensions(message: impl Into<String>, extensions: serde_json::Value) -> Self {
        FieldError {
            message: message.into(),
            extensions: Some(extensions),
            source: None,
        }
    }

    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FieldError {
            message: err.to_string(),
            extensions: None,
            source: Some(std::sync::Arc::new(err)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn extensions(&self) -> Option<&serde_json::Value> {
        self.extensions.as_ref()
    }

    /// The field that synthesizes the fixed null-bubbling message (see spec §7).
    pub(crate) fn null_for_non_null() -> Self {
        FieldError::new("Cannot return null for non-nullable field.")
    }

    pub(crate) fn cancelled() -> Self {
        FieldError::new("Request was cancelled.")
    }
}

/// One entry in the response error list.
#[derive(Clone, Debug)]
pub struct ExecutionError {
    pub error: FieldError,
    pub locations: Vec<Location>,
    pub path: ResponsePath,
}

impl ExecutionError {
    pub fn new(error: FieldError, locations: Vec<Location>, path: ResponsePath) -> Self {
        ExecutionError {
            error,
            locations,
            path,
        }
    }
}

impl PartialEq for ExecutionError {
    fn eq(&self, other: &Self) -> bool {
        self.error.message() == other.error.message()
            && self.locations == other.locations
            && self.path == other.path
    }
}

impl PartialOrd for ExecutionError {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExecutionError {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.locations, self.error.message()).cmp(&(&other.locations, other.error.message()))
    }
}
impl Eq for ExecutionError {}

impl Serialize for ExecutionError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("message", self.error.message())?;
        if !self.locations.is_empty() {
            map.serialize_entry("locations", &self.locations)?;
        }
        if !self.path.is_empty() {
            map.serialize_entry("path", &self.path.to_vec())?;
        }
        if let Some(ext) = self.error.extensions() {
            map.serialize_entry("extensions", ext)?;
        }
        map.end()
    }
}

/// Top-level request failure: the document could not be executed at all
/// (unknown operation name, ambiguous anonymous operation, wrong root kind).
#[derive(Clone, Debug, Display, Error, From)]
pub enum GraphQLError<'a> {
    #[display("Unknown operation \"{_0}\"")]
    UnknownOperationName(#[error(not(source))] &'a str),
    #[display("Must provide operation name if query contains multiple operations")]
    MultipleOperationsProvided,
    #[display("Unknown operation")]
    NoOperationProvided,
    #[display("{_0}")]
    IsSubscription(#[error(not(source))] &'static str),
    #[display("{_0}")]
    IsNotSubscription(#[error(not(source))] &'static str),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
