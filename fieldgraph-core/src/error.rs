//! Error types for schema definition and record operations.

use std::fmt;

use thiserror::Error;

use crate::graph::FieldName;

/// Errors raised while defining a record type.
///
/// Any of these makes the record type unusable: no schema is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field was declared more than once.
    #[error("field '{0}' is declared more than once")]
    DuplicateField(FieldName),

    /// A field was given more than one computation.
    #[error("field '{0}' already has a computation")]
    DuplicateComputation(FieldName),

    /// A computation reads a field that the record does not declare.
    #[error("computed field '{field}' depends on unknown field '{dep}'")]
    UnknownDependency {
        /// The computed field.
        field: FieldName,
        /// The undeclared dependency.
        dep: FieldName,
    },

    /// The dependencies form a cycle.
    ///
    /// Each field in `cycle` depends on the one after it; the first and last
    /// entries are the same field.
    #[error("cyclic dependency: {}", Joined(.cycle, " -> "))]
    CyclicDependency {
        /// The offending cycle.
        cycle: Vec<FieldName>,
    },

    /// A field marked as required is not declared.
    #[error("required field '{0}' is not declared")]
    UnknownRequiredField(FieldName),

    /// A computed field was marked as required.
    #[error("computed field '{0}' cannot be required")]
    RequiredComputedField(FieldName),

    /// A record type with this name already exists in the catalog.
    #[error("record type '{0}' is already defined")]
    AlreadyDefined(String),
}

/// Errors raised by the validation layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An attribute key does not name a declared field.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// Required fields were not supplied.
    #[error("required fields missing: {}", Joined(.0, ", "))]
    RequiredFieldMissing(Vec<FieldName>),
}

/// Errors raised by a computation body.
#[derive(Debug, Error)]
pub enum ComputeError {
    /// A declared dependency has no value.
    #[error("input '{0}' has no value")]
    MissingInput(FieldName),

    /// The body asked for a field it did not declare.
    #[error("'{0}' is not a declared dependency")]
    UndeclaredInput(String),

    /// The body itself failed.
    #[error(transparent)]
    Failed(Box<dyn std::error::Error + Send + Sync>),
}

impl ComputeError {
    /// Wrap an arbitrary error raised by a computation body.
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Failed(err.into())
    }

    /// Create a failure from a message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::Failed(message.to_string().into())
    }
}

/// Errors raised by `create`, `update` and `put`.
///
/// A failed call never produces a record, and the record it was called on
/// stays valid.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Computed fields were assigned while the record type forbids it.
    #[error("computed fields cannot be assigned directly: {}", Joined(.fields, ", "))]
    ComputedFieldAssignment {
        /// Every offending field, in the order they were supplied.
        fields: Vec<FieldName>,
    },

    /// The validation layer rejected the attributes.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A computation body failed.
    #[error("failed to compute '{field}': {source}")]
    Computation {
        /// The field whose computation failed.
        field: FieldName,
        /// The body's error.
        #[source]
        source: ComputeError,
    },

    /// The record belongs to another record type.
    #[error("record of type '{found}' passed to record type '{expected}'")]
    SchemaMismatch {
        /// The record type the call was made on.
        expected: String,
        /// The record's own type.
        found: String,
    },

    /// Fields could not be put in dependency order.
    ///
    /// Graph validation rules this out; seeing it means the graph is
    /// internally inconsistent.
    #[error("internal error: no schedulable order for {}", Joined(.pending, ", "))]
    Unschedulable {
        /// The fields left unscheduled.
        pending: Vec<FieldName>,
    },
}

impl RecordError {
    /// Get the error raised by the computation body, if that is the cause.
    pub fn compute_error(&self) -> Option<&ComputeError> {
        match self {
            Self::Computation { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Displays a list of field names with a separator.
struct Joined<'a>(&'a [FieldName], &'static str);

impl fmt::Display for Joined<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(self.1)?;
            }
            write!(f, "{}", name)?;
        }
        Ok(())
    }
}
