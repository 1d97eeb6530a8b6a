//! Validation diagnostics.

use std::fmt;

use thiserror::Error;

use crate::catalog::EntityKind;

/// One reason a payload failed one variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer to the offending field (`""` for the payload itself).
    pub path: String,
    /// What the field table accepts at `path`.
    pub expected: String,
    /// What the payload holds at `path` (`missing` when absent).
    pub actual: String,
    /// The underlying validator message.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "(root)" } else { &self.path };
        write!(
            f,
            "{path}: expected {}, got {} ({})",
            self.expected, self.actual, self.message
        )
    }
}

/// Every violation recorded against one variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantFailure {
    pub variant: String,
    pub violations: Vec<Violation>,
}

impl fmt::Display for VariantFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  variant {}:", self.variant)?;
        for v in &self.violations {
            write!(f, "\n    {v}")?;
        }
        Ok(())
    }
}

fn render_failures(failures: &[VariantFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A payload matched none of the variants declared for its kind.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("payload matches no {kind} variant:\n{}", render_failures(.failures))]
    NoVariantMatched {
        kind: EntityKind,
        failures: Vec<VariantFailure>,
    },

    #[error("no schema variants registered for {0}")]
    NoVariants(EntityKind),
}

impl ValidationError {
    /// Per-variant failures, in the order variants were tried.
    pub fn failures(&self) -> &[VariantFailure] {
        match self {
            ValidationError::NoVariantMatched { failures, .. } => failures,
            ValidationError::NoVariants(_) => &[],
        }
    }

    /// Whether any variant failed on the field at `path`.
    pub fn mentions_path(&self, path: &str) -> bool {
        self.failures()
            .iter()
            .flat_map(|f| &f.violations)
            .any(|v| v.path == path)
    }
}

/// Errors from building or running a validator.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A field table did not compile into a usable JSON Schema.
    #[error("schema {kind}/{variant} does not compile: {reason}")]
    Compile {
        kind: EntityKind,
        variant: String,
        reason: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
