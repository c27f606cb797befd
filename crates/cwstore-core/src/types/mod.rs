//! # Core Type Definitions
//!
//! This module contains the shared types of the cell-complex store:
//! - Store and cell identifiers (`ComplexId`, `CellId`)
//! - The opaque cell payload (`Embedding`)
//! - Evaluation capability keys (`HandlerKey`)
//! - Error types (`CwstoreError`)
//!
//! ## Identity
//!
//! Cells are compared by identity only. A `CellId` names the store that owns
//! the cell plus the cell's slot in that store's arena, so ids coming from two
//! different stores (an overlay's base and patch) never collide.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Process-unique identifier of a store (complex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ComplexId(pub u32);

/// Identifier of a cell: owning store plus arena slot.
///
/// Ordering is by store, then by creation order within the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId {
    /// The store that owns the cell.
    pub complex: ComplexId,
    /// Slot in the owning store's arena.
    pub index: u32,
}

impl CellId {
    /// Create a new cell id.
    #[must_use]
    pub const fn new(complex: ComplexId, index: u32) -> Self {
        Self { complex, index }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.complex.0, self.index)
    }
}

/// Key under which an evaluation handler is registered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandlerKey(pub String);

impl HandlerKey {
    /// Create a new handler key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// EMBEDDING
// =============================================================================

/// Opaque numeric payload attached to a cell.
///
/// The store never interprets it. Inference and resolution read a two-element
/// embedding as `[frequency, confidence]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Embedding(pub Vec<f64>);

impl Embedding {
    /// An empty payload.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A `[frequency, confidence]` payload.
    #[must_use]
    pub fn pair(frequency: f64, confidence: f64) -> Self {
        Self(vec![frequency, confidence])
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the payload has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The components as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Read the payload as a `(frequency, confidence)` pair.
    ///
    /// Returns `None` unless the payload has exactly two components.
    #[must_use]
    pub fn as_pair(&self) -> Option<(f64, f64)> {
        match self.0.as_slice() {
            [f, c] => Some((*f, *c)),
            _ => None,
        }
    }
}

impl From<Vec<f64>> for Embedding {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the store.
///
/// - No silent failures
/// - Construction errors never leave a partially built cell behind
/// - Library code never panics; every failure is a variant here
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CwstoreError {
    /// A compound cell was requested with no boundary.
    #[error("boundary of '{label}' is empty")]
    EmptyBoundary { label: String },

    /// A boundary, link or query referenced a cell the context cannot see.
    #[error("unknown cell {0}")]
    UnknownCell(CellId),

    /// A 1-cell was given more than two endpoints.
    #[error("1-cell '{label}' cannot be connected with {count} 0-cells")]
    TooManyEndpoints { label: String, count: usize },

    /// The closures of the boundary elements do not form one component.
    #[error("closure of '{label}' is not connected at boundary element {offender}")]
    DisconnectedBoundary { label: String, offender: CellId },

    /// A boundary element is a sub-structure of another boundary element.
    #[error("boundary of '{label}' is not minimal: {contained} is contained in {container}")]
    NonMinimalBoundary {
        label: String,
        contained: CellId,
        container: CellId,
    },

    /// No live cell carries the label.
    #[error("no cell labeled '{0}'")]
    LabelNotFound(String),

    /// The cell id is not owned by this store.
    #[error("cell {0} not found")]
    CellNotFound(CellId),

    /// A cell had the wrong dimension for the operation.
    #[error("cell {cell} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        cell: CellId,
        expected: String,
        actual: usize,
    },

    /// A single-valued accessor found zero or several values.
    #[error("expected exactly one {relation} of {cell}, found {count}")]
    Cardinality {
        cell: CellId,
        relation: &'static str,
        count: usize,
    },

    /// The atomization pair is already registered.
    #[error("atom link {expansion} ~> {atom} already exists")]
    DuplicateAtomLink { expansion: CellId, atom: CellId },

    /// The subcomplex does not match the rule's pattern.
    #[error("pattern matching failed: {0}")]
    PatternMismatch(String),

    /// The rule's scaffolding is inconsistent.
    #[error("malformed rule {rule}: {reason}")]
    MalformedRule { rule: CellId, reason: String },

    /// More than one evidence cell answers a boundary query.
    #[error("ambiguous '{label}' evidence: {first} and {second}")]
    Ambiguous {
        label: String,
        first: CellId,
        second: CellId,
    },

    /// A resolution policy did not reduce the number of candidates.
    #[error("resolution of '{label}' did not reduce {candidates} candidates")]
    ResolutionStalled { label: String, candidates: usize },

    /// Two cells handed to a resolution policy are not duplicates.
    #[error("cells {0} and {1} are not duplicate evidence")]
    NotDuplicates(CellId, CellId),

    /// A cell's payload is not a `[frequency, confidence]` pair.
    #[error("cell {0} carries no truth value")]
    MissingTruthValue(CellId),

    /// The evidential horizon must be finite and positive.
    #[error("evidential horizon must be finite and positive, got {0}")]
    InvalidHorizon(f64),

    /// The operation is not supported by the store.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// The overlay was asked to alter something that only exists in its base.
    #[error("shadowing of base {what} {cell} is not supported")]
    ShadowingUnsupported { what: &'static str, cell: CellId },

    /// The cell has no evaluation handler attached.
    #[error("cell {0} has no evaluation handler")]
    NoHandler(CellId),

    /// No handler is registered under the key.
    #[error("no handler registered under '{0}'")]
    UnknownHandler(String),

    /// A handler reported a failure.
    #[error("handler '{key}' failed: {message}")]
    Handler { key: String, message: String },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CwstoreError>;

// =============================================================================
// TESTS
// =============================================================================
