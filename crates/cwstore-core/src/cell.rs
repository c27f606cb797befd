//! # Cells
//!
//! A cell is a node of the complex. Dimension-0 cells are atomic; a cell of
//! dimension `n >= 1` is built from an ordered boundary of cells of lower
//! dimension, and its dimension is one more than the highest boundary element.
//!
//! ## Construction invariants
//!
//! Checked before a cell is handed to any store; a failed check never leaves a
//! partially built cell behind.
//!
//! - A 1-cell has at most two boundary elements.
//! - For dimension >= 2 the zero-cell closures of the boundary elements form a
//!   single connected component.
//! - For dimension >= 2 the boundary is minimal: no boundary element is a
//!   sub-structure of another one. Listing cells skip this check only.

use crate::dsu::DisjointSet;
use crate::primitives::{DELETED_PREFIX, MAX_EDGE_ENDPOINTS};
use crate::types::{CellId, CwstoreError, Embedding, HandlerKey, Result};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// LOOKUP TRAIT
// =============================================================================

/// Read access to cells by id.
///
/// Implemented by every store and view that can resolve boundary references.
pub trait CellLookup {
    /// Resolve a cell id.
    fn cell(&self, id: CellId) -> Option<&Cell>;

    /// Resolve a cell id or fail with `UnknownCell`.
    fn resolve(&self, id: CellId) -> Result<&Cell> {
        self.cell(id).ok_or(CwstoreError::UnknownCell(id))
    }
}

impl CellLookup for BTreeMap<CellId, Cell> {
    fn cell(&self, id: CellId) -> Option<&Cell> {
        self.get(&id)
    }
}

/// Which boundary checks a construction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCheck {
    /// Arity, connectivity and minimality.
    Full,
    /// Arity and connectivity; used for ordered listings.
    ConnectivityOnly,
}

// =============================================================================
// CELL
// =============================================================================

/// A node of the complex.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    id: CellId,
    dimension: usize,
    label: String,
    boundary: Vec<CellId>,
    zero_cells: BTreeSet<CellId>,
    deleted: bool,
    embedding: Embedding,
    handler: Option<HandlerKey>,
}

impl Cell {
    /// Create a dimension-0 cell. Its closure is itself.
    #[must_use]
    pub fn from_label(id: CellId, label: impl Into<String>) -> Self {
        Self {
            id,
            dimension: 0,
            label: label.into(),
            boundary: Vec::new(),
            zero_cells: BTreeSet::from([id]),
            deleted: false,
            embedding: Embedding::empty(),
            handler: None,
        }
    }

    /// Create a compound cell, running every boundary check.
    pub fn from_boundary<L: CellLookup + ?Sized>(
        id: CellId,
        label: impl Into<String>,
        boundary: &[CellId],
        lookup: &L,
    ) -> Result<Self> {
        Self::build(id, label.into(), boundary, lookup, BoundaryCheck::Full)
    }

    /// Create an ordered listing cell (arity and connectivity checks only).
    pub fn listing<L: CellLookup + ?Sized>(
        id: CellId,
        label: impl Into<String>,
        boundary: &[CellId],
        lookup: &L,
    ) -> Result<Self> {
        Self::build(
            id,
            label.into(),
            boundary,
            lookup,
            BoundaryCheck::ConnectivityOnly,
        )
    }

    /// Create a compound cell with the given check level.
    pub fn build<L: CellLookup + ?Sized>(
        id: CellId,
        label: String,
        boundary: &[CellId],
        lookup: &L,
        check: BoundaryCheck,
    ) -> Result<Self> {
        if boundary.is_empty() {
            return Err(CwstoreError::EmptyBoundary { label });
        }

        let faces = boundary
            .iter()
            .map(|&b| lookup.resolve(b))
            .collect::<Result<Vec<_>>>()?;

        let dimension = faces
            .iter()
            .map(|face| face.dimension)
            .max()
            .unwrap_or(0)
            .saturating_add(1);

        let zero_cells = faces
            .iter()
            .flat_map(|face| face.zero_cells.iter().copied())
            .collect();

        if dimension == 1 {
            if boundary.len() > MAX_EDGE_ENDPOINTS {
                return Err(CwstoreError::TooManyEndpoints {
                    label,
                    count: boundary.len(),
                });
            }
        } else {
            check_connected(&label, &faces)?;
            if check == BoundaryCheck::Full {
                check_minimal(&label, &faces, lookup)?;
            }
        }

        Ok(Self {
            id,
            dimension,
            label,
            boundary: boundary.to_vec(),
            zero_cells,
            deleted: false,
            embedding: Embedding::empty(),
            handler: None,
        })
    }

    /// The cell's identity.
    #[must_use]
    pub fn id(&self) -> CellId {
        self.id
    }

    /// 0 for points, otherwise one more than the highest boundary element.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The raw label, without the deletion prefix.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The label as presented to users: prefixed when the cell is deleted.
    #[must_use]
    pub fn display_label(&self) -> Cow<'_, str> {
        if self.deleted {
            Cow::Owned(format!("{DELETED_PREFIX}{}", self.label))
        } else {
            Cow::Borrowed(&self.label)
        }
    }

    /// The ordered boundary; empty for points.
    #[must_use]
    pub fn boundary(&self) -> &[CellId] {
        &self.boundary
    }

    /// The dimension-0 cells reachable by expanding boundaries.
    #[must_use]
    pub fn zero_cells(&self) -> &BTreeSet<CellId> {
        &self.zero_cells
    }

    /// True once the cell has been soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// True unless the cell has been soft-deleted.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.deleted
    }

    /// The opaque payload; a `[frequency, confidence]` pair on evidence edges.
    #[must_use]
    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }

    /// Key of the attached evaluation handler, if any.
    #[must_use]
    pub fn handler(&self) -> Option<&HandlerKey> {
        self.handler.as_ref()
    }

    /// True for a live 1-cell with exactly two endpoints.
    #[must_use]
    pub fn is_edge(&self) -> bool {
        self.dimension == 1 && self.boundary.len() == MAX_EDGE_ENDPOINTS && !self.deleted
    }

    pub(crate) fn set_label(&mut self, label: String) {
        self.label = label;
    }

    pub(crate) fn set_embedding(&mut self, embedding: Embedding) {
        self.embedding = embedding;
    }

    pub(crate) fn set_handler(&mut self, handler: Option<HandlerKey>) {
        self.handler = handler;
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}

// =============================================================================
// BOUNDARY CHECKS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Vertex {
    Zero(CellId),
    Face(usize),
}

/// Union-find over the closure: every face joins the zero-cells it covers,
/// then all faces must share one root.
fn check_connected(label: &str, faces: &[&Cell]) -> Result<()> {
    let mut dsu = DisjointSet::new();
    for (position, face) in faces.iter().enumerate() {
        dsu.insert(Vertex::Face(position));
        for &zero in &face.zero_cells {
            dsu.insert(Vertex::Zero(zero));
            dsu.union(Vertex::Face(position), Vertex::Zero(zero));
        }
    }

    for (position, face) in faces.iter().enumerate().skip(1) {
        if !dsu.connected(Vertex::Face(0), Vertex::Face(position)) {
            return Err(CwstoreError::DisconnectedBoundary {
                label: label.to_string(),
                offender: face.id,
            });
        }
    }
    Ok(())
}

/// Paint the sub-structure of each face with that face's color; reaching
/// another face while painting is a conflict. A face listed twice contains
/// itself and is a conflict too.
fn check_minimal<L: CellLookup + ?Sized>(label: &str, faces: &[&Cell], lookup: &L) -> Result<()> {
    let mut colors: BTreeSet<CellId> = BTreeSet::new();
    for face in faces {
        if !colors.insert(face.id) {
            return Err(CwstoreError::NonMinimalBoundary {
                label: label.to_string(),
                contained: face.id,
                container: face.id,
            });
        }
    }
    let floor = faces.iter().map(|face| face.dimension).min().unwrap_or(0);

    let mut paint: BTreeMap<CellId, usize> = BTreeMap::new();
    for (color, face) in faces.iter().enumerate() {
        let mut stack: Vec<CellId> = face.boundary.clone();
        while let Some(id) = stack.pop() {
            if paint.get(&id) == Some(&color) {
                continue;
            }
            paint.insert(id, color);

            if colors.contains(&id) {
                return Err(CwstoreError::NonMinimalBoundary {
                    label: label.to_string(),
                    contained: id,
                    container: face.id,
                });
            }

            let cell = lookup.resolve(id)?;
            if cell.dimension > floor {
                stack.extend(cell.boundary.iter().copied());
            }
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
