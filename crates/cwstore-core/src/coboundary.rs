//! # Coboundary Index
//!
//! Reverse adjacency: for every cell, the live cells that list it in their
//! boundary.
//!
//! The index is a derived cache built in one pass over the live cells. It is
//! never maintained incrementally: a structural mutation after a build makes
//! it stale, and callers rebuild before trusting coboundary-derived results.

use crate::cell::{Cell, CellLookup};
use crate::types::CellId;
use std::collections::{BTreeMap, BTreeSet};

/// Reverse-adjacency map plus the store generation it was built at.
#[derive(Debug, Clone, Default)]
pub struct CoboundaryIndex {
    cofaces: BTreeMap<CellId, BTreeSet<CellId>>,
    built_at: Option<u64>,
}

impl CoboundaryIndex {
    /// Create an empty, never-built index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from `owners`, skipping deleted owners and deleted boundary
    /// cells. `lookup` resolves boundary references, including ones owned by
    /// other stores.
    pub fn rebuild<'a, L: CellLookup + ?Sized>(
        &mut self,
        owners: impl IntoIterator<Item = &'a Cell>,
        lookup: &L,
        generation: u64,
    ) {
        self.cofaces.clear();
        for owner in owners {
            if owner.dimension() == 0 || owner.is_deleted() {
                continue;
            }
            for &face in owner.boundary() {
                let live = lookup.cell(face).is_some_and(Cell::is_live);
                if live {
                    self.cofaces.entry(face).or_default().insert(owner.id());
                }
            }
        }
        self.built_at = Some(generation);
    }

    /// Cells whose boundary contains `cell` at build time.
    #[must_use]
    pub fn cofaces(&self, cell: CellId) -> BTreeSet<CellId> {
        self.cofaces.get(&cell).cloned().unwrap_or_default()
    }

    /// True unless the index was built at `generation`.
    #[must_use]
    pub fn is_stale(&self, generation: u64) -> bool {
        self.built_at != Some(generation)
    }

    /// Total number of (face, coface) entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.cofaces.values().map(BTreeSet::len).sum()
    }
}

// =============================================================================
// TESTS
// =============================================================================
