//! # Overlay Context
//!
//! A mutable patch store layered over a read-only base context.
//!
//! - Reads return the union of patch and base.
//! - `link` reuses a matching base edge before looking in the patch.
//! - Every creation lands in the patch; patch cells may reference base cells.
//! - Base cells can be read and referenced but never deleted, relabeled or
//!   re-embedded through the overlay (`ShadowingUnsupported`).
//!
//! Cell ids carry their store id, so patch and base ids never collide and a
//! lookup simply tries the patch first.

use crate::cell::{BoundaryCheck, Cell, CellLookup};
use crate::complex::{Complex, Context, require_atomizable, require_point};
use crate::types::{CellId, CwstoreError, Embedding, Result};
use std::collections::BTreeSet;

/// Patch-over-base composition.
pub struct Overlay<'a, B: Context + ?Sized> {
    patch: &'a mut Complex,
    base: &'a B,
}

impl<'a, B: Context + ?Sized> Overlay<'a, B> {
    #[must_use]
    pub fn new(patch: &'a mut Complex, base: &'a B) -> Self {
        Self { patch, base }
    }

    #[must_use]
    pub fn patch(&self) -> &Complex {
        &*self.patch
    }

    #[must_use]
    pub fn base(&self) -> &B {
        self.base
    }

    fn create_checked(
        &mut self,
        label: &str,
        boundary: &[CellId],
        check: BoundaryCheck,
    ) -> Result<CellId> {
        let id = self.patch.reserve_id(0);
        let cell = self.patch.construct(id, label, boundary, check, &*self)?;
        self.patch.insert(cell)
    }

    /// Fail for cells that only the base owns.
    fn require_patch_owned(&self, id: CellId) -> Result<()> {
        if self.patch.owns(id) {
            Ok(())
        } else if self.base.contains(id) {
            Err(CwstoreError::ShadowingUnsupported { what: "cell", cell: id })
        } else {
            Err(CwstoreError::CellNotFound(id))
        }
    }
}

impl<B: Context + ?Sized> CellLookup for Overlay<'_, B> {
    fn cell(&self, id: CellId) -> Option<&Cell> {
        self.patch.cell(id).or_else(|| self.base.cell(id))
    }
}

impl<B: Context + ?Sized> Context for Overlay<'_, B> {
    fn layer_cells(&self, dimension: usize) -> Vec<CellId> {
        let mut cells = self.base.layer_cells(dimension);
        cells.extend(self.patch.layer_cells(dimension));
        cells
    }

    fn layer_count(&self) -> usize {
        self.base.layer_count().max(self.patch.layer_count())
    }

    fn cell_by_label(&self, label: &str) -> Result<CellId> {
        (0..self.layer_count())
            .flat_map(|dimension| self.layer_cells(dimension))
            .find(|&id| {
                self.cell(id)
                    .is_some_and(|cell| cell.is_live() && cell.label() == label)
            })
            .ok_or_else(|| CwstoreError::LabelNotFound(label.to_string()))
    }

    fn atoms_of(&self, expansion: CellId) -> BTreeSet<CellId> {
        let mut atoms = self.base.atoms_of(expansion);
        atoms.extend(self.patch.atoms_of(expansion));
        atoms
    }

    fn expansions_of(&self, atom: CellId) -> BTreeSet<CellId> {
        let mut expansions = self.base.expansions_of(atom);
        expansions.extend(self.patch.expansions_of(atom));
        expansions
    }

    fn coboundary_of(&self, cell: CellId) -> BTreeSet<CellId> {
        let mut cofaces = self.base.coboundary_of(cell);
        cofaces.extend(self.patch.coboundary_of(cell));
        cofaces
    }

    fn is_coboundary_stale(&self) -> bool {
        self.base.is_coboundary_stale() || self.patch.is_coboundary_stale()
    }

    /// Rebuilds the patch index only; the base is read-only.
    fn build_coboundary(&mut self) {
        let index = self.patch.coboundary_index_with(&*self);
        self.patch.install_coboundary(index);
    }

    fn create_cell(&mut self, label: &str, boundary: &[CellId]) -> Result<CellId> {
        self.create_checked(label, boundary, BoundaryCheck::Full)
    }

    fn create_listing(&mut self, label: &str, boundary: &[CellId]) -> Result<CellId> {
        self.create_checked(label, boundary, BoundaryCheck::ConnectivityOnly)
    }

    fn link(&mut self, a: CellId, b: CellId, label: &str, oriented: bool) -> Result<CellId> {
        require_point(self.resolve(a)?)?;
        require_point(self.resolve(b)?)?;
        if let Some(existing) = self.base.find_link(a, b, label, oriented) {
            return Ok(existing);
        }
        if let Some(existing) = self.patch.find_link(a, b, label, oriented) {
            return Ok(existing);
        }
        self.create_cell(label, &[a, b])
    }

    fn create_atom_link(&mut self, expansion: CellId, atom: CellId) -> Result<()> {
        require_atomizable(self.resolve(expansion)?, self.resolve(atom)?)?;
        if self.base.atoms_of(expansion).contains(&atom) {
            return Err(CwstoreError::DuplicateAtomLink { expansion, atom });
        }
        self.patch.register_atom_link(expansion, atom)
    }

    fn delete_atom_link(&mut self, expansion: CellId, atom: CellId) -> Result<()> {
        if self.base.atoms_of(expansion).contains(&atom) {
            return Err(CwstoreError::ShadowingUnsupported {
                what: "atom link",
                cell: expansion,
            });
        }
        self.patch.delete_atom_link(expansion, atom)
    }

    fn delete_cell(&mut self, id: CellId) -> Result<()> {
        self.require_patch_owned(id)?;
        self.patch.delete_cell(id)
    }

    fn require_deletable(&self, id: CellId) -> Result<()> {
        self.require_patch_owned(id)
    }

    fn set_label(&mut self, id: CellId, label: &str) -> Result<()> {
        self.require_patch_owned(id)?;
        self.patch.set_label(id, label)
    }

    fn set_embedding(&mut self, id: CellId, embedding: Embedding) -> Result<()> {
        self.require_patch_owned(id)?;
        self.patch.set_embedding(id, embedding)
    }
}

// =============================================================================
// TESTS
// =============================================================================
