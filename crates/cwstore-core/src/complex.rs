//! # Complex (the store)
//!
//! The store owns every cell it creates in an arena and keeps them in
//! dimension-indexed layers. All relations (boundaries, coboundaries,
//! atomizations) are held as `CellId`s; nothing is ever freed.
//!
//! This module defines the `Context` trait, the interface that collaborators
//! program against, and `Complex`, the in-memory implementation. The overlay
//! in [`crate::overlay`] is the other implementation.

use crate::cell::{BoundaryCheck, Cell, CellLookup};
use crate::coboundary::CoboundaryIndex;
use crate::types::{CellId, ComplexId, CwstoreError, Embedding, HandlerKey, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU32, Ordering};

// =============================================================================
// CONTEXT TRAIT
// =============================================================================

/// The operations exposed to collaborators of the store.
///
/// Coboundary-derived operations read the last built index; call
/// `build_coboundary` after mutating and before relying on them.
pub trait Context: CellLookup {
    /// Every cell of the layer, deleted ones included, in creation order.
    fn layer_cells(&self, dimension: usize) -> Vec<CellId>;

    /// Number of layers (highest dimension + 1).
    fn layer_count(&self) -> usize;

    /// True if the cell is visible through this context.
    fn contains(&self, id: CellId) -> bool {
        self.cell(id).is_some()
    }

    /// First live cell carrying `label`, scanning layers upward.
    fn cell_by_label(&self, label: &str) -> Result<CellId>;

    fn atoms_of(&self, expansion: CellId) -> BTreeSet<CellId>;

    fn expansions_of(&self, atom: CellId) -> BTreeSet<CellId>;

    /// Cells that listed `cell` in their boundary when the index was built.
    fn coboundary_of(&self, cell: CellId) -> BTreeSet<CellId>;

    /// True if a structural mutation happened after the last build.
    fn is_coboundary_stale(&self) -> bool;

    /// Clear and rebuild the coboundary index from live cells.
    fn build_coboundary(&mut self);

    /// Create a cell. An empty boundary creates a dimension-0 cell.
    fn create_cell(&mut self, label: &str, boundary: &[CellId]) -> Result<CellId>;

    /// Create an ordered listing cell (no minimality check).
    fn create_listing(&mut self, label: &str, boundary: &[CellId]) -> Result<CellId>;

    /// Find or create the 1-cell `label` between two 0-cells.
    fn link(&mut self, a: CellId, b: CellId, label: &str, oriented: bool) -> Result<CellId>;

    /// Register `atom` as an atomic name for `expansion`.
    fn create_atom_link(&mut self, expansion: CellId, atom: CellId) -> Result<()>;

    fn delete_atom_link(&mut self, expansion: CellId, atom: CellId) -> Result<()>;

    /// Soft-delete a cell.
    fn delete_cell(&mut self, id: CellId) -> Result<()>;

    /// Fails exactly when `delete_cell(id)` would, without mutating.
    fn require_deletable(&self, id: CellId) -> Result<()>;

    fn set_label(&mut self, id: CellId, label: &str) -> Result<()>;

    fn set_embedding(&mut self, id: CellId, embedding: Embedding) -> Result<()>;

    /// The single atom of `expansion`; fails on zero or several.
    fn atom_of(&self, expansion: CellId) -> Result<CellId> {
        single(expansion, "atom", self.atoms_of(expansion))
    }

    /// The single expansion of `atom`; fails on zero or several.
    fn expansion_of(&self, atom: CellId) -> Result<CellId> {
        single(atom, "expansion", self.expansions_of(atom))
    }

    /// Existing live 1-cell `label` over `(a, b)`, or `(b, a)` when not oriented.
    fn find_link(&self, a: CellId, b: CellId, label: &str, oriented: bool) -> Option<CellId> {
        self.layer_cells(1).into_iter().find(|&id| {
            self.cell(id).is_some_and(|cell| {
                cell.is_edge()
                    && cell.label() == label
                    && endpoints_match(cell.boundary(), a, b, oriented)
            })
        })
    }
}

fn single(cell: CellId, relation: &'static str, values: BTreeSet<CellId>) -> Result<CellId> {
    let mut iter = values.iter();
    match (iter.next(), iter.next()) {
        (Some(&only), None) => Ok(only),
        _ => Err(CwstoreError::Cardinality {
            cell,
            relation,
            count: values.len(),
        }),
    }
}

fn endpoints_match(boundary: &[CellId], a: CellId, b: CellId, oriented: bool) -> bool {
    match boundary {
        [first, second] => {
            (*first == a && *second == b) || (!oriented && *first == b && *second == a)
        }
        _ => false,
    }
}

/// Fail unless `cell` has dimension 0.
pub(crate) fn require_point(cell: &Cell) -> Result<()> {
    if cell.dimension() == 0 {
        Ok(())
    } else {
        Err(CwstoreError::DimensionMismatch {
            cell: cell.id(),
            expected: "0".to_string(),
            actual: cell.dimension(),
        })
    }
}

/// Fail unless `expansion` is compound and `atom` is a point.
pub(crate) fn require_atomizable(expansion: &Cell, atom: &Cell) -> Result<()> {
    if expansion.dimension() == 0 {
        return Err(CwstoreError::DimensionMismatch {
            cell: expansion.id(),
            expected: ">= 1".to_string(),
            actual: 0,
        });
    }
    require_point(atom)
}

// =============================================================================
// COMPLEX
// =============================================================================

static NEXT_COMPLEX_ID: AtomicU32 = AtomicU32::new(0);

/// The in-memory cell complex.
///
/// Uses `BTreeMap`/`BTreeSet` for every index so that iteration order is
/// deterministic.
#[derive(Debug, Clone)]
pub struct Complex {
    /// Process-unique id stamped into every `CellId` this store creates.
    id: ComplexId,

    /// Arena: slot `i` holds the cell with index `i`.
    cells: Vec<Cell>,

    /// Layer `d` lists the dimension-`d` cells in creation order.
    layers: Vec<Vec<CellId>>,

    /// Atomization: expansion -> atoms, and the inverse.
    atoms_of: BTreeMap<CellId, BTreeSet<CellId>>,
    expansions_of: BTreeMap<CellId, BTreeSet<CellId>>,

    coboundary: CoboundaryIndex,

    /// Bumped by every structural mutation.
    generation: u64,
}

impl Default for Complex {
    fn default() -> Self {
        Self::new()
    }
}

impl Complex {
    /// Create an empty complex with a fresh store id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ComplexId(NEXT_COMPLEX_ID.fetch_add(1, Ordering::Relaxed)),
            cells: Vec::new(),
            layers: Vec::new(),
            atoms_of: BTreeMap::new(),
            expansions_of: BTreeMap::new(),
            coboundary: CoboundaryIndex::new(),
            generation: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> ComplexId {
        self.id
    }

    /// Total number of cells, deleted ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells not soft-deleted.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_live()).count()
    }

    /// All cells in creation order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Number of registered (expansion, atom) pairs.
    #[must_use]
    pub fn atom_link_count(&self) -> usize {
        self.atoms_of.values().map(BTreeSet::len).sum()
    }

    /// Current structural generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Id the cell created `offset` insertions from now will receive.
    pub(crate) fn reserve_id(&self, offset: usize) -> CellId {
        CellId::new(self.id, self.cells.len().saturating_add(offset) as u32)
    }

    /// Attach or clear the evaluation handler of a cell.
    pub fn attach_handler(&mut self, id: CellId, handler: Option<HandlerKey>) -> Result<()> {
        self.owned_mut(id)?.set_handler(handler);
        Ok(())
    }

    /// Index of this store's cells, resolving boundary references through
    /// `lookup` (which may see cells of other stores).
    pub(crate) fn coboundary_index_with<L: CellLookup + ?Sized>(
        &self,
        lookup: &L,
    ) -> CoboundaryIndex {
        let mut index = CoboundaryIndex::new();
        index.rebuild(self.cells.iter(), lookup, self.generation);
        index
    }

    pub(crate) fn install_coboundary(&mut self, index: CoboundaryIndex) {
        tracing::debug!(
            complex = self.id.0,
            entries = index.entry_count(),
            "coboundary rebuilt"
        );
        self.coboundary = index;
    }

    /// Record an atomization pair without resolving either cell.
    pub(crate) fn register_atom_link(&mut self, expansion: CellId, atom: CellId) -> Result<()> {
        let atoms = self.atoms_of.entry(expansion).or_default();
        if !atoms.insert(atom) {
            return Err(CwstoreError::DuplicateAtomLink { expansion, atom });
        }
        self.expansions_of.entry(atom).or_default().insert(expansion);
        Ok(())
    }

    /// Construct a cell against `lookup` without inserting it.
    pub(crate) fn construct<L: CellLookup + ?Sized>(
        &self,
        id: CellId,
        label: &str,
        boundary: &[CellId],
        check: BoundaryCheck,
        lookup: &L,
    ) -> Result<Cell> {
        if boundary.is_empty() && check == BoundaryCheck::Full {
            return Ok(Cell::from_label(id, label));
        }
        Cell::build(id, label.to_string(), boundary, lookup, check)
    }

    /// Insert a constructed cell. Its id must be the next free slot.
    pub(crate) fn insert(&mut self, cell: Cell) -> Result<CellId> {
        let id = cell.id();
        if id != self.reserve_id(0) {
            return Err(CwstoreError::Unsupported("out-of-order cell insertion"));
        }
        let dimension = cell.dimension();
        while self.layers.len() <= dimension {
            self.layers.push(Vec::new());
        }
        self.layers[dimension].push(id);
        self.cells.push(cell);
        self.generation = self.generation.saturating_add(1);
        Ok(id)
    }

    fn create_checked(
        &mut self,
        label: &str,
        boundary: &[CellId],
        check: BoundaryCheck,
    ) -> Result<CellId> {
        let cell = self.construct(self.reserve_id(0), label, boundary, check, &*self)?;
        self.insert(cell)
    }

    fn owned_mut(&mut self, id: CellId) -> Result<&mut Cell> {
        if id.complex != self.id {
            return Err(CwstoreError::CellNotFound(id));
        }
        self.cells
            .get_mut(id.index as usize)
            .ok_or(CwstoreError::CellNotFound(id))
    }

    /// True if this store created the cell.
    #[must_use]
    pub fn owns(&self, id: CellId) -> bool {
        self.cell(id).is_some()
    }
}

impl CellLookup for Complex {
    fn cell(&self, id: CellId) -> Option<&Cell> {
        if id.complex != self.id {
            return None;
        }
        self.cells.get(id.index as usize)
    }
}

impl Context for Complex {
    fn layer_cells(&self, dimension: usize) -> Vec<CellId> {
        self.layers.get(dimension).cloned().unwrap_or_default()
    }

    fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn cell_by_label(&self, label: &str) -> Result<CellId> {
        self.layers
            .iter()
            .flatten()
            .copied()
            .find(|&id| {
                self.cell(id)
                    .is_some_and(|cell| cell.is_live() && cell.label() == label)
            })
            .ok_or_else(|| CwstoreError::LabelNotFound(label.to_string()))
    }

    fn atoms_of(&self, expansion: CellId) -> BTreeSet<CellId> {
        self.atoms_of.get(&expansion).cloned().unwrap_or_default()
    }

    fn expansions_of(&self, atom: CellId) -> BTreeSet<CellId> {
        self.expansions_of.get(&atom).cloned().unwrap_or_default()
    }

    fn coboundary_of(&self, cell: CellId) -> BTreeSet<CellId> {
        if self.coboundary.is_stale(self.generation) {
            tracing::warn!(
                complex = self.id.0,
                %cell,
                "coboundary read from a stale index; call build_coboundary after mutating"
            );
        }
        self.coboundary.cofaces(cell)
    }

    fn is_coboundary_stale(&self) -> bool {
        self.coboundary.is_stale(self.generation)
    }

    fn build_coboundary(&mut self) {
        let index = self.coboundary_index_with(&*self);
        self.install_coboundary(index);
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
        if let Some(existing) = self.find_link(a, b, label, oriented) {
            return Ok(existing);
        }
        self.create_cell(label, &[a, b])
    }

    fn create_atom_link(&mut self, expansion: CellId, atom: CellId) -> Result<()> {
        require_atomizable(self.resolve(expansion)?, self.resolve(atom)?)?;
        self.register_atom_link(expansion, atom)
    }

    fn delete_atom_link(&mut self, _expansion: CellId, _atom: CellId) -> Result<()> {
        Err(CwstoreError::Unsupported(
            "physical atom-link deletion at the store level",
        ))
    }

    fn delete_cell(&mut self, id: CellId) -> Result<()> {
        let cell = self.owned_mut(id)?;
        if cell.is_live() {
            cell.mark_deleted();
            self.generation = self.generation.saturating_add(1);
        }
        Ok(())
    }

    fn require_deletable(&self, id: CellId) -> Result<()> {
        if self.owns(id) {
            Ok(())
        } else {
            Err(CwstoreError::CellNotFound(id))
        }
    }

    fn set_label(&mut self, id: CellId, label: &str) -> Result<()> {
        self.owned_mut(id)?.set_label(label.to_string());
        Ok(())
    }

    fn set_embedding(&mut self, id: CellId, embedding: Embedding) -> Result<()> {
        self.owned_mut(id)?.set_embedding(embedding);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_cells_fills_layers() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        cw.create_cell("ab", &[a, b]).expect("ab");

        assert_eq!(cw.layer_cells(0).len(), 2);
        assert_eq!(cw.layer_cells(1).len(), 1);
        assert!(cw.layer_cells(7).is_empty());
        assert_eq!(cw.layer_count(), 2);
    }

    #[test]
    fn create_cell_never_deduplicates() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        let first = cw.create_cell("is", &[a, b]).expect("first");
        let second = cw.create_cell("is", &[a, b]).expect("second");
        assert_ne!(first, second);
        assert_eq!(cw.layer_cells(1).len(), 2);
    }

    #[test]
    fn link_deduplicates_unoriented() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");

        let ab = cw.link(a, b, "", false).expect("link");
        assert_eq!(cw.layer_cells(1).len(), 1);

        assert_eq!(cw.link(a, b, "", false).expect("again"), ab);
        assert_eq!(cw.link(b, a, "", false).expect("reversed"), ab);
        assert_eq!(cw.layer_cells(1).len(), 1);

        let ba = cw.link(b, a, "", true).expect("oriented");
        assert_ne!(ba, ab);
        assert_eq!(cw.layer_cells(1).len(), 2);

        cw.link(a, b, "x", false).expect("x");
        cw.link(a, b, "y", false).expect("y");
        assert_eq!(cw.layer_cells(1).len(), 4);
    }

    #[test]
    fn oriented_link_is_idempotent() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");

        let ab = cw.link(a, b, "is", true).expect("link");
        assert_eq!(cw.layer_cells(1).len(), 1);
        for _ in 0..3 {
            assert_eq!(cw.link(a, b, "is", true).expect("again"), ab);
            assert_eq!(cw.layer_cells(1).len(), 1);
        }

        let ba = cw.link(b, a, "is", true).expect("reversed");
        assert_ne!(ba, ab);
        assert_eq!(cw.layer_cells(1).len(), 2);
        assert_eq!(cw.link(b, a, "is", true).expect("reversed again"), ba);
        assert_eq!(cw.layer_cells(1).len(), 2);
    }

    #[test]
    fn link_requires_points() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        let ab = cw.create_cell("ab", &[a, b]).expect("ab");
        let result = cw.link(ab, a, "", false);
        assert!(matches!(
            result,
            Err(CwstoreError::DimensionMismatch { actual: 1, .. })
        ));
    }

    #[test]
    fn link_ignores_deleted_edges() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        let ab = cw.link(a, b, "is", true).expect("link");
        cw.delete_cell(ab).expect("delete");
        let fresh = cw.link(a, b, "is", true).expect("relink");
        assert_ne!(fresh, ab);
    }

    #[test]
    fn cell_by_label_finds_one_of_duplicates() {
        let mut cw = Complex::new();
        let a1 = cw.create_cell("a", &[]).expect("a1");
        let a2 = cw.create_cell("a", &[]).expect("a2");
        cw.create_cell("b", &[]).expect("b");

        let found = cw.cell_by_label("a").expect("found");
        assert!(found == a1 || found == a2);
        assert_eq!(
            cw.cell_by_label("zzz"),
            Err(CwstoreError::LabelNotFound("zzz".to_string()))
        );
    }

    #[test]
    fn cell_by_label_skips_deleted() {
        let mut cw = Complex::new();
        let a1 = cw.create_cell("a", &[]).expect("a1");
        let a2 = cw.create_cell("a", &[]).expect("a2");
        cw.delete_cell(a1).expect("delete");
        assert_eq!(cw.cell_by_label("a"), Ok(a2));
    }

    #[test]
    fn atomization() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        let ab_atom = cw.create_cell("ab_atom", &[]).expect("atom");
        let ab = cw.create_cell("ab", &[a, b]).expect("ab");
        cw.create_atom_link(ab, ab_atom).expect("atom link");

        assert_eq!(cw.expansions_of(ab_atom), BTreeSet::from([ab]));
        assert_eq!(cw.atoms_of(ab), BTreeSet::from([ab_atom]));
        assert_eq!(cw.atom_of(ab), Ok(ab_atom));
        assert_eq!(cw.expansion_of(ab_atom), Ok(ab));

        assert_eq!(
            cw.create_atom_link(ab, ab_atom),
            Err(CwstoreError::DuplicateAtomLink {
                expansion: ab,
                atom: ab_atom
            })
        );
    }

    #[test]
    fn multiple_atomizations_fail_only_the_single_accessor() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        let atom1 = cw.create_cell("ab_atom1", &[]).expect("atom1");
        let atom2 = cw.create_cell("ab_atom2", &[]).expect("atom2");
        let ab = cw.create_cell("ab", &[a, b]).expect("ab");
        cw.create_atom_link(ab, atom1).expect("link1");
        cw.create_atom_link(ab, atom2).expect("link2");

        assert_eq!(cw.atoms_of(ab), BTreeSet::from([atom1, atom2]));
        assert_eq!(cw.atom_link_count(), 2);
        assert_eq!(
            cw.atom_of(ab),
            Err(CwstoreError::Cardinality {
                cell: ab,
                relation: "atom",
                count: 2
            })
        );
        assert!(matches!(
            cw.expansion_of(a),
            Err(CwstoreError::Cardinality { count: 0, .. })
        ));
    }

    #[test]
    fn atom_link_checks_dimensions() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        let ab = cw.create_cell("ab", &[a, b]).expect("ab");
        assert!(cw.create_atom_link(a, b).is_err());
        assert!(cw.create_atom_link(ab, ab).is_err());
    }

    #[test]
    fn physical_atom_link_deletion_is_unsupported() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        let ab = cw.create_cell("ab", &[a, b]).expect("ab");
        let atom = cw.create_cell("atom", &[]).expect("atom");
        cw.create_atom_link(ab, atom).expect("link");
        assert!(matches!(
            cw.delete_atom_link(ab, atom),
            Err(CwstoreError::Unsupported(_))
        ));
        assert_eq!(cw.atom_of(ab), Ok(atom));
    }

    #[test]
    fn coboundary_after_build() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        let c = cw.create_cell("c", &[]).expect("c");
        let ab = cw.create_cell("ab", &[a, b]).expect("ab");
        cw.build_coboundary();

        assert_eq!(cw.coboundary_of(a), BTreeSet::from([ab]));
        assert_eq!(cw.coboundary_of(b), BTreeSet::from([ab]));
        assert!(cw.coboundary_of(c).is_empty());
    }

    #[test]
    fn coboundary_is_stale_until_rebuilt() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        cw.build_coboundary();
        assert!(!cw.is_coboundary_stale());

        let ab = cw.create_cell("ab", &[a, b]).expect("ab");
        assert!(cw.is_coboundary_stale());
        assert!(cw.coboundary_of(a).is_empty());

        cw.build_coboundary();
        assert_eq!(cw.coboundary_of(a), BTreeSet::from([ab]));

        cw.delete_cell(ab).expect("delete");
        assert!(cw.is_coboundary_stale());
        cw.build_coboundary();
        assert!(cw.coboundary_of(a).is_empty());
    }

    #[test]
    fn deleted_cell_stays_in_layer() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        cw.delete_cell(a).expect("delete");
        assert_eq!(cw.layer_cells(0), vec![a]);
        assert_eq!(cw.live_count(), 0);
        assert_eq!(cw.len(), 1);
        assert_eq!(
            cw.cell(a).map(|cell| cell.display_label().into_owned()),
            Some("[DELETED] a".to_string())
        );
    }

    #[test]
    fn foreign_ids_are_not_found() {
        let mut one = Complex::new();
        let mut two = Complex::new();
        let a = one.create_cell("a", &[]).expect("a");
        let b = two.create_cell("b", &[]).expect("b");

        assert!(!two.contains(a));
        assert_eq!(two.delete_cell(a), Err(CwstoreError::CellNotFound(a)));
        assert_eq!(
            two.create_cell("ab", &[a, b]),
            Err(CwstoreError::UnknownCell(a))
        );
    }

    #[test]
    fn failed_construction_leaves_store_untouched() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        let c = cw.create_cell("c", &[]).expect("c");
        let before = cw.len();
        let generation = cw.generation();

        assert!(cw.create_cell("abc", &[a, b, c]).is_err());
        assert_eq!(cw.len(), before);
        assert_eq!(cw.generation(), generation);
        assert_eq!(cw.layer_cells(1).len(), 0);
    }

    #[test]
    fn label_and_embedding_mutation() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        cw.set_label(a, "renamed").expect("label");
        cw.set_embedding(a, Embedding::pair(1.0, 0.5)).expect("embedding");
        let cell = cw.cell(a).expect("cell");
        assert_eq!(cell.label(), "renamed");
        assert_eq!(cell.embedding().as_pair(), Some((1.0, 0.5)));
    }
}
