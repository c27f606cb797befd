//! # cwstore-core
//!
//! The cell-complex knowledge store - THE ENGINE.
//!
//! Knowledge is held as a cell complex: dimension-0 cells are atomic
//! entities, and a cell of dimension `n` is built from an ordered boundary of
//! lower-dimension cells. On top of the store sit three engines:
//!
//! - construction-time invariant checking (arity, connectivity, minimality),
//! - a rebuildable coboundary (reverse adjacency) index,
//! - a transactional pattern-matching and rewrite engine driven by rules that
//!   are themselves stored as cells,
//!
//! plus evidence-based inference over directed "is-a" edges and conflict
//! resolution for duplicate evidence.
//!
//! ## Architectural Constraints
//!
//! - Single-threaded, synchronous, no I/O
//! - Cells are addressed by `CellId`, never by pointer
//! - Deletion is logical only
//! - Deterministic iteration (`BTreeMap`/`BTreeSet`)

// =============================================================================
// MODULES
// =============================================================================

pub mod cell;
pub mod coboundary;
pub mod complex;
pub mod dsu;
pub mod eval;
pub mod inference;
pub mod overlay;
pub mod primitives;
pub mod resolve;
pub mod rewrite;
pub mod rules;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CellId, ComplexId, CwstoreError, Embedding, HandlerKey, Result};

// =============================================================================
// RE-EXPORTS: Store
// =============================================================================

pub use cell::{BoundaryCheck, Cell, CellLookup};
pub use coboundary::CoboundaryIndex;
pub use complex::{Complex, Context};
pub use overlay::Overlay;

// =============================================================================
// RE-EXPORTS: Engines
// =============================================================================

pub use eval::{EvalContext, HandlerRegistry, TaskHandler, TruthHandler};
pub use inference::{Inference, TruthValue};
pub use resolve::{
    Choice, PolicyKind, RandomPolicy, ResolutionPolicy, Revision, choice, query_boundary,
    query_boundary_resolving, random_resolution, revise, revision,
};
pub use rewrite::{Rewrite, RewriteEngine};
pub use rules::{LabelPattern, Rule, RuleBuilder, transitive_rule};
