//! # Innate Primitives
//!
//! Fixed vocabulary and constants of the store.
//!
//! Rules are encoded as ordinary cells; the labels below are the reserved
//! words the rewrite engine looks for when it reads a rule back out of the
//! store.

/// Pattern label that matches any label of the same dimension.
pub const WILDCARD_LABEL: &str = "Any";

/// Link from a rule cell to a pattern placeholder.
pub const PATTERN_SCAFFOLD_LABEL: &str = "pattern_scaffold";

/// Listing cell holding the ordered pattern.
pub const PATTERN_LABEL: &str = "pattern";

/// Link from a rule cell to a product placeholder.
pub const PRODUCT_SCAFFOLD_LABEL: &str = "product_scaffold";

/// Listing cell holding the ordered product.
pub const PRODUCT_LABEL: &str = "product";

/// Cell binding a pattern cell to its replacement-side counterpart.
pub const BIND_LABEL: &str = "bind";

/// Marker label ignored when reading the target of a bind cell.
pub const NOBIND_LABEL: &str = "nobind";

/// Prefix of the presented label of a soft-deleted cell.
pub const DELETED_PREFIX: &str = "[DELETED] ";

/// Embedding returned by a boundary query that finds no evidence:
/// frequency 0.5 (no bias), confidence 0.
pub const PRIOR_TRUTH: [f64; 2] = [0.5, 0.0];

/// Default evidential horizon `k` of the truth-value formula.
pub const DEFAULT_HORIZON: f64 = 1.0;

/// Maximum number of endpoints of a 1-cell.
pub const MAX_EDGE_ENDPOINTS: usize = 2;
