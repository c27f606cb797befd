//! # Rules
//!
//! Rewrite rules are stored in the complex as ordinary cells:
//!
//! - a rule cell (dimension 0);
//! - one `pattern_scaffold` 1-cell `[rule, placeholder]` per pattern point;
//! - one `pattern` listing: `[scaffolds.., pattern cells..]`;
//! - `bind` cells tying a pattern cell to its replacement-side counterpart;
//! - optionally `product_scaffold` links and a `product` listing of the cells
//!   to create.
//!
//! [`Rule::compile`] reads that structure back once and turns every pattern
//! label into a [`LabelPattern`]; [`RuleBuilder`] writes it.

use crate::cell::Cell;
use crate::complex::Context;
use crate::primitives::{
    BIND_LABEL, NOBIND_LABEL, PATTERN_LABEL, PATTERN_SCAFFOLD_LABEL, PRODUCT_LABEL,
    PRODUCT_SCAFFOLD_LABEL, WILDCARD_LABEL,
};
use crate::types::{CellId, CwstoreError, Result};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// LABEL PATTERNS
// =============================================================================

/// A compiled pattern label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelPattern {
    /// Matches only this label.
    Exact(String),
    /// Matches any label.
    Any,
}

impl LabelPattern {
    /// Compile a stored label; the wildcard label becomes `Any`.
    #[must_use]
    pub fn compile(label: &str) -> Self {
        if label == WILDCARD_LABEL {
            Self::Any
        } else {
            Self::Exact(label.to_string())
        }
    }

    #[must_use]
    pub fn matches(&self, label: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected == label,
        }
    }
}

// =============================================================================
// COMPILED RULE
// =============================================================================

/// One position of the pattern list.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternSlot {
    /// The pattern cell in the store.
    pub template: CellId,
    pub dimension: usize,
    pub label: LabelPattern,
    /// Replacement-side cell the matched cell stands for, if bound.
    /// Unbound matched cells are deleted.
    pub binds_to: Option<CellId>,
}

/// Shape of a replacement-side cell, enough to instantiate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub label: String,
    pub dimension: usize,
    pub boundary: Vec<CellId>,
}

impl Template {
    fn of(cell: &Cell) -> Self {
        Self {
            label: cell.label().to_string(),
            dimension: cell.dimension(),
            boundary: cell.boundary().to_vec(),
        }
    }
}

/// A rule read out of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    cell: CellId,
    points: usize,
    pattern: Vec<PatternSlot>,
    product: Vec<CellId>,
    templates: BTreeMap<CellId, Template>,
}

impl Rule {
    /// Read the rule rooted at `rule` from `ctx`.
    ///
    /// Relies on the coboundary index; build it after defining the rule.
    pub fn compile<C: Context + ?Sized>(ctx: &C, rule: CellId) -> Result<Self> {
        ctx.resolve(rule)?;
        let malformed = |reason: String| CwstoreError::MalformedRule { rule, reason };

        let cofaces = ctx.coboundary_of(rule);
        let scaffolds = labeled(ctx, &cofaces, PATTERN_SCAFFOLD_LABEL);
        if scaffolds.is_empty() {
            return Err(malformed("no pattern scaffold".to_string()));
        }
        let pattern_cell = listing_of(ctx, &scaffolds, PATTERN_LABEL).map_err(malformed)?;
        let pattern_list = pattern_cell
            .boundary()
            .get(scaffolds.len()..)
            .filter(|list| !list.is_empty())
            .ok_or_else(|| malformed("pattern lists no cells".to_string()))?;

        let pattern = pattern_list
            .iter()
            .map(|&template| compile_slot(ctx, template).map_err(&malformed))
            .collect::<Result<Vec<_>>>()?;

        let product_scaffolds = labeled(ctx, &cofaces, PRODUCT_SCAFFOLD_LABEL);
        let product = if product_scaffolds.is_empty() {
            Vec::new()
        } else {
            let product_cell =
                listing_of(ctx, &product_scaffolds, PRODUCT_LABEL).map_err(malformed)?;
            product_cell
                .boundary()
                .get(product_scaffolds.len()..)
                .unwrap_or_default()
                .to_vec()
        };
        let templates = collect_templates(ctx, &product)?;

        tracing::debug!(
            %rule,
            points = scaffolds.len(),
            pattern = pattern.len(),
            product = product.len(),
            "rule compiled"
        );

        Ok(Self {
            cell: rule,
            points: scaffolds.len(),
            pattern,
            product,
            templates,
        })
    }

    /// The rule cell.
    #[must_use]
    pub fn cell(&self) -> CellId {
        self.cell
    }

    /// Number of dimension-0 cells a matching subcomplex carries.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points
    }

    #[must_use]
    pub fn pattern(&self) -> &[PatternSlot] {
        &self.pattern
    }

    /// Replacement-side cells to instantiate unless bound.
    #[must_use]
    pub fn product(&self) -> &[CellId] {
        &self.product
    }

    /// Shape of a replacement-side cell reachable from the product.
    #[must_use]
    pub fn template(&self, id: CellId) -> Option<&Template> {
        self.templates.get(&id)
    }
}

/// Live cofaces carrying `label`, in id order.
fn labeled<C: Context + ?Sized>(ctx: &C, cofaces: &BTreeSet<CellId>, label: &str) -> Vec<CellId> {
    cofaces
        .iter()
        .copied()
        .filter(|&id| {
            ctx.cell(id)
                .is_some_and(|cell| cell.is_live() && cell.label() == label)
        })
        .collect()
}

/// The single listing that every scaffold belongs to.
fn listing_of<'a, C: Context + ?Sized>(
    ctx: &'a C,
    scaffolds: &[CellId],
    label: &str,
) -> std::result::Result<&'a Cell, String> {
    let mut owner: Option<CellId> = None;
    for &scaffold in scaffolds {
        let cofaces = ctx.coboundary_of(scaffold);
        let mut iter = cofaces.iter().copied();
        let (Some(listing), None) = (iter.next(), iter.next()) else {
            return Err(format!(
                "scaffold {scaffold} must belong to exactly one {label} listing, found {}",
                cofaces.len()
            ));
        };
        match owner {
            Some(previous) if previous != listing => {
                return Err(format!("scaffolds point to two {label} listings"));
            }
            _ => owner = Some(listing),
        }
    }
    let listing = owner
        .and_then(|id| ctx.cell(id))
        .ok_or_else(|| format!("no {label} listing"))?;
    if listing.label() != label {
        return Err(format!(
            "expected a {label} listing, found '{}'",
            listing.label()
        ));
    }
    Ok(listing)
}

fn compile_slot<C: Context + ?Sized>(
    ctx: &C,
    template: CellId,
) -> std::result::Result<PatternSlot, String> {
    let cell = ctx
        .cell(template)
        .ok_or_else(|| format!("pattern references unknown cell {template}"))?;

    let binds = labeled(ctx, &ctx.coboundary_of(template), BIND_LABEL);
    let binds_to = match binds.as_slice() {
        [] => None,
        [bind] => Some(bind_target(ctx, *bind, cell)?),
        _ => return Err(format!("pattern cell {template} has {} binds", binds.len())),
    };

    Ok(PatternSlot {
        template,
        dimension: cell.dimension(),
        label: LabelPattern::compile(cell.label()),
        binds_to,
    })
}

/// The element of a bind's boundary that is neither a bind marker nor the
/// pattern cell itself.
fn bind_target<C: Context + ?Sized>(
    ctx: &C,
    bind: CellId,
    pattern: &Cell,
) -> std::result::Result<CellId, String> {
    let bind_cell = ctx
        .cell(bind)
        .ok_or_else(|| format!("unknown bind {bind}"))?;
    if bind_cell.dimension() != pattern.dimension().saturating_add(1) {
        return Err(format!(
            "bind {bind} has dimension {}, expected {}",
            bind_cell.dimension(),
            pattern.dimension().saturating_add(1)
        ));
    }
    let targets: Vec<CellId> = bind_cell
        .boundary()
        .iter()
        .copied()
        .filter(|&id| id != pattern.id())
        .filter(|&id| {
            ctx.cell(id)
                .is_some_and(|c| c.label() != BIND_LABEL && c.label() != NOBIND_LABEL)
        })
        .collect();
    match targets.as_slice() {
        [target] => Ok(*target),
        _ => Err(format!("bind {bind} has {} targets", targets.len())),
    }
}

/// Templates of the product cells and everything below them.
fn collect_templates<C: Context + ?Sized>(
    ctx: &C,
    product: &[CellId],
) -> Result<BTreeMap<CellId, Template>> {
    let mut templates = BTreeMap::new();
    let mut stack: Vec<CellId> = product.to_vec();
    while let Some(id) = stack.pop() {
        if templates.contains_key(&id) {
            continue;
        }
        let cell = ctx.resolve(id)?;
        stack.extend(cell.boundary().iter().copied());
        templates.insert(id, Template::of(cell));
    }
    Ok(templates)
}

// =============================================================================
// RULE BUILDER
// =============================================================================

/// Writes a rule's scaffolding into a store.
///
/// Pattern cells are listed in the order they are added; a subcomplex passed
/// to the rewrite engine must follow the same order.
pub struct RuleBuilder<'a, C: Context + ?Sized> {
    ctx: &'a mut C,
    rule: CellId,
    pattern_points: Vec<CellId>,
    pattern: Vec<CellId>,
    product_points: Vec<CellId>,
    product: Vec<CellId>,
    binds: BTreeMap<CellId, CellId>,
}

impl<'a, C: Context + ?Sized> RuleBuilder<'a, C> {
    /// Create the rule cell.
    pub fn new(ctx: &'a mut C, name: &str) -> Result<Self> {
        let rule = ctx.create_cell(name, &[])?;
        Ok(Self {
            ctx,
            rule,
            pattern_points: Vec::new(),
            pattern: Vec::new(),
            product_points: Vec::new(),
            product: Vec::new(),
            binds: BTreeMap::new(),
        })
    }

    /// A dimension-0 pattern placeholder; `"Any"` matches every label.
    pub fn pattern_point(&mut self, label: &str) -> Result<CellId> {
        let point = self.ctx.create_cell(label, &[])?;
        self.pattern_points.push(point);
        self.pattern.push(point);
        Ok(point)
    }

    /// A compound pattern cell.
    pub fn pattern_cell(&mut self, label: &str, boundary: &[CellId]) -> Result<CellId> {
        let cell = self.ctx.create_cell(label, boundary)?;
        self.pattern.push(cell);
        Ok(cell)
    }

    /// A replacement-side point that is only ever bound, never created.
    pub fn replacement_point(&mut self, label: &str) -> Result<CellId> {
        let point = self.ctx.create_cell(label, &[])?;
        self.product_points.push(point);
        Ok(point)
    }

    /// A replacement-side cell that is only ever bound, never created.
    pub fn replacement(&mut self, label: &str, boundary: &[CellId]) -> Result<CellId> {
        self.ctx.create_cell(label, boundary)
    }

    /// A replacement-side point the rule creates when applied.
    pub fn produce_point(&mut self, label: &str) -> Result<CellId> {
        let point = self.replacement_point(label)?;
        self.product.push(point);
        Ok(point)
    }

    /// A replacement-side cell the rule creates when applied.
    pub fn produce(&mut self, label: &str, boundary: &[CellId]) -> Result<CellId> {
        let cell = self.ctx.create_cell(label, boundary)?;
        self.product.push(cell);
        Ok(cell)
    }

    /// Bind `pattern` to `replacement`: a match of `pattern` is kept and
    /// stands for `replacement` in the product.
    ///
    /// Binds of compound cells also list the binds of their boundary, which
    /// must therefore be bound first.
    pub fn bind(&mut self, pattern: CellId, replacement: CellId) -> Result<CellId> {
        let mut boundary = vec![pattern, replacement];
        let faces = self.ctx.resolve(pattern)?.boundary().to_vec();
        for face in faces {
            if let Some(&bind) = self.binds.get(&face)
                && !boundary.contains(&bind)
            {
                boundary.push(bind);
            }
        }
        let bind = self.ctx.create_cell(BIND_LABEL, &boundary)?;
        self.binds.insert(pattern, bind);
        Ok(bind)
    }

    /// Write the scaffolds and listings; returns the rule cell.
    pub fn finish(self) -> Result<CellId> {
        let Self {
            ctx,
            rule,
            pattern_points,
            pattern,
            product_points,
            product,
            ..
        } = self;

        if pattern_points.is_empty() {
            return Err(CwstoreError::MalformedRule {
                rule,
                reason: "a rule needs at least one pattern point".to_string(),
            });
        }
        write_listing(ctx, rule, PATTERN_SCAFFOLD_LABEL, PATTERN_LABEL, &pattern_points, &pattern)?;
        if !product_points.is_empty() {
            write_listing(ctx, rule, PRODUCT_SCAFFOLD_LABEL, PRODUCT_LABEL, &product_points, &product)?;
        }
        Ok(rule)
    }
}

fn write_listing<C: Context + ?Sized>(
    ctx: &mut C,
    rule: CellId,
    scaffold_label: &str,
    listing_label: &str,
    points: &[CellId],
    cells: &[CellId],
) -> Result<CellId> {
    let mut listing = Vec::with_capacity(points.len().saturating_add(cells.len()));
    for &point in points {
        listing.push(ctx.create_cell(scaffold_label, &[rule, point])?);
    }
    listing.extend_from_slice(cells);
    ctx.create_listing(listing_label, &listing)
}

/// Define `A label B, B label C => A label C` in `ctx`.
///
/// The pattern order is `[A, B, C, (A label B), (B label C)]`.
pub fn transitive_rule<C: Context + ?Sized>(ctx: &mut C, label: &str) -> Result<CellId> {
    let mut builder = RuleBuilder::new(ctx, &format!("transitive_{label}"))?;

    let a = builder.pattern_point(WILDCARD_LABEL)?;
    let b = builder.pattern_point(WILDCARD_LABEL)?;
    let c = builder.pattern_point(WILDCARD_LABEL)?;
    let ab = builder.pattern_cell(label, &[a, b])?;
    let bc = builder.pattern_cell(label, &[b, c])?;

    let r_a = builder.replacement_point(WILDCARD_LABEL)?;
    let r_b = builder.replacement_point(WILDCARD_LABEL)?;
    let r_c = builder.replacement_point(WILDCARD_LABEL)?;
    let r_ab = builder.replacement(label, &[r_a, r_b])?;
    let r_bc = builder.replacement(label, &[r_b, r_c])?;
    builder.produce(label, &[r_a, r_c])?;

    builder.bind(a, r_a)?;
    builder.bind(b, r_b)?;
    builder.bind(c, r_c)?;
    builder.bind(ab, r_ab)?;
    builder.bind(bc, r_bc)?;

    builder.finish()
}

// =============================================================================
// TESTS
// =============================================================================
