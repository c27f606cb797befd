//! # Rewrite Engine
//!
//! Matches a subcomplex against a stored rule and replaces it.
//!
//! Application is match-then-apply:
//!
//! 1. The rule is compiled and the subcomplex matched position by position.
//! 2. Every cell to create is planned and constructed against a staged view
//!    (store plus already staged cells), so all invariants are checked before
//!    anything is inserted.
//! 3. Staged cells are committed in plan order, then unbound matched cells are
//!    soft-deleted.
//!
//! A failed match or a failed construction leaves the store untouched.

use crate::cell::{BoundaryCheck, Cell, CellLookup};
use crate::complex::{Complex, Context};
use crate::rules::Rule;
use crate::types::{CellId, CwstoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What a rule application changed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rewrite {
    /// Cells created, in creation order.
    pub created: Vec<CellId>,
    /// Matched cells soft-deleted because the rule does not bind them.
    pub deleted: Vec<CellId>,
}

impl Rewrite {
    /// True if the application changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty()
    }
}

/// Result of matching a subcomplex: replacement-side cell -> store cell, plus
/// the matched cells without a binding.
#[derive(Debug, Clone, Default)]
struct Matching {
    bindings: BTreeMap<CellId, CellId>,
    unbound: Vec<CellId>,
}

/// Store plus cells staged for insertion.
struct Staged<'a> {
    store: &'a Complex,
    cells: &'a BTreeMap<CellId, Cell>,
}

impl CellLookup for Staged<'_> {
    fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id).or_else(|| self.store.cell(id))
    }
}

/// The rewrite engine.
pub struct RewriteEngine;

impl RewriteEngine {
    /// Compile `rule` from the store and apply it to `subcomplex`.
    ///
    /// Reads the coboundary index; build it after defining the rule.
    pub fn apply_rule(cw: &mut Complex, rule: CellId, subcomplex: &[CellId]) -> Result<Rewrite> {
        let compiled = Rule::compile(&*cw, rule)?;
        Self::apply_compiled(cw, &compiled, subcomplex)
    }

    /// Apply an already compiled rule.
    pub fn apply_compiled(cw: &mut Complex, rule: &Rule, subcomplex: &[CellId]) -> Result<Rewrite> {
        let matching = Self::match_subcomplex(&*cw, rule, subcomplex)?;
        let Matching {
            mut bindings,
            unbound,
        } = matching;

        let plan = plan_creations(rule, &bindings)?;

        let mut staged: BTreeMap<CellId, Cell> = BTreeMap::new();
        let mut created = Vec::with_capacity(plan.len());
        for (offset, template_id) in plan.into_iter().enumerate() {
            let template = rule
                .template(template_id)
                .ok_or_else(|| missing_template(rule, template_id))?;
            let boundary = template
                .boundary
                .iter()
                .map(|b| {
                    bindings
                        .get(b)
                        .copied()
                        .ok_or_else(|| missing_template(rule, *b))
                })
                .collect::<Result<Vec<_>>>()?;

            let id = cw.reserve_id(offset);
            let view = Staged {
                store: cw,
                cells: &staged,
            };
            let cell = cw.construct(id, &template.label, &boundary, BoundaryCheck::Full, &view)?;
            staged.insert(id, cell);
            bindings.insert(template_id, id);
            created.push(id);
        }

        for cell in staged.into_values() {
            cw.insert(cell)?;
        }
        for &cell in &unbound {
            cw.delete_cell(cell)?;
        }

        tracing::debug!(
            rule = %rule.cell(),
            created = created.len(),
            deleted = unbound.len(),
            "rule applied"
        );

        Ok(Rewrite {
            created,
            deleted: unbound,
        })
    }

    /// Check `subcomplex` against the rule's pattern without changing anything.
    pub fn matches<C: Context + ?Sized>(ctx: &C, rule: &Rule, subcomplex: &[CellId]) -> bool {
        Self::match_subcomplex(ctx, rule, subcomplex).is_ok()
    }

    fn match_subcomplex<C: Context + ?Sized>(
        ctx: &C,
        rule: &Rule,
        subcomplex: &[CellId],
    ) -> Result<Matching> {
        let cells = subcomplex
            .iter()
            .map(|&id| ctx.resolve(id))
            .collect::<Result<Vec<_>>>()?;

        if let Some(dead) = cells.iter().find(|cell| cell.is_deleted()) {
            return Err(CwstoreError::PatternMismatch(format!(
                "{} is deleted",
                dead.id()
            )));
        }

        let points = cells.iter().filter(|cell| cell.dimension() == 0).count();
        if points != rule.point_count() {
            return Err(CwstoreError::PatternMismatch(format!(
                "rule expects {} points, subcomplex has {points}",
                rule.point_count()
            )));
        }
        if cells.len() != rule.pattern().len() {
            return Err(CwstoreError::PatternMismatch(format!(
                "rule expects {} cells, subcomplex has {}",
                rule.pattern().len(),
                cells.len()
            )));
        }

        let mut matching = Matching::default();
        for (slot, cell) in rule.pattern().iter().zip(&cells) {
            if slot.dimension != cell.dimension() {
                return Err(CwstoreError::PatternMismatch(format!(
                    "dimensions mismatch: {}({}) != '{}'({})",
                    slot.template,
                    slot.dimension,
                    cell.label(),
                    cell.dimension()
                )));
            }
            if !slot.label.matches(cell.label()) {
                return Err(CwstoreError::PatternMismatch(format!(
                    "label mismatch: {:?} != '{}'",
                    slot.label,
                    cell.label()
                )));
            }
            match slot.binds_to {
                Some(replacement) => {
                    matching.bindings.insert(replacement, cell.id());
                }
                None => matching.unbound.push(cell.id()),
            }
        }
        Ok(matching)
    }
}

fn missing_template(rule: &Rule, id: CellId) -> CwstoreError {
    CwstoreError::MalformedRule {
        rule: rule.cell(),
        reason: format!("product cell {id} is neither bound nor creatable"),
    }
}

/// Order in which unbound product cells are created: product cells by
/// ascending dimension, each preceded by its own unbound sub-cells.
fn plan_creations(rule: &Rule, bindings: &BTreeMap<CellId, CellId>) -> Result<Vec<CellId>> {
    let mut roots: Vec<(usize, CellId)> = Vec::new();
    for &id in rule.product() {
        if bindings.contains_key(&id) {
            continue;
        }
        let template = rule.template(id).ok_or_else(|| missing_template(rule, id))?;
        roots.push((template.dimension, id));
    }
    roots.sort_by_key(|&(dimension, _)| dimension);

    let mut plan = Vec::new();
    let mut planned: BTreeSet<CellId> = BTreeSet::new();
    for (_, root) in roots {
        // (cell, children pushed)
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if planned.contains(&id) || bindings.contains_key(&id) {
                continue;
            }
            if expanded {
                planned.insert(id);
                plan.push(id);
                continue;
            }
            let template = rule.template(id).ok_or_else(|| missing_template(rule, id))?;
            stack.push((id, true));
            for &face in template.boundary.iter().rev() {
                if !planned.contains(&face) && !bindings.contains_key(&face) {
                    stack.push((face, false));
                }
            }
        }
    }
    Ok(plan)
}

// =============================================================================
// TESTS
// =============================================================================
