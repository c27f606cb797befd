//! # Inference Module
//!
//! Evidence gathering over directed "is-a" 1-cells.
//!
//! A 1-cell `[x, y]` reads "x is y". The extension of a term collects
//! everything that (transitively) is the term; the intension collects
//! everything the term is. Both are depth-first, iterative, never revisit a
//! cell and only see live edges of the last built coboundary index.
//!
//! The truth value of "S is P" compares the two terms' extensions and
//! intensions:
//!
//! ```text
//! po1 = |ext(S) ∩ ext(P)|      neg1 = |ext(S)| - po1
//! po2 = |int(P) ∩ int(S)|      neg2 = |int(P)| - po2
//! W+  = po1 + po2              W    = po1 + po2 + neg1 + neg2
//! frequency = W+ / W           confidence = W / (W + k)
//! ```
//!
//! Terms that share nothing have no evidence about each other (`W = 0`), and
//! `W = 0` reports frequency 0 and confidence 0.

use crate::cell::Cell;
use crate::complex::{Context, require_point};
use crate::types::{CellId, CwstoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Evidence summary for "subject is predicate".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TruthValue {
    /// `W+ / W`, in `[0, 1]`.
    pub frequency: f64,
    /// `W / (W + k)`, in `[0, 1)`.
    pub confidence: f64,
    /// Positive evidence `W+`.
    pub positive: usize,
    /// Total evidence `W`.
    pub total: usize,
}

impl TruthValue {
    /// Truth value with no evidence at all.
    #[must_use]
    pub fn no_evidence() -> Self {
        Self::default()
    }

    /// Build from evidence counts and horizon `k`.
    #[must_use]
    pub fn from_evidence(positive: usize, total: usize, horizon: f64) -> Self {
        if total == 0 {
            return Self::no_evidence();
        }
        let w = total as f64;
        Self {
            frequency: positive as f64 / w,
            confidence: w / (w + horizon),
            positive,
            total,
        }
    }

    /// The `[frequency, confidence]` pair.
    #[must_use]
    pub fn as_pair(&self) -> (f64, f64) {
        (self.frequency, self.confidence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Follow `[next, current]`.
    Extension,
    /// Follow `[current, next]`.
    Intension,
}

/// Traversal and truth-value computation.
pub struct Inference;

impl Inference {
    /// Everything that transitively *is* `start`, start first.
    pub fn extension<C: Context + ?Sized>(ctx: &C, start: CellId) -> Result<Vec<CellId>> {
        walk(ctx, start, Direction::Extension)
    }

    /// Everything `start` transitively *is*, start first.
    pub fn intension<C: Context + ?Sized>(ctx: &C, start: CellId) -> Result<Vec<CellId>> {
        walk(ctx, start, Direction::Intension)
    }

    /// Truth value of "subject is predicate" with evidential horizon `k`.
    pub fn truth_value<C: Context + ?Sized>(
        ctx: &C,
        subject: CellId,
        predicate: CellId,
        horizon: f64,
    ) -> Result<TruthValue> {
        if !horizon.is_finite() || horizon <= 0.0 {
            return Err(CwstoreError::InvalidHorizon(horizon));
        }

        let se = Self::extension(ctx, subject)?;
        let si: BTreeSet<CellId> = Self::intension(ctx, subject)?.into_iter().collect();
        let pe: BTreeSet<CellId> = Self::extension(ctx, predicate)?.into_iter().collect();
        let pi = Self::intension(ctx, predicate)?;

        let related = se
            .iter()
            .chain(si.iter())
            .any(|term| pe.contains(term) || pi.contains(term));
        if !related {
            tracing::trace!(%subject, %predicate, "terms share no evidence");
            return Ok(TruthValue::no_evidence());
        }

        let po1 = se.iter().filter(|x| pe.contains(x)).count();
        let po2 = pi.iter().filter(|x| si.contains(x)).count();
        let neg1 = se.len().saturating_sub(po1);
        let neg2 = pi.len().saturating_sub(po2);

        let positive = po1.saturating_add(po2);
        let total = positive.saturating_add(neg1).saturating_add(neg2);
        Ok(TruthValue::from_evidence(positive, total, horizon))
    }
}

fn walk<C: Context + ?Sized>(ctx: &C, start: CellId, direction: Direction) -> Result<Vec<CellId>> {
    require_point(ctx.resolve(start)?)?;

    let mut order = Vec::new();
    let mut visited = BTreeSet::new();
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        order.push(current);

        let next: Vec<CellId> = ctx
            .coboundary_of(current)
            .into_iter()
            .filter_map(|edge| ctx.cell(edge))
            .filter(|edge| edge.is_edge())
            .filter_map(|edge| step(edge, current, direction))
            .filter(|cell| !visited.contains(cell))
            .collect();
        // Reversed so the first coface is explored first.
        stack.extend(next.into_iter().rev());
    }
    Ok(order)
}

fn step(edge: &Cell, current: CellId, direction: Direction) -> Option<CellId> {
    let &[from, to] = edge.boundary() else {
        return None;
    };
    match direction {
        Direction::Extension if to == current => Some(from),
        Direction::Intension if from == current => Some(to),
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::Complex;

    fn chain() -> (Complex, CellId, CellId, CellId) {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        let c = cw.create_cell("c", &[]).expect("c");
        cw.link(a, b, "is", true).expect("ab");
        cw.link(b, c, "is", true).expect("bc");
        cw.build_coboundary();
        (cw, a, b, c)
    }

    #[test]
    fn extension_walks_towards_subjects() {
        let (cw, a, b, c) = chain();
        assert_eq!(Inference::extension(&cw, c).expect("ext"), vec![c, b, a]);
        assert_eq!(Inference::extension(&cw, a).expect("ext"), vec![a]);
    }

    #[test]
    fn intension_walks_towards_predicates() {
        let (cw, a, b, c) = chain();
        assert_eq!(Inference::intension(&cw, a).expect("int"), vec![a, b, c]);
        assert_eq!(Inference::intension(&cw, c).expect("int"), vec![c]);
    }

    #[test]
    fn cycles_terminate() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        cw.link(a, b, "is", true).expect("ab");
        cw.link(b, a, "is", true).expect("ba");
        cw.build_coboundary();
        assert_eq!(Inference::intension(&cw, a).expect("int"), vec![a, b]);
    }

    #[test]
    fn deleted_edges_are_not_followed() {
        let mut cw = Complex::new();
        let a = cw.create_cell("a", &[]).expect("a");
        let b = cw.create_cell("b", &[]).expect("b");
        let ab = cw.link(a, b, "is", true).expect("ab");
        cw.delete_cell(ab).expect("delete");
        cw.build_coboundary();
        assert_eq!(Inference::intension(&cw, a).expect("int"), vec![a]);
    }

    #[test]
    fn long_chains_are_walked_without_recursion() {
        let mut cw = Complex::new();
        let points: Vec<CellId> = (0..100_000)
            .map(|i| cw.create_cell(&format!("p{i}"), &[]).expect("point"))
            .collect();
        for pair in points.windows(2) {
            cw.create_cell("is", &[pair[0], pair[1]]).expect("edge");
        }
        cw.build_coboundary();

        let first = points[0];
        let last = points[points.len() - 1];
        assert_eq!(Inference::intension(&cw, first).expect("int"), points);

        let extension = Inference::extension(&cw, last).expect("ext");
        assert_eq!(extension.len(), points.len());
        assert_eq!(extension.last(), Some(&first));
    }

    #[test]
    fn traversal_requires_a_point() {
        let (mut cw, a, b, _) = chain();
        let ab = cw.create_cell("ab", &[a, b]).expect("ab");
        cw.build_coboundary();
        assert!(matches!(
            Inference::extension(&cw, ab),
            Err(CwstoreError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn truth_of_direct_link() {
        let (cw, a, _, c) = chain();
        let tv = Inference::truth_value(&cw, a, c, 1.0).expect("tv");
        assert_eq!(tv.frequency, 1.0);
        assert_eq!(tv.total, 2);
        assert!((tv.confidence - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn unrelated_terms_have_no_evidence() {
        let (mut cw, a, _, _) = chain();
        let x = cw.create_cell("x", &[]).expect("x");
        cw.build_coboundary();
        let tv = Inference::truth_value(&cw, x, a, 10.0).expect("tv");
        assert_eq!(tv, TruthValue::no_evidence());
        assert_eq!(tv.as_pair(), (0.0, 0.0));
    }

    #[test]
    fn horizon_must_be_positive_and_finite() {
        let (cw, a, _, c) = chain();
        for k in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Inference::truth_value(&cw, a, c, k),
                Err(CwstoreError::InvalidHorizon(_))
            ));
        }
    }

    #[test]
    fn from_evidence_zero_total() {
        let tv = TruthValue::from_evidence(0, 0, 1.0);
        assert_eq!(tv.frequency, 0.0);
        assert_eq!(tv.confidence, 0.0);
    }
}
