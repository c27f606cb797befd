//! # Conflict Resolution
//!
//! Duplicate evidence is two live 1-cells with the same label over the same
//! ordered pair. A boundary query that finds duplicates reports them; a
//! resolution policy merges or discards one of them.
//!
//! ## Policies
//!
//! - `Revision`: merge both truth values into a new cell, delete both inputs.
//! - `Choice`: keep the more confident input, delete the other.
//! - `RandomPolicy`: revision or choice with probability 1/2.
//!
//! The resolving query loops until the ambiguity is gone; a policy that fails
//! to reduce the number of candidates stops the loop with an error.

use crate::cell::Cell;
use crate::complex::Context;
use crate::primitives::PRIOR_TRUTH;
use crate::types::{CellId, CwstoreError, Embedding, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

// =============================================================================
// POLICIES
// =============================================================================

/// A strategy that removes one duplicate from a pair.
pub trait ResolutionPolicy {
    /// Resolve `first` and `second`; returns the surviving or new cell.
    fn resolve<C: Context + ?Sized>(
        &mut self,
        ctx: &mut C,
        first: CellId,
        second: CellId,
    ) -> Result<CellId>;
}

/// Selects a policy by name (configuration, CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Revision,
    Choice,
    Random,
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "revision" => Ok(Self::Revision),
            "choice" => Ok(Self::Choice),
            "random" => Ok(Self::Random),
            other => Err(format!(
                "unknown policy '{other}' (expected revision, choice or random)"
            )),
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Revision => "revision",
            Self::Choice => "choice",
            Self::Random => "random",
        };
        f.write_str(name)
    }
}

/// Merge both truth values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Revision;

/// Keep the more confident input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Choice;

/// Revision or choice, picked by a caller-supplied RNG.
#[derive(Debug, Clone)]
pub struct RandomPolicy<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomPolicy<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl ResolutionPolicy for Revision {
    fn resolve<C: Context + ?Sized>(
        &mut self,
        ctx: &mut C,
        first: CellId,
        second: CellId,
    ) -> Result<CellId> {
        revision(ctx, first, second)
    }
}

impl ResolutionPolicy for Choice {
    fn resolve<C: Context + ?Sized>(
        &mut self,
        ctx: &mut C,
        first: CellId,
        second: CellId,
    ) -> Result<CellId> {
        choice(ctx, first, second)
    }
}

impl<R: Rng> ResolutionPolicy for RandomPolicy<R> {
    fn resolve<C: Context + ?Sized>(
        &mut self,
        ctx: &mut C,
        first: CellId,
        second: CellId,
    ) -> Result<CellId> {
        random_resolution(ctx, first, second, &mut self.rng)
    }
}

// =============================================================================
// RESOLUTION RULES
// =============================================================================

/// Merged `(frequency, confidence)` of two independent truth values.
#[must_use]
pub fn revise(first: (f64, f64), second: (f64, f64)) -> (f64, f64) {
    let (f1, c1) = first;
    let (f2, c2) = second;
    let w1 = c1 * (1.0 - c2);
    let w2 = c2 * (1.0 - c1);
    let weight = w1 + w2;

    let frequency = if weight.abs() < f64::EPSILON {
        (f1 + f2) / 2.0
    } else {
        (f1 * w1 + f2 * w2) / weight
    };

    let denominator = weight + (1.0 - c1) * (1.0 - c2);
    let confidence = if denominator.abs() < f64::EPSILON {
        c1.max(c2)
    } else {
        weight / denominator
    };
    (frequency, confidence)
}

/// Replace both duplicates with one cell carrying the revised truth value.
///
/// Nothing is created unless both inputs can be deleted.
pub fn revision<C: Context + ?Sized>(ctx: &mut C, first: CellId, second: CellId) -> Result<CellId> {
    let (a, b) = duplicate_pair(&*ctx, first, second)?;
    ctx.require_deletable(first)?;
    ctx.require_deletable(second)?;
    let (frequency, confidence) = revise(a.truth, b.truth);

    let merged = ctx.create_cell(&a.label, &a.boundary)?;
    ctx.set_embedding(merged, Embedding::pair(frequency, confidence))?;
    ctx.delete_cell(first)?;
    ctx.delete_cell(second)?;

    tracing::debug!(%first, %second, %merged, frequency, confidence, "revision");
    Ok(merged)
}

/// Keep the more confident duplicate; ties keep `first`.
pub fn choice<C: Context + ?Sized>(ctx: &mut C, first: CellId, second: CellId) -> Result<CellId> {
    let (a, b) = duplicate_pair(&*ctx, first, second)?;
    let (kept, dropped) = if b.truth.1 > a.truth.1 {
        (second, first)
    } else {
        (first, second)
    };
    ctx.delete_cell(dropped)?;

    tracing::debug!(%kept, %dropped, "choice");
    Ok(kept)
}

/// Revision or choice with probability 1/2 each.
pub fn random_resolution<C: Context + ?Sized, R: Rng + ?Sized>(
    ctx: &mut C,
    first: CellId,
    second: CellId,
    rng: &mut R,
) -> Result<CellId> {
    if rng.gen_bool(0.5) {
        revision(ctx, first, second)
    } else {
        choice(ctx, first, second)
    }
}

struct Evidence {
    label: String,
    boundary: Vec<CellId>,
    truth: (f64, f64),
}

fn duplicate_pair<C: Context + ?Sized>(
    ctx: &C,
    first: CellId,
    second: CellId,
) -> Result<(Evidence, Evidence)> {
    let a = ctx.resolve(first)?;
    let b = ctx.resolve(second)?;
    let duplicates = first != second
        && a.is_edge()
        && b.is_edge()
        && a.label() == b.label()
        && a.boundary() == b.boundary();
    if !duplicates {
        return Err(CwstoreError::NotDuplicates(first, second));
    }
    Ok((evidence(a)?, evidence(b)?))
}

fn evidence(cell: &Cell) -> Result<Evidence> {
    let truth = cell
        .embedding()
        .as_pair()
        .ok_or(CwstoreError::MissingTruthValue(cell.id()))?;
    Ok(Evidence {
        label: cell.label().to_string(),
        boundary: cell.boundary().to_vec(),
        truth,
    })
}

// =============================================================================
// BOUNDARY QUERIES
// =============================================================================

/// Live `label` edges `[x, y]` found in `x`'s coboundary.
pub fn candidates<C: Context + ?Sized>(ctx: &C, label: &str, x: CellId, y: CellId) -> Vec<CellId> {
    ctx.coboundary_of(x)
        .into_iter()
        .filter(|&id| {
            ctx.cell(id).is_some_and(|edge| {
                edge.is_edge() && edge.label() == label && edge.boundary() == [x, y]
            })
        })
        .collect()
}

/// Truth value stored on the `label` edge from `x` to `y`.
///
/// No edge yields the prior `[0.5, 0]`; several edges are an `Ambiguous`
/// error naming the first two.
pub fn query_boundary<C: Context + ?Sized>(
    ctx: &C,
    label: &str,
    x: CellId,
    y: CellId,
) -> Result<Embedding> {
    ctx.resolve(x)?;
    ctx.resolve(y)?;
    match candidates(ctx, label, x, y).as_slice() {
        [] => Ok(Embedding::from(PRIOR_TRUTH.to_vec())),
        [only] => Ok(ctx.resolve(*only)?.embedding().clone()),
        [first, second, ..] => Err(CwstoreError::Ambiguous {
            label: label.to_string(),
            first: *first,
            second: *second,
        }),
    }
}

/// Like [`query_boundary`], resolving ambiguity with `policy` and retrying.
///
/// Rebuilds the coboundary index after each resolution.
pub fn query_boundary_resolving<C, P>(
    ctx: &mut C,
    label: &str,
    x: CellId,
    y: CellId,
    policy: &mut P,
) -> Result<Embedding>
where
    C: Context + ?Sized,
    P: ResolutionPolicy + ?Sized,
{
    let mut previous: Option<usize> = None;
    loop {
        match query_boundary(&*ctx, label, x, y) {
            Err(CwstoreError::Ambiguous { first, second, .. }) => {
                let count = candidates(&*ctx, label, x, y).len();
                if previous.is_some_and(|before| count >= before) {
                    return Err(CwstoreError::ResolutionStalled {
                        label: label.to_string(),
                        candidates: count,
                    });
                }
                previous = Some(count);
                tracing::debug!(label, %first, %second, candidates = count, "resolving ambiguity");
                policy.resolve(ctx, first, second)?;
                ctx.build_coboundary();
            }
            other => return other,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellLookup;
    use crate::complex::Complex;
    use crate::overlay::Overlay;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn duplicates(e1: (f64, f64), e2: (f64, f64)) -> (Complex, CellId, CellId, CellId, CellId) {
        let mut cw = Complex::new();
        let x = cw.create_cell("bird", &[]).expect("x");
        let y = cw.create_cell("vertebrate", &[]).expect("y");
        let first = cw.create_cell("is", &[x, y]).expect("first");
        let second = cw.create_cell("is", &[x, y]).expect("second");
        cw.set_embedding(first, Embedding::pair(e1.0, e1.1))
            .expect("embed");
        cw.set_embedding(second, Embedding::pair(e2.0, e2.1))
            .expect("embed");
        cw.build_coboundary();
        (cw, x, y, first, second)
    }

    #[test]
    fn revise_formula() {
        let (f, c) = revise((1.0, 0.5), (0.0, 0.5));
        assert!((f - 0.5).abs() < 1e-12);
        assert!((c - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn revise_degenerate_cases() {
        // No weight on either side.
        let (f, c) = revise((0.2, 0.0), (0.8, 0.0));
        assert!((f - 0.5).abs() < 1e-12);
        assert_eq!(c, 0.0);

        // Both certain: weight and denominator vanish.
        let (f, c) = revise((0.2, 1.0), (0.6, 1.0));
        assert!((f - 0.4).abs() < 1e-12);
        assert_eq!(c, 1.0);
    }

    #[test]
    fn revision_replaces_both() {
        let (mut cw, x, y, first, second) = duplicates((1.0, 0.5), (0.0, 0.5));
        let merged = revision(&mut cw, first, second).expect("revision");

        assert!(cw.cell(first).is_some_and(Cell::is_deleted));
        assert!(cw.cell(second).is_some_and(Cell::is_deleted));
        let cell = cw.cell(merged).expect("merged");
        assert!(cell.is_live());
        assert_eq!(cell.boundary(), &[x, y]);
        let (f, c) = cell.embedding().as_pair().expect("pair");
        assert!((f - 0.5).abs() < 1e-12);
        assert!((c - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn choice_keeps_higher_confidence() {
        let (mut cw, _, _, first, second) = duplicates((1.0, 0.2), (0.5, 0.8));
        assert_eq!(choice(&mut cw, first, second), Ok(second));
        assert!(cw.cell(first).is_some_and(Cell::is_deleted));
        assert!(cw.cell(second).is_some_and(Cell::is_live));
    }

    #[test]
    fn choice_tie_keeps_first() {
        let (mut cw, _, _, first, second) = duplicates((1.0, 0.5), (0.0, 0.5));
        assert_eq!(choice(&mut cw, first, second), Ok(first));
    }

    #[test]
    fn random_policy_postcondition() {
        for seed in 0..16 {
            let (mut cw, _, _, first, second) = duplicates((1.0, 0.3), (0.0, 0.6));
            let mut rng = StdRng::seed_from_u64(seed);
            let survivor = random_resolution(&mut cw, first, second, &mut rng).expect("random");
            let deleted = [first, second]
                .iter()
                .filter(|&&id| cw.cell(id).is_some_and(Cell::is_deleted))
                .count();
            if survivor == first || survivor == second {
                assert_eq!(deleted, 1);
            } else {
                assert_eq!(deleted, 2);
            }
        }
    }

    #[test]
    fn non_duplicates_are_rejected() {
        let mut cw = Complex::new();
        let x = cw.create_cell("x", &[]).expect("x");
        let y = cw.create_cell("y", &[]).expect("y");
        let is = cw.create_cell("is", &[x, y]).expect("is");
        let has = cw.create_cell("has", &[x, y]).expect("has");
        assert_eq!(
            revision(&mut cw, is, has),
            Err(CwstoreError::NotDuplicates(is, has))
        );
        assert_eq!(
            choice(&mut cw, is, is),
            Err(CwstoreError::NotDuplicates(is, is))
        );
    }

    #[test]
    fn missing_truth_value_is_an_error() {
        let mut cw = Complex::new();
        let x = cw.create_cell("x", &[]).expect("x");
        let y = cw.create_cell("y", &[]).expect("y");
        let a = cw.create_cell("is", &[x, y]).expect("a");
        let b = cw.create_cell("is", &[x, y]).expect("b");
        assert_eq!(
            revision(&mut cw, a, b),
            Err(CwstoreError::MissingTruthValue(a))
        );
        assert!(cw.cell(a).is_some_and(Cell::is_live));
    }

    #[test]
    fn query_without_evidence_returns_prior() {
        let mut cw = Complex::new();
        let x = cw.create_cell("x", &[]).expect("x");
        let y = cw.create_cell("y", &[]).expect("y");
        cw.build_coboundary();
        assert_eq!(
            query_boundary(&cw, "is", x, y),
            Ok(Embedding::pair(0.5, 0.0))
        );
    }

    #[test]
    fn query_is_directional() {
        let mut cw = Complex::new();
        let x = cw.create_cell("x", &[]).expect("x");
        let y = cw.create_cell("y", &[]).expect("y");
        let is = cw.create_cell("is", &[x, y]).expect("is");
        cw.set_embedding(is, Embedding::pair(0.9, 0.4)).expect("embed");
        cw.build_coboundary();
        assert_eq!(
            query_boundary(&cw, "is", x, y),
            Ok(Embedding::pair(0.9, 0.4))
        );
        assert_eq!(
            query_boundary(&cw, "is", y, x),
            Ok(Embedding::pair(0.5, 0.0))
        );
    }

    #[test]
    fn query_reports_ambiguity() {
        let (cw, x, y, first, second) = duplicates((1.0, 0.5), (0.0, 0.5));
        assert_eq!(
            query_boundary(&cw, "is", x, y),
            Err(CwstoreError::Ambiguous {
                label: "is".to_string(),
                first,
                second
            })
        );
    }

    #[test]
    fn query_matches_both_boundary_positions() {
        let mut cw = Complex::new();
        let x = cw.create_cell("x", &[]).expect("x");
        let z = cw.create_cell("z", &[]).expect("z");
        let own = cw.create_cell("is", &[x, x]).expect("self edge");
        let into = cw.create_cell("is", &[z, x]).expect("z is x");
        cw.set_embedding(own, Embedding::pair(0.8, 0.3)).expect("embed");
        cw.set_embedding(into, Embedding::pair(0.1, 0.6)).expect("embed");
        cw.build_coboundary();

        assert_eq!(candidates(&cw, "is", x, x), vec![own]);
        assert_eq!(
            query_boundary(&cw, "is", x, x),
            Ok(Embedding::pair(0.8, 0.3))
        );
        assert_eq!(
            query_boundary(&cw, "is", z, x),
            Ok(Embedding::pair(0.1, 0.6))
        );
    }

    #[test]
    fn revision_through_overlay_leaves_patch_untouched() {
        let (base, _, _, first, second) = duplicates((1.0, 0.5), (0.0, 0.5));
        let mut patch = Complex::new();
        let mut overlay = Overlay::new(&mut patch, &base);

        assert!(matches!(
            revision(&mut overlay, first, second),
            Err(CwstoreError::ShadowingUnsupported { .. })
        ));
        assert!(matches!(
            choice(&mut overlay, first, second),
            Err(CwstoreError::ShadowingUnsupported { .. })
        ));
        assert_eq!(patch.len(), 0);
        assert!(base.cell(first).is_some_and(Cell::is_live));
        assert!(base.cell(second).is_some_and(Cell::is_live));
    }

    #[test]
    fn resolving_query_with_each_policy() {
        let (mut cw, x, y, _, second) = duplicates((0.2, 0.1), (0.5, 0.8));
        let value = query_boundary_resolving(&mut cw, "is", x, y, &mut Choice).expect("choice");
        assert_eq!(value, Embedding::pair(0.5, 0.8));
        assert!(cw.cell(second).is_some_and(Cell::is_live));

        let (mut cw, x, y, _, _) = duplicates((1.0, 0.5), (0.0, 0.5));
        let value = query_boundary_resolving(&mut cw, "is", x, y, &mut Revision).expect("revision");
        let (f, _) = value.as_pair().expect("pair");
        assert!((f - 0.5).abs() < 1e-12);

        let (mut cw, x, y, _, _) = duplicates((1.0, 0.5), (0.0, 0.5));
        let mut policy = RandomPolicy::new(StdRng::seed_from_u64(7));
        assert!(query_boundary_resolving(&mut cw, "is", x, y, &mut policy).is_ok());
    }

    #[test]
    fn three_duplicates_take_two_rounds() {
        let (mut cw, x, y, _, _) = duplicates((1.0, 0.5), (0.0, 0.5));
        let third = cw.create_cell("is", &[x, y]).expect("third");
        cw.set_embedding(third, Embedding::pair(0.5, 0.9)).expect("embed");
        cw.build_coboundary();

        let value = query_boundary_resolving(&mut cw, "is", x, y, &mut Choice).expect("resolve");
        assert_eq!(value, Embedding::pair(0.5, 0.9));
        assert_eq!(candidates(&cw, "is", x, y), vec![third]);
    }

    /// Keeps both inputs.
    struct Stubborn;

    impl ResolutionPolicy for Stubborn {
        fn resolve<C: Context + ?Sized>(
            &mut self,
            _ctx: &mut C,
            first: CellId,
            _second: CellId,
        ) -> Result<CellId> {
            Ok(first)
        }
    }

    #[test]
    fn stalled_resolution_terminates() {
        let (mut cw, x, y, _, _) = duplicates((1.0, 0.5), (0.0, 0.5));
        assert_eq!(
            query_boundary_resolving(&mut cw, "is", x, y, &mut Stubborn),
            Err(CwstoreError::ResolutionStalled {
                label: "is".to_string(),
                candidates: 2
            })
        );
    }

    #[test]
    fn policy_kind_parses() {
        assert_eq!("choice".parse::<PolicyKind>(), Ok(PolicyKind::Choice));
        assert!("coin".parse::<PolicyKind>().is_err());
        assert_eq!(PolicyKind::Random.to_string(), "random");
    }
}
