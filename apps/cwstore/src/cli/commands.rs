//! # CLI Command Implementations
//!
//! Each command builds a serializable report, then prints it either as
//! pretty JSON or as text.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::knowledge::Knowledge;
use cwstore_core::{
    CellId, CellLookup, Choice, Context, Inference, PolicyKind, RandomPolicy, Revision,
    RewriteEngine, query_boundary_resolving, transitive_rule,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::Path;

fn print_json<T: Serialize>(report: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn labels(knowledge: &Knowledge, ids: &[CellId]) -> AppResult<Vec<String>> {
    ids.iter().map(|&id| knowledge.describe(id)).collect()
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub knowledge: Option<String>,
    pub points: usize,
    pub links: usize,
    pub cells: usize,
    pub live_cells: usize,
    pub atom_links: usize,
    pub dimensions: usize,
    pub coboundary_stale: bool,
    pub config: Config,
}

pub fn status_report(
    knowledge: &Knowledge,
    config: &Config,
    source: Option<&Path>,
) -> StatusReport {
    let cw = knowledge.complex();
    StatusReport {
        knowledge: source.map(|path| path.to_string_lossy().into_owned()),
        points: knowledge.point_count(),
        links: cw
            .layer_cells(1)
            .into_iter()
            .filter(|&id| cw.cell(id).is_some_and(|cell| cell.is_live()))
            .count(),
        cells: cw.len(),
        live_cells: cw.live_count(),
        atom_links: cw.atom_link_count(),
        dimensions: cw.layer_count(),
        coboundary_stale: cw.is_coboundary_stale(),
        config: config.clone(),
    }
}

/// Show store status.
pub fn cmd_status(
    knowledge: &Knowledge,
    config: &Config,
    source: Option<&Path>,
    json_mode: bool,
) -> AppResult<()> {
    let report = status_report(knowledge, config, source);
    if json_mode {
        return print_json(&report);
    }

    println!("cwstore Status");
    println!("==============");
    println!(
        "Knowledge:  {}",
        report.knowledge.as_deref().unwrap_or("(none)")
    );
    println!();
    println!("Points:     {}", report.points);
    println!("Links:      {}", report.links);
    println!("Cells:      {} ({} live)", report.cells, report.live_cells);
    println!("Atom Links: {}", report.atom_links);
    println!("Dimensions: {}", report.dimensions);
    println!();
    println!("Horizon:    {}", report.config.horizon);
    println!("Policy:     {}", report.config.policy);

    Ok(())
}

// =============================================================================
// INFER COMMAND
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferReport {
    pub subject: String,
    pub predicate: String,
    pub horizon: f64,
    pub frequency: f64,
    pub confidence: f64,
    pub positive: usize,
    pub total: usize,
    /// Everything that is the subject.
    pub extension: Vec<String>,
    /// Everything the subject is.
    pub intension: Vec<String>,
}

pub fn infer_report(
    knowledge: &Knowledge,
    subject: &str,
    predicate: &str,
    horizon: f64,
) -> AppResult<InferReport> {
    let cw = knowledge.complex();
    let s = knowledge.point(subject)?;
    let p = knowledge.point(predicate)?;

    let truth = Inference::truth_value(cw, s, p, horizon)?;
    Ok(InferReport {
        subject: subject.to_string(),
        predicate: predicate.to_string(),
        horizon,
        frequency: truth.frequency,
        confidence: truth.confidence,
        positive: truth.positive,
        total: truth.total,
        extension: labels(knowledge, &Inference::extension(cw, s)?)?,
        intension: labels(knowledge, &Inference::intension(cw, s)?)?,
    })
}

/// Infer the truth value of "subject is predicate".
pub fn cmd_infer(
    knowledge: &Knowledge,
    subject: &str,
    predicate: &str,
    horizon: f64,
    json_mode: bool,
    verbose: bool,
) -> AppResult<()> {
    let report = infer_report(knowledge, subject, predicate, horizon)?;
    if json_mode {
        return print_json(&report);
    }

    println!("{} is {}", report.subject, report.predicate);
    println!(
        "  truth: [{:.4}, {:.4}] ({} of {} evidence, k = {})",
        report.frequency, report.confidence, report.positive, report.total, report.horizon
    );
    if verbose {
        println!("  extension: {}", report.extension.join(", "));
        println!("  intension: {}", report.intension.join(", "));
    }

    Ok(())
}

// =============================================================================
// RESOLVE COMMAND
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolveReport {
    pub label: String,
    pub from: String,
    pub to: String,
    pub policy: PolicyKind,
    /// The stored payload; `[frequency, confidence]` for evidence edges.
    pub truth: Vec<f64>,
    /// Live cells soft-deleted while resolving.
    pub resolved: usize,
}

pub fn resolve_report(
    knowledge: &mut Knowledge,
    label: &str,
    from: &str,
    to: &str,
    policy: PolicyKind,
    seed: Option<u64>,
) -> AppResult<ResolveReport> {
    let x = knowledge.point(from)?;
    let y = knowledge.point(to)?;

    let cw = knowledge.complex_mut();
    let live_before = cw.live_count();
    let truth = match policy {
        PolicyKind::Revision => query_boundary_resolving(cw, label, x, y, &mut Revision)?,
        PolicyKind::Choice => query_boundary_resolving(cw, label, x, y, &mut Choice)?,
        PolicyKind::Random => {
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            query_boundary_resolving(cw, label, x, y, &mut RandomPolicy::new(rng))?
        }
    };
    let resolved = live_before.saturating_sub(cw.live_count());
    tracing::info!(label, from, to, %policy, resolved, "boundary query answered");

    Ok(ResolveReport {
        label: label.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        policy,
        truth: truth.as_slice().to_vec(),
        resolved,
    })
}

/// Query the evidence on an edge, resolving duplicates with `policy`.
pub fn cmd_resolve(
    knowledge: &mut Knowledge,
    label: &str,
    from: &str,
    to: &str,
    policy: PolicyKind,
    seed: Option<u64>,
    json_mode: bool,
) -> AppResult<()> {
    let report = resolve_report(knowledge, label, from, to, policy, seed)?;
    if json_mode {
        return print_json(&report);
    }

    let values: Vec<String> = report.truth.iter().map(|v| format!("{v:.4}")).collect();
    println!("{} {} {}", report.from, report.label, report.to);
    println!("  truth:  [{}]", values.join(", "));
    println!("  policy: {} ({} duplicates removed)", report.policy, report.resolved);

    Ok(())
}

// =============================================================================
// REWRITE COMMAND
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellSummary {
    pub id: CellId,
    pub label: String,
    pub dimension: usize,
    pub boundary: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewriteReport {
    pub rule: String,
    pub created: Vec<CellSummary>,
    pub deleted: Vec<CellSummary>,
}

fn summarize(knowledge: &Knowledge, id: CellId) -> AppResult<CellSummary> {
    let cell = knowledge.complex().resolve(id)?;
    Ok(CellSummary {
        id,
        label: cell.display_label().into_owned(),
        dimension: cell.dimension(),
        boundary: labels(knowledge, cell.boundary())?,
    })
}

pub fn rewrite_report(
    knowledge: &mut Knowledge,
    label: &str,
    points: &[String],
) -> AppResult<RewriteReport> {
    let [a, b, c] = points else {
        return Err(AppError::InvalidArgument(format!(
            "rewrite needs exactly three points, got {}",
            points.len()
        )));
    };
    let (a_id, b_id, c_id) = (knowledge.point(a)?, knowledge.point(b)?, knowledge.point(c)?);

    let missing = |from: &str, to: &str| AppError::MissingLink {
        label: label.to_string(),
        from: from.to_string(),
        to: to.to_string(),
    };
    let cw = knowledge.complex_mut();
    let ab = cw
        .find_link(a_id, b_id, label, true)
        .ok_or_else(|| missing(a, b))?;
    let bc = cw
        .find_link(b_id, c_id, label, true)
        .ok_or_else(|| missing(b, c))?;

    let rule = transitive_rule(cw, label)?;
    cw.build_coboundary();
    let rewrite = RewriteEngine::apply_rule(cw, rule, &[a_id, b_id, c_id, ab, bc])?;
    cw.build_coboundary();
    let rule_label = cw.resolve(rule)?.label().to_string();
    tracing::info!(rule = %rule_label, created = rewrite.created.len(), "rule applied");

    Ok(RewriteReport {
        rule: rule_label,
        created: rewrite
            .created
            .iter()
            .map(|&id| summarize(knowledge, id))
            .collect::<AppResult<_>>()?,
        deleted: rewrite
            .deleted
            .iter()
            .map(|&id| summarize(knowledge, id))
            .collect::<AppResult<_>>()?,
    })
}

/// Apply the transitive rule for `label` to the chain `points`.
pub fn cmd_rewrite(
    knowledge: &mut Knowledge,
    label: &str,
    points: &[String],
    json_mode: bool,
) -> AppResult<()> {
    let report = rewrite_report(knowledge, label, points)?;
    if json_mode {
        return print_json(&report);
    }

    println!("Applied {}", report.rule);
    for cell in &report.created {
        println!("  + {} [{}]", cell.label, cell.boundary.join(", "));
    }
    for cell in &report.deleted {
        println!("  - {} [{}]", cell.label, cell.boundary.join(", "));
    }

    Ok(())
}
