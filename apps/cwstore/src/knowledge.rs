//! # Knowledge Files
//!
//! A knowledge file describes the initial contents of a store:
//!
//! ```toml
//! points = ["robin", "bird", "animal"]
//!
//! [[links]]
//! subject = "robin"
//! predicate = "bird"
//!
//! [[links]]
//! subject = "bird"
//! predicate = "animal"
//! atom = "birds_are_animals"
//!
//! [[evidence]]
//! subject = "robin"
//! predicate = "animal"
//! truth = [1.0, 0.9]
//! ```
//!
//! Points are also created on first mention. `links` go through
//! [`Context::link`] and are therefore deduplicated; every `evidence` entry
//! creates a fresh edge carrying its truth value, so repeated entries yield
//! the duplicates that resolution policies operate on. `label` defaults to
//! `"is"`; an `atom` names a point registered as the atomic name of the edge.

use crate::error::{AppError, AppResult};
use crate::files::{MAX_KNOWLEDGE_FILE_SIZE, read_text_file};
use cwstore_core::{CellId, CellLookup, Complex, Context, Embedding};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Label used when an entry does not name one.
pub const DEFAULT_LINK_LABEL: &str = "is";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct KnowledgeToml {
    #[serde(default)]
    points: Vec<String>,
    #[serde(default)]
    links: Vec<LinkEntry>,
    #[serde(default)]
    evidence: Vec<EvidenceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LinkEntry {
    subject: String,
    predicate: String,
    #[serde(default = "default_label")]
    label: String,
    #[serde(default = "default_oriented")]
    oriented: bool,
    #[serde(default)]
    atom: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EvidenceEntry {
    subject: String,
    predicate: String,
    #[serde(default = "default_label")]
    label: String,
    truth: [f64; 2],
    #[serde(default)]
    atom: Option<String>,
}

fn default_label() -> String {
    DEFAULT_LINK_LABEL.to_string()
}

fn default_oriented() -> bool {
    true
}

// =============================================================================
// KNOWLEDGE
// =============================================================================

/// A store built from a knowledge file, with its points indexed by label.
#[derive(Debug, Clone, Default)]
pub struct Knowledge {
    complex: Complex,
    points: BTreeMap<String, CellId>,
}

impl Knowledge {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a knowledge document.
    ///
    /// The coboundary index is built before returning.
    pub fn from_toml_str(source: &str) -> AppResult<Self> {
        let parsed: KnowledgeToml = toml::from_str(source).map_err(|source| AppError::Parse {
            what: "knowledge".to_string(),
            source,
        })?;

        let mut knowledge = Self::new();
        for label in &parsed.points {
            knowledge.ensure_point(label)?;
        }
        for entry in &parsed.links {
            let subject = knowledge.ensure_point(&entry.subject)?;
            let predicate = knowledge.ensure_point(&entry.predicate)?;
            let edge = knowledge
                .complex
                .link(subject, predicate, &entry.label, entry.oriented)?;
            knowledge.name_edge(edge, entry.atom.as_deref())?;
        }
        for entry in &parsed.evidence {
            let [frequency, confidence] = entry.truth;
            if !(0.0..=1.0).contains(&frequency) || !(0.0..1.0).contains(&confidence) {
                return Err(AppError::InvalidKnowledge(format!(
                    "truth [{frequency}, {confidence}] of '{} {} {}' is out of range",
                    entry.subject, entry.label, entry.predicate
                )));
            }
            let subject = knowledge.ensure_point(&entry.subject)?;
            let predicate = knowledge.ensure_point(&entry.predicate)?;
            let edge = knowledge
                .complex
                .create_cell(&entry.label, &[subject, predicate])?;
            knowledge
                .complex
                .set_embedding(edge, Embedding::pair(frequency, confidence))?;
            knowledge.name_edge(edge, entry.atom.as_deref())?;
        }

        knowledge.complex.build_coboundary();
        tracing::debug!(
            points = knowledge.points.len(),
            cells = knowledge.complex.len(),
            "knowledge loaded"
        );
        Ok(knowledge)
    }

    /// Read and build a knowledge file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let source = read_text_file(path, MAX_KNOWLEDGE_FILE_SIZE)?;
        Self::from_toml_str(&source)
    }

    #[must_use]
    pub fn complex(&self) -> &Complex {
        &self.complex
    }

    pub fn complex_mut(&mut self) -> &mut Complex {
        &mut self.complex
    }

    /// The point labeled `label`.
    pub fn point(&self, label: &str) -> AppResult<CellId> {
        self.points
            .get(label)
            .copied()
            .ok_or_else(|| AppError::UnknownPoint(label.to_string()))
    }

    /// Number of distinct points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Label of `id` as shown to users.
    pub fn describe(&self, id: CellId) -> AppResult<String> {
        Ok(self.complex.resolve(id)?.display_label().into_owned())
    }

    fn ensure_point(&mut self, label: &str) -> AppResult<CellId> {
        if let Some(&id) = self.points.get(label) {
            return Ok(id);
        }
        if label.is_empty() {
            return Err(AppError::InvalidKnowledge(
                "point labels must not be empty".to_string(),
            ));
        }
        let id = self.complex.create_cell(label, &[])?;
        self.points.insert(label.to_string(), id);
        Ok(id)
    }

    fn name_edge(&mut self, edge: CellId, atom: Option<&str>) -> AppResult<()> {
        if let Some(atom) = atom {
            let atom = self.ensure_point(atom)?;
            self.complex.create_atom_link(edge, atom)?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
