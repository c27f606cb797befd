//! # Evaluation
//!
//! A cell may carry a [`HandlerKey`]. Handlers are registered by key in a
//! [`HandlerRegistry`] and invoked through an [`EvalContext`], which gives
//! them read access to the store. Nothing is looked up globally.

use crate::cell::Cell;
use crate::complex::Context;
use crate::inference::Inference;
use crate::primitives::DEFAULT_HORIZON;
use crate::types::{CellId, CwstoreError, Embedding, HandlerKey, Result};
use std::collections::BTreeMap;

/// An evaluation capability attached to cells by key.
pub trait TaskHandler {
    /// Evaluate `cell`. Failures are reported as a message.
    fn run(&self, ctx: &dyn Context, cell: &Cell) -> std::result::Result<Embedding, String>;
}

impl<F> TaskHandler for F
where
    F: Fn(&dyn Context, &Cell) -> std::result::Result<Embedding, String>,
{
    fn run(&self, ctx: &dyn Context, cell: &Cell) -> std::result::Result<Embedding, String> {
        self(ctx, cell)
    }
}

/// Evaluates an "is" edge `[subject, predicate]` to its inferred truth value.
#[derive(Debug, Clone, Copy)]
pub struct TruthHandler {
    pub horizon: f64,
}

impl Default for TruthHandler {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
        }
    }
}

impl TaskHandler for TruthHandler {
    fn run(&self, ctx: &dyn Context, cell: &Cell) -> std::result::Result<Embedding, String> {
        let &[subject, predicate] = cell.boundary() else {
            return Err(format!("{} is not an edge", cell.id()));
        };
        let truth = Inference::truth_value(ctx, subject, predicate, self.horizon)
            .map_err(|e| e.to_string())?;
        Ok(Embedding::pair(truth.frequency, truth.confidence))
    }
}

/// Handlers by key.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<HandlerKey, Box<dyn TaskHandler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("keys", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `key`, returning the handler it replaces.
    pub fn register(
        &mut self,
        key: HandlerKey,
        handler: impl TaskHandler + 'static,
    ) -> Option<Box<dyn TaskHandler>> {
        self.handlers.insert(key, Box::new(handler))
    }

    #[must_use]
    pub fn get(&self, key: &HandlerKey) -> Option<&dyn TaskHandler> {
        self.handlers.get(key).map(|handler| handler.as_ref())
    }

    #[must_use]
    pub fn contains(&self, key: &HandlerKey) -> bool {
        self.handlers.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// A store paired with the handlers its cells may reference.
pub struct EvalContext<'a, C: Context> {
    ctx: &'a C,
    registry: &'a HandlerRegistry,
}

impl<'a, C: Context> EvalContext<'a, C> {
    #[must_use]
    pub fn new(ctx: &'a C, registry: &'a HandlerRegistry) -> Self {
        Self { ctx, registry }
    }

    /// Run the handler attached to `cell`.
    pub fn evaluate(&self, cell: CellId) -> Result<Embedding> {
        let target = self.ctx.resolve(cell)?;
        let key = target.handler().ok_or(CwstoreError::NoHandler(cell))?;
        let handler = self
            .registry
            .get(key)
            .ok_or_else(|| CwstoreError::UnknownHandler(key.as_str().to_string()))?;

        tracing::trace!(%cell, key = key.as_str(), "evaluating");
        handler
            .run(self.ctx, target)
            .map_err(|message| CwstoreError::Handler {
                key: key.as_str().to_string(),
                message,
            })
    }
}

// =============================================================================
// TESTS
// =============================================================================
