//! # Undo/Redo Stack
//!
//! Tracks edit history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Templates are values, so each entry keeps the tree as it was before
//!   and after the edit
//! - Undo restores the `before` snapshot and moves the entry to the redo stack
//! - Redo restores the `after` snapshot
//! - New edits clear the redo stack
//! - Supports batched operations (group multiple mutations as one undo step)
//!
//! ## Example
//!
//! ```rust
//! use missive_editor::{Document, Mutation, UndoStack};
//! use missive_template::Address;
//!
//! let mut doc = Document::from_raw(None);
//! let mut stack = UndoStack::new();
//!
//! let mutation = Mutation::InsertText {
//!     address: Address::first_text(),
//!     caret: 0,
//!     text: "Hi".to_string(),
//! };
//! stack.apply(&mutation, &mut doc).unwrap();
//! assert_eq!(doc.render(None), "Hi");
//!
//! stack.undo(&mut doc);
//! assert_eq!(doc.render(None), "");
//!
//! stack.redo(&mut doc);
//! assert_eq!(doc.render(None), "Hi");
//! ```

use crate::{Document, EditorError, Mutation, MutationResult};
use missive_template::Template;
use tracing::debug;

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// Template before the first mutation
    pub before: Template,

    /// Template after the last mutation
    pub after: Template,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl MutationBatch {
    /// Create a single-mutation batch
    pub fn single(mutation: Mutation, before: Template, after: Template) -> Self {
        Self {
            mutations: vec![mutation],
            before,
            after,
            description: None,
        }
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Undo/redo stack for template editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<MutationBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Inside begin_batch/end_batch
    batching: bool,

    /// Batch being built, created by its first mutation
    current_batch: Option<MutationBatch>,

    /// Description for the batch being built, applied once it has content
    pending_description: Option<String>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            batching: false,
            current_batch: None,
            pending_description: None,
        }
    }

    /// Apply a mutation to `doc` and record it for undo.
    ///
    /// Failed mutations leave both the document and the history untouched.
    pub fn apply(
        &mut self,
        mutation: &Mutation,
        doc: &mut Document,
    ) -> Result<MutationResult, EditorError> {
        let before = doc.template().clone();
        let result = doc.apply(mutation)?;
        let after = doc.template().clone();

        if self.batching {
            match &mut self.current_batch {
                Some(batch) => {
                    batch.mutations.push(mutation.clone());
                    batch.after = after;
                }
                None => {
                    let mut batch = MutationBatch::single(mutation.clone(), before, after);
                    batch.description = self.pending_description.take();
                    self.current_batch = Some(batch);
                }
            }
        } else {
            self.push_batch(MutationBatch::single(mutation.clone(), before, after));
        }

        Ok(result)
    }

    /// Start a batch of mutations (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.batching = true;
        self.current_batch = None;
        self.pending_description = None;
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        self.batching = false;
        self.pending_description = None;
        if let Some(batch) = self.current_batch.take() {
            self.push_batch(batch);
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if !self.batching {
            return;
        }
        match &mut self.current_batch {
            Some(batch) => batch.description = Some(description.into()),
            None => self.pending_description = Some(description.into()),
        }
    }

    /// Push a batch to the undo stack
    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Undo the most recent mutation/batch.
    ///
    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        let Some(batch) = self.undo_stack.pop() else {
            return false;
        };

        let version = doc.replace(batch.before.clone());
        debug!(version, mutations = batch.mutations.len(), "Undo");
        self.redo_stack.push(batch);
        true
    }

    /// Redo the most recently undone mutation/batch
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        let Some(batch) = self.redo_stack.pop() else {
            return false;
        };

        let version = doc.replace(batch.after.clone());
        debug!(version, mutations = batch.mutations.len(), "Redo");
        self.undo_stack.push(batch);
        true
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
        self.pending_description = None;
        self.batching = false;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
