//! # Missive Editor
//!
//! Structural editing engine for message templates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ template: JSON ↔ addressed working tree     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + mutations      │
//! │  - Load/save templates                      │
//! │  - Split/merge conditionals around the caret│
//! │  - Undo/redo by snapshot                    │
//! │  - Cursor tracking per session              │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ evaluator: tree + values → message text     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Trees are values**: every edit produces a new reindexed template
//! 2. **Addresses are positional**: they are only valid for the version they were read from
//! 3. **Failed edits change nothing**: no partial trees, no version bump
//!
//! ## Usage
//!
//! ```rust
//! use missive_editor::{Document, EditSession};
//!
//! let doc = Document::from_raw(None);
//! let mut session = EditSession::new("local", doc).with_var_names(["firstname"]);
//!
//! session.type_text("Hello ").unwrap();
//! session.insert_variable("firstname").unwrap();
//!
//! assert_eq!(session.document.source(), r#"[{"type":"TEXT","text":"Hello {firstname}"}]"#);
//! assert_eq!(session.preview(), "Hello ");
//! ```

mod document;
mod errors;
mod mutations;
mod session;
mod undo_stack;

pub use document::{Document, DocumentStorage};
pub use errors::{EditorError, EditorResult};
pub use mutations::{
    caret_from_utf16, delete_conditional, insert_conditional, insert_text, replace_text, Deleted,
    Focus, Inserted, Mutation, MutationError, MutationOutcome, MutationResult,
};
pub use session::EditSession;
pub use undo_stack::{MutationBatch, UndoStack};

// Re-export common types for convenience
pub use missive_template::{Address, Template};
