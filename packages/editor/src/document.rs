//! # Document Handle
//!
//! A Document is one message template and its editing state.
//! Documents can be:
//! - **Memory-backed**: the host persists [`Document::commit`] output itself
//! - **File-backed**: JSON on disk, written by [`Document::save`]
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Normalize → Edit → Render / Save
//!   ↓        ↓         ↓        ↓       ↓
//! JSON   Template  Mutations  String   JSON
//! ```
//!
//! Addresses handed out by a document are bound to its `version`. Use
//! [`Document::apply_at`] to reject edits computed against an older version.

use crate::{EditorError, EditorResult, Mutation, MutationResult};
use missive_evaluator::{render, VarValues};
use missive_template::{parse, stringify, RawNode, Template};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Editable message template
#[derive(Debug)]
pub struct Document {
    /// Current version number (increments on each applied mutation)
    pub version: u64,

    /// Unsaved changes since load or last commit
    dirty: bool,

    /// Backing storage strategy
    storage: DocumentStorage,
}

/// Storage backend for document
#[derive(Debug)]
pub enum DocumentStorage {
    /// In-memory only
    Memory { template: Template },

    /// File-backed
    File { path: PathBuf, template: Template },
}

impl Document {
    /// Create a memory-backed document
    pub fn new(template: Template) -> Self {
        Self {
            version: 0,
            dirty: false,
            storage: DocumentStorage::Memory { template },
        }
    }

    /// Create from a raw forest; `None` gives the default template
    pub fn from_raw(raw: Option<&[RawNode]>) -> Self {
        Self::new(Template::from_raw(raw))
    }

    /// Create from template JSON (memory-backed)
    pub fn from_source(source: &str) -> EditorResult<Self> {
        Ok(Self::new(parse_or_default(source)?))
    }

    /// Load document from file (file-backed).
    ///
    /// A missing or blank file gives the default template; it is created on save.
    pub fn load(path: impl Into<PathBuf>) -> EditorResult<Self> {
        let path = path.into();
        let template = if path.exists() {
            let source = std::fs::read_to_string(&path)?;
            parse_or_default(&source)?
        } else {
            debug!(path = %path.display(), "Template file missing, starting from default");
            Template::default()
        };

        info!(path = %path.display(), roots = template.nodes().len(), "Loaded template");

        Ok(Self {
            version: 0,
            dirty: false,
            storage: DocumentStorage::File { path, template },
        })
    }

    pub fn template(&self) -> &Template {
        match &self.storage {
            DocumentStorage::Memory { template } | DocumentStorage::File { template, .. } => {
                template
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.storage {
            DocumentStorage::File { path, .. } => Some(path),
            DocumentStorage::Memory { .. } => None,
        }
    }

    /// Apply a mutation.
    ///
    /// On failure the template and version are unchanged.
    pub fn apply(&mut self, mutation: &Mutation) -> EditorResult<MutationResult> {
        let outcome = mutation.apply(self.template())?;
        let version = self.replace(outcome.template);

        Ok(MutationResult {
            version,
            focus: outcome.focus,
        })
    }

    /// Apply a mutation whose address was read at `expected_version`
    pub fn apply_at(
        &mut self,
        expected_version: u64,
        mutation: &Mutation,
    ) -> EditorResult<MutationResult> {
        if expected_version != self.version {
            return Err(EditorError::StaleVersion {
                expected: expected_version,
                actual: self.version,
            });
        }
        self.apply(mutation)
    }

    /// Swap in a new template value, returning the new version
    pub fn replace(&mut self, template: Template) -> u64 {
        match &mut self.storage {
            DocumentStorage::Memory { template: current }
            | DocumentStorage::File {
                template: current, ..
            } => *current = template,
        }
        self.version += 1;
        self.dirty = true;
        self.version
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Serialized template (raw JSON form)
    pub fn source(&self) -> String {
        stringify(self.template())
    }

    /// Hand the serialized template to the host's store and mark it saved
    pub fn commit(&mut self) -> String {
        self.dirty = false;
        self.source()
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> EditorResult<()> {
        let path = match &self.storage {
            DocumentStorage::File { path, .. } => path.clone(),
            DocumentStorage::Memory { .. } => return Err(EditorError::NotFileBacked),
        };

        std::fs::write(&path, self.source())?;
        self.dirty = false;
        info!(path = %path.display(), version = self.version, "Saved template");
        Ok(())
    }

    /// Render the current template against `values`
    pub fn render(&self, values: Option<&VarValues>) -> String {
        render(Some(self.template().nodes()), values)
    }
}

fn parse_or_default(source: &str) -> EditorResult<Template> {
    if source.trim().is_empty() {
        return Ok(Template::default());
    }
    Ok(parse(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use missive_template::Address;

    #[test]
    fn test_create_memory_document() {
        let doc = Document::from_source(r#"[{"type":"TEXT","text":"Hello"}]"#).unwrap();

        assert_eq!(doc.version, 0);
        assert!(!doc.is_dirty());
        assert!(doc.path().is_none());
        assert_eq!(doc.template().nodes().len(), 1);
    }

    #[test]
    fn test_blank_source_gives_default_template() {
        let doc = Document::from_source("  ").unwrap();
        assert_eq!(doc.template(), &Template::default());
    }

    #[test]
    fn test_document_version_increments_on_success_only() {
        let mut doc = Document::from_source(r#"[{"type":"TEXT","text":"Hello"}]"#).unwrap();

        let ok = Mutation::ReplaceText {
            address: Address::first_text(),
            text: "World".to_string(),
        };
        let result = doc.apply(&ok).unwrap();
        assert_eq!(result.version, 1);
        assert!(doc.is_dirty());

        let stale = Mutation::ReplaceText {
            address: Address::from("/5-text"),
            text: "Lost".to_string(),
        };
        let err = doc.apply(&stale).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(doc.version, 1);
        assert_eq!(doc.source(), r#"[{"type":"TEXT","text":"World"}]"#);
    }

    #[test]
    fn test_apply_at_rejects_old_version() {
        let mut doc = Document::from_raw(None);
        let mutation = Mutation::InsertConditional {
            address: Address::first_text(),
            caret: 0,
        };

        doc.apply_at(0, &mutation).unwrap();
        let err = doc.apply_at(0, &mutation).unwrap_err();

        assert!(matches!(err, EditorError::StaleVersion { expected: 0, actual: 1 }));
    }

    #[test]
    fn test_commit_clears_dirty() {
        let mut doc = Document::from_raw(None);
        doc.apply(&Mutation::InsertText {
            address: Address::first_text(),
            caret: 0,
            text: "Hi".to_string(),
        })
        .unwrap();

        assert!(doc.is_dirty());
        assert_eq!(doc.commit(), r#"[{"type":"TEXT","text":"Hi"}]"#);
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_save_requires_file_backing() {
        let mut doc = Document::from_raw(None);
        assert!(matches!(doc.save(), Err(EditorError::NotFileBacked)));
    }
}
