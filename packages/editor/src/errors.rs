//! Error types for the editor

use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Template error: {0}")]
    Template(#[from] missive_template::TemplateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Edit was computed against version {expected}, document is at {actual}")]
    StaleVersion { expected: u64, actual: u64 },

    #[error("Document is not file-backed")]
    NotFileBacked,
}

impl EditorError {
    /// True when the edit simply did not apply (stale or foreign address).
    ///
    /// Callers re-read a current address and retry, or ignore the edit.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EditorError::Mutation(_) | EditorError::StaleVersion { .. })
    }
}
