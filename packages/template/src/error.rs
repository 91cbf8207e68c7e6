use crate::address::Address;
use crate::ast::NodeKind;
use thiserror::Error;

pub type AddressResult<T> = Result<T, AddressError>;
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Why an address could not be resolved against a template.
///
/// These are expected outcomes in an editing session (an address computed
/// before another edit restructured the tree), not faults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Malformed address '{address}': {reason}")]
    Malformed { address: String, reason: String },

    #[error("Index {index} out of range at '{at}' ({len} siblings)")]
    IndexOutOfRange {
        at: Address,
        index: usize,
        len: usize,
    },

    #[error("Expected {expected} node at '{at}', found {found}")]
    KindMismatch {
        at: Address,
        expected: NodeKind,
        found: NodeKind,
    },
}

impl AddressError {
    pub fn malformed(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// The address string does not follow the path grammar
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// The address is well formed but does not match the tree's structure
    pub fn is_structural_mismatch(&self) -> bool {
        !self.is_malformed()
    }
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Invalid template JSON: {0}")]
    Json(#[from] serde_json::Error),
}
