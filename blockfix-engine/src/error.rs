//! Error types for the engine
//!
//! Every error is scoped to a single document. Callers running a batch record the
//! error against that document and move on.

/// The block scanner was asked about a line that does not exist.
///
/// This is a precondition violation by the caller; it aborts the pass over the
/// current document only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("line index {index} is out of range for a document of {len} lines")]
    OutOfRange { index: usize, len: usize },
}

/// Raw bytes could not be decoded as UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("invalid UTF-8 after byte {valid_up_to}")]
    InvalidUtf8 { valid_up_to: usize },
}

/// Errors from running a rule set over a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PassError {
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    /// The rule set kept editing its own output. This points at two rules whose
    /// matchers overlap.
    #[error("rule set '{rule_set}' did not settle after {sweeps} sweeps")]
    NonConvergent { rule_set: String, sweeps: usize },
}

/// Errors from looking up rule sets by name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown rule set '{0}'")]
    UnknownRuleSet(String),
}
