//! Error types for pattern parsing.

use thiserror::Error;

/// Errors produced while parsing a shift pattern.
///
/// Every failure surfaces at parse time; applying a parsed
/// [`ShiftSpec`](crate::ShiftSpec) never fails. The first error
/// encountered aborts the parse, so a failed pattern yields no spec
/// at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShiftError {
    /// The pattern is not fully covered by the clause grammar.
    #[error("invalid shift pattern {0:?}")]
    Syntax(String),

    /// A unit repeats or appears out of the fixed `YMDWwhmslun` order.
    #[error("misplaced unit in {clause:?}, expected one of {expected:?}")]
    Sequence {
        /// The offending clause as written.
        clause: String,
        /// The unit letters still admissible at this point.
        expected: String,
    },

    /// An anchor mark is combined with something that does not allow it.
    #[error("illegal anchor in {clause:?}: {reason}")]
    Anchor { clause: String, reason: String },

    /// A value is outside its unit's legal domain.
    #[error("illegal value in {clause:?}: {reason}")]
    Value { clause: String, reason: String },
}

/// Convenient alias for `Result` with [`ShiftError`].
pub type Result<T> = std::result::Result<T, ShiftError>;
