//! Error types and diagnostics for tree construction.
//!
//! [`DomError`] covers everything a single tree operation or builder event
//! can fail with. [`ParseError`] wraps it with the position of the event
//! that failed, or carries a failure reported by the event source itself.
//!
//! Non-fatal findings (for example an end tag that does not match the open
//! element) are collected as [`ParseDiagnostic`]s instead of aborting.

use std::collections::TryReserveError;
use std::fmt;

/// Failure of a tree operation or of a single builder event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// A buffer, node list or attribute list could not grow.
    #[error("out of memory")]
    OutOfMemory,

    /// The caller passed a node or index that does not fit the operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// An event that needs an insertion point arrived while there was none,
    /// i.e. before the first element or after the root element closed.
    #[error("unexpected {event} event with no open element")]
    UnexpectedState {
        /// Name of the offending event, e.g. `"characters"`.
        event: &'static str,
    },

    /// Element nesting went past the configured limit.
    #[error("element nesting exceeds the limit of {limit}")]
    DepthLimitExceeded {
        /// The configured maximum depth.
        limit: u32,
    },
}

impl From<TryReserveError> for DomError {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

/// Severity level for a diagnostic collected while building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The tree was built, but the input looked suspicious.
    Warning,
    /// The input was malformed and the builder had to guess.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single non-fatal diagnostic emitted while building a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// The severity of this diagnostic.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Zero-based index of the event that produced it.
    pub event: usize,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} at event {}",
            self.severity, self.message, self.event
        )
    }
}

/// The error returned when driving an event source into a tree fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The event source could not produce the next event.
    #[error("parse error at byte {position}: {message}")]
    Source {
        /// Message from the underlying tokenizer.
        message: String,
        /// Byte offset into the input, when known.
        position: u64,
    },

    /// The tree builder rejected an event.
    #[error("tree construction failed at event {event}: {source}")]
    Build {
        /// Zero-based index of the rejected event.
        event: usize,
        /// Why the builder rejected it.
        #[source]
        source: DomError,
    },
}

impl ParseError {
    /// Returns the builder error, if this failure came from the builder.
    #[must_use]
    pub fn dom_error(&self) -> Option<&DomError> {
        match self {
            Self::Build { source, .. } => Some(source),
            Self::Source { .. } => None,
        }
    }
}
