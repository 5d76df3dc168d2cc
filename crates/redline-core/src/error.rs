//! Error types for the editing engine.
//!
//! Interactive operations never fail; they report an
//! [`EditOutcome`](crate::types::EditOutcome) instead. These errors come from
//! the checked APIs: explicit position setters, lifecycle transitions and
//! configuration validation.

use thiserror::Error;

use crate::lifecycle::Lifecycle;

/// A position that does not exist in the current markup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MarkupError {
    /// The path does not name a node.
    #[error("no node at path {0:?}")]
    InvalidPath(Vec<usize>),

    /// The offset is past the end of its container.
    #[error("offset {offset} out of bounds for container of length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },

    /// Text offset past the end of the content.
    #[error("text offset {offset} past end of content ({len} chars)")]
    TextOffsetOutOfBounds { offset: usize, len: usize },
}

/// An illegal lifecycle transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LifecycleError {
    #[error("cannot {action} while {from:?}")]
    InvalidTransition {
        from: Lifecycle,
        action: &'static str,
    },
}

/// Invalid editor configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("history depth must be at least 1")]
    ZeroHistoryDepth,

    #[error("span class must not be empty")]
    EmptyClass,

    #[error("addition and deletion classes must differ (both are {0:?})")]
    SameClasses(String),

    #[error("span class {0:?} must be a single class name")]
    InvalidClass(String),
}
