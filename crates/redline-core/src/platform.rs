//! Platform abstraction traits for caret handling.
//!
//! The engine keeps its own selection in tree coordinates. A platform layer
//! (the browser DOM in `redline-browser`) reads the live selection into it
//! before each edit and writes the engine's caret back afterwards.

use thiserror::Error;

use crate::types::Selection;

/// Error type for platform operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Writes the engine's selection to the platform UI.
pub trait CursorPlatform {
    /// Place the platform caret or selection at `selection`.
    fn restore_selection(&self, selection: &Selection) -> Result<(), PlatformError>;
}

/// Reads the platform UI's selection back into tree coordinates.
///
/// This is the inverse of [`CursorPlatform`].
pub trait CursorSync {
    /// Current platform selection, or `None` when it is outside the editor.
    fn read_selection(&self) -> Option<Selection>;
}
