//! Editor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::markup::SpanClasses;

/// Per-instance editor settings.
///
/// Deserializes from a host-supplied object with camelCase keys; any key left
/// out takes its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Keystrokes closer together than this share one undo entry.
    pub batch_window_ms: u64,
    /// Maximum number of undo entries; the oldest is evicted first.
    pub history_depth: usize,
    /// Class marking addition spans.
    pub addition_class: String,
    /// Class marking deletion spans.
    pub deletion_class: String,
    /// Restore the caret along with the markup on undo and redo.
    pub restore_caret: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            batch_window_ms: 300,
            history_depth: 50,
            addition_class: "tc-ins".to_string(),
            deletion_class: "tc-del".to_string(),
            restore_caret: true,
        }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_depth == 0 {
            return Err(ConfigError::ZeroHistoryDepth);
        }
        for class in [&self.addition_class, &self.deletion_class] {
            if class.is_empty() {
                return Err(ConfigError::EmptyClass);
            }
            if class.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidClass(class.clone()));
            }
        }
        if self.addition_class == self.deletion_class {
            return Err(ConfigError::SameClasses(self.addition_class.clone()));
        }
        Ok(())
    }

    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(self.batch_window_ms)
    }

    pub fn span_classes(&self) -> SpanClasses {
        SpanClasses::new(self.addition_class.as_str(), self.deletion_class.as_str())
    }
}
