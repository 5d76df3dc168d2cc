//! Types exposed to JavaScript via wasm-bindgen.

use redline_browser::{ChangeStats, Lifecycle, RevisionSnapshot};
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// The fields a host persists for a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsRevision {
    /// Annotated markup with tracked changes.
    pub markup: String,
    /// Text with every change accepted.
    pub final_text: String,
    pub modified: bool,
}

impl From<RevisionSnapshot> for JsRevision {
    fn from(snapshot: RevisionSnapshot) -> Self {
        Self {
            markup: snapshot.markup,
            final_text: snapshot.final_text,
            modified: snapshot.modified,
        }
    }
}

/// Counts of tracked-change spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsChangeStats {
    pub additions: usize,
    pub deletions: usize,
}

impl From<ChangeStats> for JsChangeStats {
    fn from(stats: ChangeStats) -> Self {
        Self {
            additions: stats.additions,
            deletions: stats.deletions,
        }
    }
}

/// Editor lifecycle state.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsLifecycle {
    Seeded,
    Editing,
    ReadOnly,
}

impl From<Lifecycle> for JsLifecycle {
    fn from(lifecycle: Lifecycle) -> Self {
        match lifecycle {
            Lifecycle::Seeded => JsLifecycle::Seeded,
            Lifecycle::Editing => JsLifecycle::Editing,
            Lifecycle::ReadOnly => JsLifecycle::ReadOnly,
        }
    }
}
