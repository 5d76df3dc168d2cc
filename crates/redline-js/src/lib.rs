//! WASM bindings for the redline track-changes editor.
//!
//! Provides an embeddable editor handle for JavaScript/TypeScript apps. The
//! host creates a `JsRedlineEditor` with the seed markup, mounts it on a
//! container element, forwards the container's `beforeinput`, `keydown`,
//! `composition*` and `selectionchange` events, and reads back the markup and
//! final text for persistence.

mod actions;
mod editor;
mod events;
mod types;

pub use actions::*;
pub use editor::*;
pub use events::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        use tracing::Level;
        use tracing::subscriber::set_global_default;
        use tracing_subscriber::Registry;
        use tracing_subscriber::layer::SubscriberExt;

        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };
        let wasm_layer = tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(console_level)
                .build(),
        );

        // The host may have installed its own subscriber already.
        let _ = set_global_default(Registry::default().with(wasm_layer));
    }
}
