//! Platform detection for the history shortcuts.
//!
//! The only fact the editor branches on is which modifier is the primary
//! shortcut key.

use std::sync::OnceLock;

/// Cached platform detection results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Platform {
    pub ios: bool,
    pub mac: bool,
}

impl Platform {
    /// Cmd is the shortcut modifier on Apple platforms, Ctrl elsewhere.
    pub fn uses_meta_shortcuts(&self) -> bool {
        self.mac || self.ios
    }
}

static PLATFORM: OnceLock<Platform> = OnceLock::new();

/// Get cached platform info. Detection runs once on first call.
pub fn platform() -> &'static Platform {
    PLATFORM.get_or_init(detect_platform)
}

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
fn detect_platform() -> Platform {
    let Some(window) = web_sys::window() else {
        return Platform::default();
    };
    let navigator = window.navigator();
    let user_agent = navigator.user_agent().unwrap_or_default().to_lowercase();
    let platform_str = navigator.platform().unwrap_or_default().to_lowercase();
    classify(&user_agent, &platform_str, navigator.max_touch_points() > 0)
}

#[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
fn detect_platform() -> Platform {
    Platform::default()
}

/// Classify a lowercased user agent and `navigator.platform`.
pub fn classify(user_agent: &str, platform_str: &str, touch: bool) -> Platform {
    // iPadOS reports a Mac platform; touch support gives it away.
    let ios = user_agent.contains("iphone")
        || user_agent.contains("ipad")
        || user_agent.contains("ipod")
        || (platform_str.contains("mac") && touch);
    Platform {
        ios,
        mac: platform_str.contains("mac") && !ios,
    }
}
