//! Theme Controller
//!
//! Resolves and persists the binary light/dark display theme. The active
//! theme is a process-wide flag every renderer reads when picking
//! colors; because chart colors cannot be changed in place, toggling
//! reports whether the caller should rebuild a live chart.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::store::{Store, StoreError, THEME_KEY};

/// Binary display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse a stored preference; anything unknown is ignored.
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// State of the visible theme indicator controls (menu glyph, label and
/// checkbox), derived from the active theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeIndicator {
    pub glyph: &'static str,
    /// Names the mode the control switches to.
    pub label: &'static str,
    pub checked: bool,
}

/// Owns the active-theme flag and its persistence.
pub struct ThemeController {
    store: Arc<RwLock<Store>>,
    // false = light, true = dark
    dark: AtomicBool,
}

impl ThemeController {
    pub fn new(store: Arc<RwLock<Store>>) -> Self {
        Self {
            store,
            dark: AtomicBool::new(false),
        }
    }

    /// Startup resolution: explicit stored preference, else the
    /// environment's reported color scheme, else light.
    pub async fn load(&self) {
        let stored = {
            let store = self.store.read().await;
            store.get(THEME_KEY).map(str::to_string)
        };
        let theme = resolve(stored.as_deref(), system_preference());
        self.apply(theme);
    }

    /// Set the active theme flag. Idempotent: applying the current theme
    /// again changes nothing.
    pub fn apply(&self, theme: Theme) {
        self.dark.store(theme == Theme::Dark, Ordering::Relaxed);
    }

    pub fn active(&self) -> Theme {
        if self.dark.load(Ordering::Relaxed) {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Flip the active theme and persist the new preference.
    ///
    /// Returns the new theme; when the current view holds a history
    /// chart the caller must refresh it so the chart is rebuilt with the
    /// new palette.
    pub async fn toggle(&self) -> Result<Theme, StoreError> {
        let next = self.active().flipped();
        self.store
            .write()
            .await
            .set(THEME_KEY, next.as_str())?;
        self.apply(next);
        Ok(next)
    }

    /// Indicator controls for the active theme.
    pub fn indicator(&self) -> ThemeIndicator {
        match self.active() {
            Theme::Dark => ThemeIndicator {
                glyph: "🌕",
                label: "Light mode",
                checked: true,
            },
            Theme::Light => ThemeIndicator {
                glyph: "🌓",
                label: "Dark mode",
                checked: false,
            },
        }
    }
}

/// Stored preference wins over the environment's scheme; light is the
/// final fallback.
fn resolve(stored: Option<&str>, system: Option<Theme>) -> Theme {
    stored
        .and_then(Theme::from_str)
        .or(system)
        .unwrap_or(Theme::Light)
}

/// Color scheme reported by the operating environment, if any.
///
/// `GLICEMIA_COLOR_SCHEME` is checked first, then the `COLORFGBG`
/// convention some terminals export (dark background codes).
fn system_preference() -> Option<Theme> {
    if let Ok(scheme) = std::env::var("GLICEMIA_COLOR_SCHEME") {
        if let Some(theme) = Theme::from_str(&scheme) {
            return Some(theme);
        }
    }

    let colorfgbg = std::env::var("COLORFGBG").ok()?;
    let bg = colorfgbg.rsplit(';').next()?;
    match bg {
        "0" | "1" | "2" | "3" | "4" | "5" | "6" | "8" => Some(Theme::Dark),
        "7" | "9" | "10" | "11" | "12" | "13" | "14" | "15" => Some(Theme::Light),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> Arc<RwLock<Store>> {
        let path = tempdir().unwrap().into_path().join("store.toml");
        Arc::new(RwLock::new(Store::open(path).unwrap()))
    }

    #[test]
    fn resolution_order() {
        assert_eq!(resolve(Some("dark"), None), Theme::Dark);
        assert_eq!(resolve(Some("light"), Some(Theme::Dark)), Theme::Light);
        assert_eq!(resolve(None, Some(Theme::Dark)), Theme::Dark);
        assert_eq!(resolve(None, None), Theme::Light);
        // Garbage in the store falls through to the system preference.
        assert_eq!(resolve(Some("sepia"), Some(Theme::Dark)), Theme::Dark);
    }

    #[tokio::test]
    async fn toggle_persists_flipped_theme() {
        let store = store();
        let controller = ThemeController::new(Arc::clone(&store));
        controller.apply(Theme::Light);

        assert_eq!(controller.toggle().await.unwrap(), Theme::Dark);
        assert_eq!(store.read().await.get(THEME_KEY), Some("dark"));

        assert_eq!(controller.toggle().await.unwrap(), Theme::Light);
        assert_eq!(store.read().await.get(THEME_KEY), Some("light"));
    }

    #[tokio::test]
    async fn apply_is_idempotent() {
        let controller = ThemeController::new(store());
        controller.apply(Theme::Dark);
        let first = controller.indicator();
        controller.apply(Theme::Dark);
        assert_eq!(controller.active(), Theme::Dark);
        assert_eq!(controller.indicator(), first);
    }

    #[tokio::test]
    async fn load_prefers_stored_theme() {
        let store = store();
        store.write().await.set(THEME_KEY, "dark").unwrap();

        let controller = ThemeController::new(Arc::clone(&store));
        controller.load().await;
        assert_eq!(controller.active(), Theme::Dark);
    }

    #[test]
    fn indicator_tracks_theme() {
        let controller = ThemeController::new(store());
        controller.apply(Theme::Dark);
        assert!(controller.indicator().checked);
        assert_eq!(controller.indicator().label, "Light mode");

        controller.apply(Theme::Light);
        assert!(!controller.indicator().checked);
        assert_eq!(controller.indicator().label, "Dark mode");
    }
}
