//! crates/alttrack_core/src/preferences.rs
//!
//! The persisted light/dark theme preference.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

use crate::observable::Observable;
use crate::ports::{KeyValueStore, StorageWrite};

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
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

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

pub struct ThemeStore {
    storage: Arc<dyn KeyValueStore>,
    state: Observable<Theme>,
}

impl ThemeStore {
    /// Reads the saved theme; anything unreadable falls back to light.
    pub async fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let theme = match storage.get(THEME_KEY).await {
            Ok(Some(value)) => Theme::parse(&value).unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "Could not read the saved theme");
                Theme::default()
            }
        };

        Self {
            storage,
            state: Observable::new(theme),
        }
    }

    pub fn current(&self) -> Theme {
        self.state.get()
    }

    pub async fn set(&self, theme: Theme) {
        self.state.set(theme);
        if let Err(e) = self
            .storage
            .apply(&[StorageWrite::put(THEME_KEY, theme.as_str())])
            .await
        {
            warn!(error = %e, theme = theme.as_str(), "Could not save the theme");
        }
    }

    pub async fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.set(next).await;
        next
    }

    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.state.subscribe()
    }
}
