//! Display theme preference.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};

use crate::error::Result;
use crate::store::{self, KeyValueStore, THEME_KEY};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// The persisted theme, loaded once at startup and written through on change.
pub struct ThemePreference {
    theme: Theme,
    store: Arc<dyn KeyValueStore>,
}

impl ThemePreference {
    /// Restores the theme from `store`, defaulting to dark when it is absent
    /// or unreadable.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let theme = match store::load_json::<Theme>(store.as_ref(), THEME_KEY).await {
            Ok(theme) => theme.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable theme preference");
                Theme::default()
            }
        };
        Self { theme, store }
    }

    pub fn current(&self) -> Theme {
        self.theme
    }

    /// Switches between light and dark and persists the new value.
    ///
    /// The in-memory theme changes even when the write fails.
    pub async fn toggle(&mut self) -> Result<Theme> {
        self.set(self.theme.toggled()).await?;
        Ok(self.theme)
    }

    pub async fn set(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        store::save_json(self.store.as_ref(), THEME_KEY, &theme).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKeyValueStore;

    #[tokio::test]
    async fn test_defaults_to_dark() {
        let preference = ThemePreference::load(Arc::new(MemoryKeyValueStore::new())).await;
        assert_eq!(preference.current(), Theme::Dark);
    }

    #[tokio::test]
    async fn test_unparseable_value_defaults_to_dark() {
        let store = Arc::new(MemoryKeyValueStore::with_entries([(THEME_KEY, "\"sepia\"")]));
        let preference = ThemePreference::load(store).await;
        assert_eq!(preference.current(), Theme::Dark);
    }

    #[tokio::test]
    async fn test_toggle_persists() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let mut preference = ThemePreference::load(store.clone()).await;

        assert_eq!(preference.toggle().await.unwrap(), Theme::Light);
        assert_eq!(
            store.get(THEME_KEY).await.unwrap().as_deref(),
            Some("\"light\"")
        );

        let reloaded = ThemePreference::load(store.clone()).await;
        assert_eq!(reloaded.current(), Theme::Light);

        let mut reloaded = reloaded;
        assert_eq!(reloaded.toggle().await.unwrap(), Theme::Dark);
    }
}
