//! Local persistent store.
//!
//! A string-valued key-value store that survives restarts, modelled on
//! browser local storage. The history log and the theme preference are the
//! only writers.

mod memory;

pub use memory::MemoryKeyValueStore;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Key of the persisted theme preference.
pub const THEME_KEY: &str = "theme";

/// Key of the persisted prediction history.
pub const HISTORY_KEY: &str = "predictionHistory";

/// An abstract key-value store.
///
/// # Implementation Notes
///
/// - `set` must be atomic: after it returns, readers observe either the old
///   or the new value in full, never a partial write.
/// - Write failures (including quota violations) are reported as
///   `MedscanError::Persistence`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Reads and deserializes the JSON value under `key`.
///
/// - `Ok(None)`: nothing stored
/// - `Err(Serialization)`: stored value is not valid JSON for `T`
pub async fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serializes `value` as JSON and writes it under `key`.
pub async fn save_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()>
where
    T: Serialize + Sync + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, raw).await
}
