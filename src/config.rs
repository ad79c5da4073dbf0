//! Store configuration supplied by the host as JSON.

use serde::{Deserialize, Serialize};

pub const DEFAULT_DB_PATH: &str = "clip_notes";
pub const DEFAULT_STORAGE_KEY: &str = "notes";
pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;
pub const DEFAULT_MAX_TEXT_CHARS: usize = 10_000;

/// Settings for opening a note store.
///
/// Every field has a default, so `{}` is a valid configuration:
///
/// ```rust
/// use clip_notes_core::config::StoreConfig;
///
/// let config = StoreConfig::from_json(r#"{"db_path":"/tmp/my_notes"}"#)?;
/// assert_eq!(config.db_path, "/tmp/my_notes");
/// assert_eq!(config.storage_key, "notes");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base path of the LMDB environment; the directory `<db_path>.lmdb`
    /// is created on open.
    pub db_path: String,

    /// Key the whole note collection is persisted under.
    pub storage_key: String,

    /// LMDB map size in bytes.
    pub map_size: usize,

    /// Longest note text accepted by validation, in characters.
    pub max_text_chars: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            db_path: DEFAULT_DB_PATH.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            map_size: DEFAULT_MAP_SIZE,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

impl StoreConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn lmdb_dir(&self) -> String {
        format!("{}.lmdb", self.db_path)
    }
}
