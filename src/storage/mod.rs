//! Key-value persistence for the best score
//!
//! The session reads the best score once at startup and writes it through on
//! every improvement. Failures are reported to the caller, which decides how
//! loud to be about them; the game itself never depends on a write landing.

pub mod json_file;

use std::collections::HashMap;
use std::path::PathBuf;

pub use json_file::JsonFileStore;

/// Key under which the best score lives
pub const BEST_SCORE_KEY: &str = "best_score";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed score file {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A minimal string-keyed store of non-negative integers
pub trait ScoreStore {
    fn get(&self, key: &str) -> Result<Option<u32>, StoreError>;
    fn set(&mut self, key: &str, value: u32) -> Result<(), StoreError>;
}

impl<T: ScoreStore + ?Sized> ScoreStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<u32>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: u32) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Process-local store; nothing survives a restart
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a best score
    pub fn with_best_score(score: u32) -> Self {
        let mut store = Self::new();
        store.values.insert(BEST_SCORE_KEY.to_string(), score);
        store
    }
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<u32>, StoreError> {
        Ok(self.values.get(key).copied())
    }

    fn set(&mut self, key: &str, value: u32) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get(BEST_SCORE_KEY).unwrap(), None);

        store.set(BEST_SCORE_KEY, 12).unwrap();
        assert_eq!(store.get(BEST_SCORE_KEY).unwrap(), Some(12));
        assert_eq!(store.get("other").unwrap(), None);
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn ScoreStore> = Box::new(MemoryStore::with_best_score(4));
        assert_eq!(store.get(BEST_SCORE_KEY).unwrap(), Some(4));
        store.set(BEST_SCORE_KEY, 9).unwrap();
        assert_eq!(store.get(BEST_SCORE_KEY).unwrap(), Some(9));
    }
}
