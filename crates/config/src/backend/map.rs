//! In-memory backend

use std::collections::HashMap;

use async_trait::async_trait;

use super::Backend;
use crate::core::{BackendError, BackendResult, LoadContext};

/// Backend serving values from a map held in memory
#[derive(Debug, Clone)]
pub struct MapBackend {
    name: String,
    values: HashMap<String, String>,
}

impl MapBackend {
    /// Create an empty backend named `memory`
    pub fn new() -> Self {
        Self::named("memory")
    }

    /// Create an empty backend with a custom name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    /// Add a value
    #[must_use = "builder methods must be chained or built"]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the backend holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for MapBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for MapBackend
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut backend = Self::new();
        for (key, value) in iter {
            backend.insert(key, value);
        }
        backend
    }
}

#[async_trait]
impl Backend for MapBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _ctx: &LoadContext, key: &str) -> BackendResult<Vec<u8>> {
        self.values
            .get(key)
            .map(|value| value.clone().into_bytes())
            .ok_or(BackendError::NotFound)
    }
}
