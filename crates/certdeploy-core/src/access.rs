//! Access credential records and their repository.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::{Error, Result};

/// A stored credential: which access kind it is for, and its fields.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Access kind, e.g. `tencentcloud`.
    pub provider: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl AccessRecord {
    pub fn new(id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            provider: provider.into(),
            config: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Get a string field of the credential.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(|v| v.as_str())
    }
}

impl fmt::Debug for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("fields", &self.config.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Lookup boundary of the credential store.
#[async_trait]
pub trait AccessRepository: Send + Sync {
    /// Get an access record by id.
    async fn get_by_id(&self, id: &str) -> Result<AccessRecord>;
}

/// Access records held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccessRepository {
    records: HashMap<String, AccessRecord>,
}

impl MemoryAccessRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: AccessRecord) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<AccessRecord> for MemoryAccessRepository {
    fn from_iter<I: IntoIterator<Item = AccessRecord>>(iter: I) -> Self {
        let mut repo = Self::new();
        for record in iter {
            repo.insert(record);
        }
        repo
    }
}

#[async_trait]
impl AccessRepository for MemoryAccessRepository {
    async fn get_by_id(&self, id: &str) -> Result<AccessRecord> {
        if id.is_empty() {
            return Err(Error::missing("providerAccessId"));
        }

        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("access #{}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_repository_lookup() {
        let repo: MemoryAccessRepository = [AccessRecord::new("a1", "tencentcloud")
            .with_field("secretId", "AKID")
            .with_field("secretKey", "shh")]
        .into_iter()
        .collect();

        let record = repo.get_by_id("a1").await.unwrap();
        assert_eq!(record.provider, "tencentcloud");
        assert_eq!(record.get("secretId"), Some("AKID"));

        let err = repo.get_by_id("missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_debug_hides_values() {
        let record = AccessRecord::new("a1", "kong").with_field("apiToken", "secret-token");
        let debug = format!("{:?}", record);
        assert!(debug.contains("apiToken"));
        assert!(!debug.contains("secret-token"));
    }
}
