//! # Process Instances and Collaborations
//!
//! Running executions of a [`ProcessDefinition`] together with the
//! collaboration they may participate in. Both are read-only from the
//! dispatch layer: it queries membership and data stores, never writes them.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::{DataStoreError, ProcessDefinition};

/// Payload mapping of field name to value
pub type DataMap = Map<String, Value>;

/// Unique key of a running process instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceKey(String);

impl InstanceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Fresh random key for newly created instances
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for InstanceKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Read access to an instance's data store
///
/// Engines back this with whatever storage they use; reads may fail.
pub trait DataStore: Send + Sync {
    /// Snapshot of the full data store
    fn get_data(&self) -> Result<DataMap, DataStoreError>;
}

/// In-memory data store
#[derive(Debug, Default)]
pub struct MemoryDataStore {
    data: RwLock<DataMap>,
}

impl MemoryDataStore {
    pub fn new(data: DataMap) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Engine-side write; the dispatch layer never calls this
    pub fn put(&self, key: impl Into<String>, value: Value) {
        self.data.write().insert(key.into(), value);
    }
}

impl DataStore for MemoryDataStore {
    fn get_data(&self) -> Result<DataMap, DataStoreError> {
        Ok(self.data.read().clone())
    }
}

/// A set of correlated instances exchanging signals and messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaboration {
    pub id: String,
    instances: Vec<InstanceKey>,
}

impl Collaboration {
    pub fn new(id: impl Into<String>, instances: impl IntoIterator<Item = InstanceKey>) -> Self {
        Self {
            id: id.into(),
            instances: instances.into_iter().collect(),
        }
    }

    /// Keys of every participating instance, in membership order
    pub fn instance_keys(&self) -> &[InstanceKey] {
        &self.instances
    }

    pub fn contains(&self, key: &InstanceKey) -> bool {
        self.instances.contains(key)
    }
}

/// One running execution of a process definition
pub struct ProcessInstance {
    key: InstanceKey,
    definition: Arc<ProcessDefinition>,
    collaboration: Option<Arc<Collaboration>>,
    data_store: Arc<dyn DataStore>,
}

impl ProcessInstance {
    pub fn new(key: InstanceKey, definition: Arc<ProcessDefinition>) -> Self {
        Self {
            key,
            definition,
            collaboration: None,
            data_store: Arc::new(MemoryDataStore::default()),
        }
    }

    pub fn with_collaboration(mut self, collaboration: Arc<Collaboration>) -> Self {
        self.collaboration = Some(collaboration);
        self
    }

    pub fn with_data_store(mut self, data_store: Arc<dyn DataStore>) -> Self {
        self.data_store = data_store;
        self
    }

    pub fn with_data(self, data: DataMap) -> Self {
        self.with_data_store(Arc::new(MemoryDataStore::new(data)))
    }

    pub fn key(&self) -> &InstanceKey {
        &self.key
    }

    /// Definition this instance executes
    pub fn definition(&self) -> &Arc<ProcessDefinition> {
        &self.definition
    }

    /// Collaboration this instance participates in, if any
    pub fn collaboration(&self) -> Option<&Arc<Collaboration>> {
        self.collaboration.as_ref()
    }

    pub fn data_store(&self) -> &Arc<dyn DataStore> {
        &self.data_store
    }
}

impl fmt::Debug for ProcessInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessInstance")
            .field("key", &self.key)
            .field("definition", &self.definition.id)
            .field("collaboration", &self.collaboration.as_ref().map(|c| &c.id))
            .field("data_store", &"<Arc<dyn DataStore>>".to_string())
            .finish()
    }
}
