use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::ComponentAdapter;
use crate::key::Key;

/// Adapters by key, iterated in registration order.
#[derive(Debug, Default)]
pub struct AdapterMap {
    entries: Vec<Arc<ComponentAdapter>>,
    index: HashMap<Key, usize>,
}

impl AdapterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `adapter` unless its key is taken, in which case the adapter
    /// is handed back.
    pub fn insert(
        &mut self,
        adapter: ComponentAdapter,
    ) -> Result<&ComponentAdapter, ComponentAdapter> {
        if self.index.contains_key(adapter.key()) {
            return Err(adapter);
        }
        self.index.insert(adapter.key().clone(), self.entries.len());
        self.entries.push(Arc::new(adapter));
        Ok(self.entries[self.entries.len() - 1].as_ref())
    }

    pub fn get(&self, key: &Key) -> Option<&Arc<ComponentAdapter>> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ComponentAdapter>> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
