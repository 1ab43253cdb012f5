//! Ordered collection of adapters, looked up by client.

use super::{ClientAdapter, ConfigAdapter};
use crate::core::ClientKind;
use crate::paths::CLIENT_PROFILES;
use std::sync::Arc;

/// Immutable, explicitly constructed set of adapters.
///
/// Adapters are reference counted so the service can move one into a
/// blocking task for the duration of a mutation.
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn ClientAdapter>>,
}

impl AdapterRegistry {
    /// Registry over the given adapters, kept in order.
    pub fn new(adapters: Vec<Arc<dyn ClientAdapter>>) -> Self {
        Self { adapters }
    }

    /// One [`ConfigAdapter`] per row of the Path Candidate Table.
    pub fn with_default_adapters() -> Self {
        Self::new(
            CLIENT_PROFILES
                .iter()
                .map(|profile| Arc::new(ConfigAdapter::new(profile)) as Arc<dyn ClientAdapter>)
                .collect(),
        )
    }

    /// Adapters in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ClientAdapter>> {
        self.adapters.iter()
    }

    /// Adapter for one client.
    pub fn get(&self, client: ClientKind) -> Option<Arc<dyn ClientAdapter>> {
        self.adapters.iter().find(|a| a.client() == client).cloned()
    }
}
