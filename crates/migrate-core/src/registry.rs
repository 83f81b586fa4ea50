//! Process-wide migrator registry.
//!
//! Keys are composed as `"{type}:{from}:{to}"`. Registration replaces any
//! prior entry for the same key (last writer wins — tests rely on this).
//! Lookup is `O(1)`. The registry is read-only after initialization; tests
//! that mutate it take a [`RegistrySnapshot`] first and restore it after.

use std::collections::HashMap;
use std::sync::Arc;

use crate::transformer::ResourceTransformer;
use crate::version::VersionId;

fn key(resource_type: &str, source: &VersionId, target: &VersionId) -> String {
    format!("{resource_type}:{source}:{target}")
}

/// A saved copy of a [`Registry`]'s entries, for test-only restore.
#[derive(Clone)]
pub struct RegistrySnapshot {
    entries: HashMap<String, Arc<dyn ResourceTransformer>>,
    order: Vec<Arc<dyn ResourceTransformer>>,
}

/// Maps `(resource_type, source_version, target_version)` to the migrator
/// that handles that schema diff.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, Arc<dyn ResourceTransformer>>,
    /// Every registered transformer in registration order, for the
    /// `Preprocess` handler (preprocessors run in registration order). Not
    /// deduplicated on replace; `preprocessors()` dedupes by pointer
    /// identity so a migrator registered under several triples only
    /// contributes its string rewrite once.
    order: Vec<Arc<dyn ResourceTransformer>>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the migrator for one triple.
    pub fn register(
        &mut self,
        resource_type: impl Into<String>,
        source: impl Into<VersionId>,
        target: impl Into<VersionId>,
        transformer: Arc<dyn ResourceTransformer>,
    ) {
        let resource_type = resource_type.into();
        let source = source.into();
        let target = target.into();
        self.order.push(Arc::clone(&transformer));
        self.entries.insert(key(&resource_type, &source, &target), transformer);
    }

    /// Every distinct registered transformer, in registration order,
    /// deduplicated by identity. Feeds the `Preprocess` handler.
    #[must_use]
    pub fn preprocessors(&self) -> Vec<Arc<dyn ResourceTransformer>> {
        let mut seen: Vec<*const ()> = Vec::new();
        let mut result = Vec::new();
        for transformer in &self.order {
            let ptr = Arc::as_ptr(transformer).cast::<()>();
            if !seen.contains(&ptr) {
                seen.push(ptr);
                result.push(Arc::clone(transformer));
            }
        }
        result
    }

    /// Look up the migrator for one triple, if registered.
    #[must_use]
    pub fn lookup(
        &self,
        resource_type: &str,
        source: &VersionId,
        target: &VersionId,
    ) -> Option<Arc<dyn ResourceTransformer>> {
        self.entries.get(&key(resource_type, source, target)).cloned()
    }

    /// All migrators registered for the given version pair, regardless of
    /// resource type.
    #[must_use]
    pub fn all(&self, source: &VersionId, target: &VersionId) -> Vec<Arc<dyn ResourceTransformer>> {
        let suffix = format!(":{source}:{target}");
        self.entries
            .iter()
            .filter(|(k, _)| k.ends_with(&suffix))
            .map(|(_, v)| Arc::clone(v))
            .collect()
    }

    /// Migrators registered for the given version pair, restricted to a set
    /// of resource types.
    #[must_use]
    pub fn all_for_types(
        &self,
        source: &VersionId,
        target: &VersionId,
        types: &[&str],
    ) -> Vec<Arc<dyn ResourceTransformer>> {
        types
            .iter()
            .filter_map(|t| self.lookup(t, source, target))
            .collect()
    }

    /// Number of registered triples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot the current entries for later restore.
    ///
    /// Test-only contract: the registry is mutable only during
    /// initialization; a test that needs a different set of migrators
    /// should snapshot, mutate, assert, then restore.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            entries: self.entries.clone(),
            order: self.order.clone(),
        }
    }

    /// Restore entries previously captured by [`snapshot`](Self::snapshot).
    pub fn restore(&mut self, snapshot: RegistrySnapshot) {
        self.entries = snapshot.entries;
        self.order = snapshot.order;
    }
}
