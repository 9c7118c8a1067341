//! Shared Memory (C1): a process-wide, thread-safe string-keyed store for
//! values passed between tools and agents within and across runs.
//!
//! Backed by `dashmap::DashMap` so distinct keys genuinely don't contend on
//! one lock, satisfying the "writes to distinct keys are independent"
//! contract under concurrent access.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

/// Operations never fail — there is no `Result` anywhere in this crate's
/// public API.
#[derive(Debug, Clone, Default)]
pub struct SharedMemory {
    inner: Arc<DashMap<String, Value>>,
}

impl SharedMemory {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Overwrites; never fails.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.inner.insert(key.into(), value);
    }

    /// Never fails; returns `None` if unset.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key).map(|entry| entry.value().clone())
    }

    /// Idempotent.
    pub fn delete(&self, key: &str) {
        self.inner.remove(key);
    }

    /// Returns a defensive copy.
    pub fn snapshot(&self) -> std::collections::HashMap<String, Value> {
        self.inner
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// A view of this memory whose keys are transparently prefixed with
    /// `session_id` — lets a run scope its own keys without the store itself
    /// knowing about runs.
    pub fn namespaced(&self, session_id: impl Into<String>) -> NamespacedMemory {
        NamespacedMemory {
            memory: self.clone(),
            prefix: format!("{}::", session_id.into()),
        }
    }
}

/// A session-scoped view over a `SharedMemory`. Cheap to create, cheap to
/// clone — it just carries a prefix string alongside the shared handle.
#[derive(Debug, Clone)]
pub struct NamespacedMemory {
    memory: SharedMemory,
    prefix: String,
}

impl NamespacedMemory {
    pub fn set(&self, key: &str, value: Value) {
        self.memory.set(format!("{}{key}", self.prefix), value);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.memory.get(&format!("{}{key}", self.prefix))
    }

    pub fn delete(&self, key: &str) {
        self.memory.delete(&format!("{}{key}", self.prefix));
    }

    /// Snapshot restricted to this namespace, with the prefix stripped back off.
    pub fn snapshot(&self) -> std::collections::HashMap<String, Value> {
        self.memory
            .snapshot()
            .into_iter()
            .filter_map(|(k, v)| k.strip_prefix(&self.prefix).map(|k| (k.to_string(), v)))
            .collect()
    }

    /// Escape hatch back to the unscoped store, e.g. for tools that
    /// deliberately want to share state across sessions.
    pub fn shared(&self) -> &SharedMemory {
        &self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_then_get_returns_latest_write() {
        let mem = SharedMemory::new();
        mem.set("a", json!(1));
        mem.set("a", json!(2));
        assert_eq!(mem.get("a"), Some(json!(2)));
    }

    #[test]
    fn get_on_missing_key_is_none() {
        let mem = SharedMemory::new();
        assert_eq!(mem.get("missing"), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let mem = SharedMemory::new();
        mem.set("k", json!("v"));
        mem.delete("k");
        mem.delete("k");
        assert_eq!(mem.get("k"), None);
    }

    #[test]
    fn snapshot_is_a_defensive_copy() {
        let mem = SharedMemory::new();
        mem.set("k", json!("v"));
        let snap = mem.snapshot();
        mem.set("k", json!("changed"));
        assert_eq!(snap.get("k"), Some(&json!("v")));
        assert_eq!(mem.get("k"), Some(json!("changed")));
    }

    #[test]
    fn namespaced_views_do_not_collide() {
        let mem = SharedMemory::new();
        let a = mem.namespaced("session-a");
        let b = mem.namespaced("session-b");
        a.set("k", json!(1));
        b.set("k", json!(2));
        assert_eq!(a.get("k"), Some(json!(1)));
        assert_eq!(b.get("k"), Some(json!(2)));
    }

    #[test]
    fn namespaced_snapshot_strips_prefix() {
        let mem = SharedMemory::new();
        let ns = mem.namespaced("sess");
        ns.set("k", json!("v"));
        mem.set("unrelated", json!("other"));
        let snap = ns.snapshot();
        assert_eq!(snap.get("k"), Some(&json!("v")));
        assert_eq!(snap.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_writes_to_distinct_keys_are_independent() {
        let mem = SharedMemory::new();
        let mut handles = Vec::new();
        for i in 0..50 {
            let mem = mem.clone();
            handles.push(tokio::spawn(async move {
                mem.set(format!("k{i}"), json!(i));
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(mem.len(), 50);
        for i in 0..50 {
            assert_eq!(mem.get(&format!("k{i}")), Some(json!(i)));
        }
    }
}
