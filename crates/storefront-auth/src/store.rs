use std::collections::HashMap;

use parking_lot::Mutex;

/// Named string slots persisted on the client (`localStorage` in browsers).
///
/// Slot values are opaque encrypted blobs; the store never interprets them.
pub trait CredentialStore: Send + Sync {
    fn get(&self, slot: &str) -> Option<String>;
    fn set(&self, slot: &str, value: &str);
    fn remove(&self, slot: &str);
}

/// In-memory store for native hosts and tests.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, slot: &str) -> Option<String> {
        self.slots.lock().get(slot).cloned()
    }

    fn set(&self, slot: &str, value: &str) {
        self.slots.lock().insert(slot.to_string(), value.to_string());
    }

    fn remove(&self, slot: &str) {
        self.slots.lock().remove(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get("auth_token").is_none());
        store.set("auth_token", "blob");
        assert_eq!(store.get("auth_token").as_deref(), Some("blob"));
        store.remove("auth_token");
        assert!(store.get("auth_token").is_none());
    }
}
