use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::errors::Error;

use super::{ACCESS_TOKEN_KEY, CredentialStore, REFRESH_TOKEN_KEY};

/// In-process store, the default for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a credential pair.
    pub fn with_tokens(access_token: Option<&str>, refresh_token: Option<&str>) -> Self {
        let mut entries = HashMap::new();
        if let Some(access) = access_token {
            entries.insert(ACCESS_TOKEN_KEY.to_string(), access.to_string());
        }
        if let Some(refresh) = refresh_token {
            entries.insert(REFRESH_TOKEN_KEY.to_string(), refresh.to_string());
        }
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Result<HashMap<String, String>, Error> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, Error> {
        self.entries
            .lock()
            .map_err(|_| Error::Store("memory store lock poisoned".into()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn store_pair(&self, access_token: &str, refresh_token: Option<&str>) -> Result<(), Error> {
        let mut entries = self.lock()?;
        entries.insert(ACCESS_TOKEN_KEY.to_string(), access_token.to_string());
        if let Some(refresh) = refresh_token {
            entries.insert(REFRESH_TOKEN_KEY.to_string(), refresh.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        let mut entries = self.lock()?;
        entries.remove(ACCESS_TOKEN_KEY);
        entries.remove(REFRESH_TOKEN_KEY);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_pair_keeps_existing_refresh_token_when_not_rotated() {
        let store = MemoryCredentialStore::with_tokens(Some("old"), Some("R"));
        store.store_pair("new", None).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("new"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("R"));
    }

    #[test]
    fn clear_removes_both_tokens_only() {
        let store = MemoryCredentialStore::with_tokens(Some("A"), Some("R"));
        store.set("theme", "dark").unwrap();
        store.clear().unwrap();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("theme").map(String::as_str), Some("dark"));
    }
}
