use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::errors::Error;

use super::{ACCESS_TOKEN_KEY, CredentialStore, REFRESH_TOKEN_KEY};

/// Store persisted as a JSON object on disk, written through on every mutation.
///
/// A missing file reads as an empty (logged out) store.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `creds.json` stages through `creds.json.tmp`, so stores that share a stem
    /// never share a staging file.
    fn tmp_path(&self) -> Result<PathBuf, Error> {
        let Some(name) = self.path.file_name() else {
            return Err(Error::Store(format!(
                "credential path '{}' has no file name",
                self.path.display()
            )));
        };
        let mut name = name.to_os_string();
        name.push(".tmp");
        Ok(self.path.with_file_name(name))
    }

    fn load(&self) -> Result<BTreeMap<String, String>, Error> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), Error> {
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            };
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        // write a sibling file and rename so readers never observe a half-written pair
        let tmp = self.tmp_path()?;
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), keys = entries.len(), "credential file written");
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> Result<(), Error>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| Error::Store("file store lock poisoned".into()))?;
        let mut entries = self.load()?;
        mutate(&mut entries);
        self.save(&entries)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn store_pair(&self, access_token: &str, refresh_token: Option<&str>) -> Result<(), Error> {
        self.update(|entries| {
            entries.insert(ACCESS_TOKEN_KEY.to_string(), access_token.to_string());
            if let Some(refresh) = refresh_token {
                entries.insert(REFRESH_TOKEN_KEY.to_string(), refresh.to_string());
            }
        })
    }

    fn clear(&self) -> Result<(), Error> {
        self.update(|entries| {
            entries.remove(ACCESS_TOKEN_KEY);
            entries.remove(REFRESH_TOKEN_KEY);
        })
    }
}
