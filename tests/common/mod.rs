#![allow(dead_code)]

use std::sync::Arc;

use chat_auth_client::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use chat_auth_client::{AuthClient, Config, CredentialStore, Error, MemoryCredentialStore};
use serde_json::json;
use wiremock::ResponseTemplate;

pub fn client_with_tokens(
    server_uri: &str,
    access: Option<&str>,
    refresh: Option<&str>,
) -> (AuthClient, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::with_tokens(access, refresh));
    let client = AuthClient::new(Config::from_values(server_uri, Some(5)), store.clone())
        .expect("client should build");
    (client, store)
}

pub fn client_with_store(server_uri: &str, store: Arc<dyn CredentialStore>) -> AuthClient {
    AuthClient::new(Config::from_values(server_uri, Some(5)), store).expect("client should build")
}

pub fn tokens(store: &MemoryCredentialStore) -> (Option<String>, Option<String>) {
    (
        store.get(ACCESS_TOKEN_KEY).unwrap(),
        store.get(REFRESH_TOKEN_KEY).unwrap(),
    )
}

pub fn auth_ok(access: &str, refresh: Option<&str>, expires_in: u64) -> ResponseTemplate {
    let mut body = json!({
        "message": "ok",
        "status": "success",
        "access_token": access,
        "expires_in": expires_in,
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = json!(refresh);
    }
    ResponseTemplate::new(200).set_body_json(body)
}

/// Memory store that refuses the operations flagged at construction.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryCredentialStore,
    pub fail_clear: bool,
    pub fail_remove: bool,
    pub fail_writes: bool,
}

impl FaultyStore {
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        Self {
            inner: MemoryCredentialStore::with_tokens(access, refresh),
            ..Self::default()
        }
    }

    fn refuse(op: &str) -> Error {
        Error::Store(format!("store refused {op}"))
    }
}

impl CredentialStore for FaultyStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        if self.fail_writes {
            return Err(Self::refuse("set"));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        if self.fail_remove {
            return Err(Self::refuse("remove"));
        }
        self.inner.remove(key)
    }

    fn store_pair(&self, access_token: &str, refresh_token: Option<&str>) -> Result<(), Error> {
        if self.fail_writes {
            return Err(Self::refuse("store_pair"));
        }
        self.inner.store_pair(access_token, refresh_token)
    }

    fn clear(&self) -> Result<(), Error> {
        if self.fail_clear {
            return Err(Self::refuse("clear"));
        }
        self.inner.clear()
    }
}
