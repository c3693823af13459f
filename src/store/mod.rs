mod file;
mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use crate::errors::Error;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Key-value capability holding the persisted credentials.
///
/// The client reads through this on every attempt and never keeps its own copy.
/// Both keys absent means logged out.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    fn remove(&self, key: &str) -> Result<(), Error>;

    /// Writes the access token and, when rotated, the refresh token.
    ///
    /// Implementations backed by a single lock or file should override this so both
    /// keys land in one write.
    fn store_pair(&self, access_token: &str, refresh_token: Option<&str>) -> Result<(), Error> {
        self.set(ACCESS_TOKEN_KEY, access_token)?;
        if let Some(refresh) = refresh_token {
            self.set(REFRESH_TOKEN_KEY, refresh)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        self.remove(ACCESS_TOKEN_KEY)?;
        self.remove(REFRESH_TOKEN_KEY)
    }
}
