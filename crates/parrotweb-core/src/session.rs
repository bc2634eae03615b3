//! Bearer token persistence
//!
//! The token lives in a durable key-value store under a fixed key. All reads
//! and writes go through [`Session`]; nothing else touches the store.

use crate::error::{CoreError, CoreResult};
use crate::liveness::{Epoch, Ticket};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Key the bearer token is stored under
pub const TOKEN_KEY: &str = "token";

/// Durable string key-value storage
pub trait TokenStore: Send + Sync {
    fn load(&self, key: &str) -> CoreResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> CoreResult<()>;
    fn remove(&self, key: &str) -> CoreResult<()>;
}

/// Store reference type
pub type TokenStoreRef = Arc<dyn TokenStore>;

/// JSON object on disk, rewritten on every change
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> CoreResult<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn guard(&self) -> CoreResult<std::sync::MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| CoreError::SessionStore {
            message: "store lock poisoned".to_string(),
        })
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str) -> CoreResult<Option<String>> {
        let _guard = self.guard()?;
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> CoreResult<()> {
        let _guard = self.guard()?;
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        let _guard = self.guard()?;
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// In-process store, lost on restart
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> CoreResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries.lock().map_err(|_| CoreError::SessionStore {
            message: "store lock poisoned".to_string(),
        })
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> CoreResult<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Authentication context: the only accessor of the stored bearer token
pub struct Session {
    store: TokenStoreRef,
    epoch: Epoch,
}

impl Session {
    pub fn new(store: TokenStoreRef) -> Self {
        Self {
            store,
            epoch: Epoch::new(),
        }
    }

    /// Stored token; store failures are logged and read as "no token"
    pub fn token(&self) -> Option<String> {
        match self.store.load(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                log::warn!("Failed to read session token: {}", e);
                None
            }
        }
    }

    pub fn require_token(&self) -> CoreResult<String> {
        self.token().ok_or(CoreError::NotAuthenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(&self, token: &str) -> CoreResult<()> {
        self.store.save(TOKEN_KEY, token)?;
        self.epoch.advance();
        log::info!("Session token stored");
        Ok(())
    }

    /// Drop the token. Results of calls started before now are discarded.
    pub fn logout(&self) -> CoreResult<()> {
        self.epoch.advance();
        self.store.remove(TOKEN_KEY)?;
        log::info!("Session cleared");
        Ok(())
    }

    /// Ticket to check before committing a fetched result
    pub fn ticket(&self) -> Ticket {
        self.epoch.ticket()
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.epoch.is_current(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("parrotweb-test-{}-{}", std::process::id(), name))
            .join("session.json")
    }

    #[test]
    fn test_file_store_is_durable() {
        let path = temp_path("durable");
        let store = FileTokenStore::new(path.clone());
        assert_eq!(store.load(TOKEN_KEY).unwrap(), None);
        store.save(TOKEN_KEY, "abc").unwrap();

        let reopened = FileTokenStore::new(path.clone());
        assert_eq!(reopened.load(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        reopened.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.load(TOKEN_KEY).unwrap(), None);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let path = temp_path("keys");
        let store = FileTokenStore::new(path.clone());
        store.save("theme", "dark").unwrap();
        store.save(TOKEN_KEY, "abc").unwrap();
        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.load("theme").unwrap().as_deref(), Some("dark"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_store_reads_as_unauthenticated() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        let store = FileTokenStore::new(path.clone());
        assert!(matches!(store.load(TOKEN_KEY), Err(CoreError::SessionStore { .. })));

        let session = Session::new(Arc::new(store));
        assert!(!session.is_authenticated());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_session_login_logout() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        assert!(!session.is_authenticated());
        assert!(matches!(session.require_token(), Err(CoreError::NotAuthenticated)));

        session.set_token("t0k3n").unwrap();
        assert_eq!(session.require_token().unwrap(), "t0k3n");

        session.logout().unwrap();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_logout_invalidates_tickets() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        session.set_token("t0k3n").unwrap();
        let ticket = session.ticket();
        assert!(session.is_current(ticket));
        session.logout().unwrap();
        assert!(!session.is_current(ticket));
    }

    #[test]
    fn test_empty_token_is_not_a_session() {
        let store = Arc::new(MemoryTokenStore::new());
        store.save(TOKEN_KEY, "").unwrap();
        let session = Session::new(store);
        assert!(!session.is_authenticated());
    }
}
