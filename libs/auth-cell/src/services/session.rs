use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{AuthError, LoginRequest, SessionUser};
use crate::services::directory::UserDirectoryService;

pub const USER_KEY: &str = "user";
pub const TOKEN_KEY: &str = "token";

/// Key/value persistence for the session, the same contract browsers offer
/// through `localStorage`.
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, AuthError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), AuthError>;
    fn remove_item(&self, key: &str) -> Result<(), AuthError>;
}

impl<T: SessionStorage + ?Sized> SessionStorage for Box<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, AuthError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AuthError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), AuthError> {
        (**self).remove_item(key)
    }
}

/// The holder as shared through router state.
pub type SharedSession = Arc<SessionHolder<Box<dyn SessionStorage>>>;

#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, AuthError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AuthError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), AuthError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

/// Stores all keys in one JSON object file.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.session_store_path)
    }

    fn read_all(&self) -> Result<HashMap<String, String>, AuthError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| AuthError::Storage(format!("{}: {}", self.path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(AuthError::Storage(e.to_string())),
        }
    }

    fn write_all(&self, items: &HashMap<String, String>) -> Result<(), AuthError> {
        let raw = serde_json::to_string_pretty(items)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| AuthError::Storage(e.to_string()))
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, AuthError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AuthError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), AuthError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Session {
    user: SessionUser,
    token: Option<String>,
}

/// Process-wide holder of the logged-in user, mirrored to a storage backend.
///
/// This is convenience state only. Every permission decision still belongs
/// to the backend.
pub struct SessionHolder<S: SessionStorage> {
    storage: S,
    state: RwLock<Option<Session>>,
}

impl<S: SessionStorage> SessionHolder<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            state: RwLock::new(None),
        }
    }

    /// Rebuilds the session from storage. A stored user that does not parse
    /// leaves the holder logged out.
    pub fn restore(storage: S) -> Self {
        let holder = Self::new(storage);

        let stored_user = match holder.storage.get_item(USER_KEY) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to read stored session: {}", e);
                None
            }
        };

        if let Some(raw) = stored_user {
            match serde_json::from_str::<SessionUser>(&raw) {
                Ok(user) => {
                    let token = holder.storage.get_item(TOKEN_KEY).ok().flatten();
                    debug!("Restored session for {}", user.email);
                    *holder.state.write().unwrap_or_else(PoisonError::into_inner) =
                        Some(Session { user, token });
                }
                Err(e) => error!("Failed to parse stored user: {}", e),
            }
        }

        holder
    }

    pub async fn login(
        &self,
        directory: &UserDirectoryService,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, AuthError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = directory.login(&request).await?;

        let user_json = serde_json::to_string(&response.user)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        self.storage.set_item(USER_KEY, &user_json)?;
        self.storage.set_item(TOKEN_KEY, &response.token)?;

        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(Session {
            user: response.user.clone(),
            token: Some(response.token),
        });

        Ok(response.user)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.storage.remove_item(USER_KEY)?;
        self.storage.remove_item(TOKEN_KEY)?;
        info!("Session cleared");
        Ok(())
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|s| s.token.clone())
    }

    /// True for admins and professionals alike.
    pub fn is_admin(&self) -> bool {
        self.current_user()
            .map(|u| u.role.has_admin_view())
            .unwrap_or(false)
    }
}

impl SessionHolder<Box<dyn SessionStorage>> {
    pub fn shared(storage: impl SessionStorage + 'static) -> SharedSession {
        Arc::new(Self::new(Box::new(storage)))
    }

    pub fn restore_shared(storage: impl SessionStorage + 'static) -> SharedSession {
        Arc::new(Self::restore(Box::new(storage)))
    }
}
