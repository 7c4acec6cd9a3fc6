use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::session::SessionRecord;

const SESSION_FILE_NAME: &str = "session.toml";

/// Storage abstraction for the persisted session record.
///
/// At most one record exists at a time; `save` fully replaces it, and a
/// `load` after a completed `save` always observes the saved value. No
/// network access, no validation of contents beyond the type shape.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionRecord>, AuthError>;
    fn save(&self, record: &SessionRecord) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// Configuration for file-backed session storage.
#[derive(Debug, Clone)]
pub struct SessionStoreConfig {
    pub base_dir: PathBuf,
}

impl SessionStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_tunecast_dir()
    }
}

/// File-backed session store using a TOML file.
///
/// There is no cross-process locking: two processes sharing one session
/// file can each refresh, and the last write wins.
///
/// # Example
/// ```no_run
/// use tunecast::auth::{FileSessionStore, SessionRecord, SessionStore, SessionStoreConfig};
///
/// let store = FileSessionStore::new(SessionStoreConfig::new(std::path::PathBuf::from("/tmp")));
/// let record = SessionRecord {
///     credential: "jwt".to_string(),
///     expires_at: "1700003600000".to_string(),
///     user_id: "user-1".to_string(),
///     user_email: "user@example.com".to_string(),
/// };
/// store.save(&record)?;
/// # Ok::<(), tunecast::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(config: SessionStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_tunecast_dir(),
        }
    }

    fn session_path(&self) -> PathBuf {
        self.base_dir.join(SESSION_FILE_NAME)
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionRecord>, AuthError> {
        let path = self.session_path();
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: SessionFile = toml::from_str(&raw)?;
        Ok(Some(file.session))
    }

    fn save(&self, record: &SessionRecord) -> Result<(), AuthError> {
        let path = self.session_path();
        Self::ensure_parent(&path)?;
        let file = SessionFile {
            version: 1,
            session: record.clone(),
            saved_at: DateTime::<Utc>::from(std::time::SystemTime::now()),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        let path = self.session_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    session: SessionRecord,
    saved_at: DateTime<Utc>,
}

/// In-memory session store for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    record: Mutex<Option<SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionRecord>, AuthError> {
        Ok(self.record.lock().unwrap().clone())
    }

    fn save(&self, record: &SessionRecord) -> Result<(), AuthError> {
        *self.record.lock().unwrap() = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.record.lock().unwrap() = None;
        Ok(())
    }
}

fn default_tunecast_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".tunecast"))
        .unwrap_or_else(|| PathBuf::from(".tunecast"))
}
