//! Where the bearer token survives between runs.
//!
//! The persisted form is a JSON object with the token under [`TOKEN_KEY`],
//! so other settings can share the same file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};

use crate::{StorageError, Token};

/// The key the token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Durable storage for the bearer token.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<Token>, StorageError>;
    fn save(&self, token: &Token) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Keeps the token for the life of the process only.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<Token>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that starts out holding `token`, as if persisted by an
    /// earlier run.
    pub fn with_token(token: Token) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<Token>, StorageError> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &Token) -> Result<(), StorageError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Persists the token in a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Map::new());
            }
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(map)?)?;
        Ok(())
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<Token>, StorageError> {
        let map = self.read_map()?;
        Ok(map
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|raw| !raw.is_empty())
            .map(Token::new))
    }

    fn save(&self, token: &Token) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        map.insert(TOKEN_KEY.into(), Value::String(token.as_str().into()));
        self.write_map(&map)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        if map.remove(TOKEN_KEY).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }
}
