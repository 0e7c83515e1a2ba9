//! Persistent key-value preferences.
//!
//! Values are stored as a single JSON document, by default under
//! `~/.rotary_cam/prefs.json`. Each behaviour owns its own keys and decides
//! what to load at startup and write back at shutdown.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

const PREFS_DIR: &str = ".rotary_cam";
const PREFS_FILE: &str = "prefs.json";

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("HOME is not set; pass an explicit preferences path")]
    NoHome,
    #[error("failed to access preferences at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed preferences at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PrefValue {
    String(String),
    Float(f32),
    Int(i32),
}

#[derive(Clone, Debug)]
pub struct PrefsStore {
    path: PathBuf,
    values: BTreeMap<String, PrefValue>,
    dirty: bool,
}

impl PrefsStore {
    /// Default location (`~/.rotary_cam/prefs.json`).
    pub fn default_path() -> Result<PathBuf, PrefsError> {
        let home = std::env::var_os("HOME").ok_or(PrefsError::NoHome)?;
        Ok(PathBuf::from(home).join(PREFS_DIR).join(PREFS_FILE))
    }

    /// Empty store that will save to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Load `path`; a missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self::empty(path));
        }
        let text = std::fs::read_to_string(&path).map_err(|source| PrefsError::Io {
            path: path.clone(),
            source,
        })?;
        let values = serde_json::from_str(&text).map_err(|source| PrefsError::Json {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            values,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(PrefValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Floats and ints both read as floats.
    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.values.get(key) {
            Some(PrefValue::Float(v)) => Some(*v),
            Some(PrefValue::Int(v)) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.values.get(key) {
            Some(PrefValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.insert(key, PrefValue::String(value.into()));
    }

    /// Non-finite values cannot be represented in JSON and remove the key.
    pub fn set_float(&mut self, key: &str, value: f32) {
        if value.is_finite() {
            self.insert(key, PrefValue::Float(value));
        } else {
            self.remove(key);
        }
    }

    pub fn set_int(&mut self, key: &str, value: i32) {
        self.insert(key, PrefValue::Int(value));
    }

    pub fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.dirty = true;
        }
    }

    pub fn clear(&mut self) {
        if !self.values.is_empty() {
            self.values.clear();
            self.dirty = true;
        }
    }

    fn insert(&mut self, key: &str, value: PrefValue) {
        if self.values.get(key) != Some(&value) {
            self.values.insert(key.to_string(), value);
            self.dirty = true;
        }
    }

    /// Write the store to disk, creating the parent directory if needed.
    pub fn save(&mut self) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| PrefsError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values).map_err(|source| {
            PrefsError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, json).map_err(|source| PrefsError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.dirty = false;
        Ok(())
    }
}
