//! JSON file profile store.

use super::ProfileStore;
use crate::CoreError;
use crate::formats;
use crate::profile::UserProfile;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Stores the profile as a pretty-printed JSON file.
///
/// Saves go to a sibling `.tmp` file first and are renamed into place, so a
/// crash mid-write leaves the previous save intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl ProfileStore for JsonFileStore {
    fn load(&self) -> Result<Option<UserProfile>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(None),
            Ok(text) => formats::decode_json(&text).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, profile: &UserProfile) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.tmp_path();
        std::fs::write(&tmp, formats::encode_json(profile)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileStore::new(dir.path().join("save.json"));
        assert!(matches!(store.load(), Ok(None)));
        assert_eq!(store.load_or_initial().ok(), Some(UserProfile::initial()));
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileStore::new(dir.path().join("nested").join("save.json"));
        let mut profile = UserProfile::initial();
        profile.currency = 4_200;

        assert!(store.save(&profile).is_ok());
        assert_eq!(store.load().ok().flatten(), Some(profile));
        assert!(!store.tmp_path().exists());

        assert!(store.clear().is_ok());
        assert!(matches!(store.load(), Ok(None)));
        assert!(store.clear().is_ok());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("save.json");
        assert!(std::fs::write(&path, "{not json").is_ok());
        let store = JsonFileStore::new(path);
        assert!(matches!(store.load(), Err(CoreError::Json(_))));
    }
}
