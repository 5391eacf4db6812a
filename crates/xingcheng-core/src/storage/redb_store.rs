//! redb-backed profile store.

use super::ProfileStore;
use crate::CoreError;
use crate::formats;
use crate::primitives::STORAGE_KEY;
use crate::profile::UserProfile;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, TableError};
use std::path::Path;

/// Table name -> canonical save bytes.
const PROFILES: TableDefinition<&str, &[u8]> = TableDefinition::new("profiles");

/// Stores the canonical binary encoding under [`STORAGE_KEY`].
pub struct RedbStore {
    db: Database,
    key: String,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").field("key", &self.key).finish()
    }
}

impl RedbStore {
    /// Open or create a database at `path`, making sure the table exists.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let db = Database::create(path).map_err(redb::Error::from)?;
        let txn = db.begin_write().map_err(redb::Error::from)?;
        txn.open_table(PROFILES).map_err(redb::Error::from)?;
        txn.commit().map_err(redb::Error::from)?;
        Ok(Self {
            db,
            key: STORAGE_KEY.to_string(),
        })
    }

    /// Use a different key, e.g. for side-by-side test profiles.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

impl ProfileStore for RedbStore {
    fn load(&self) -> Result<Option<UserProfile>, CoreError> {
        let txn = self.db.begin_read().map_err(redb::Error::from)?;
        let table = match txn.open_table(PROFILES) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(redb::Error::from(e).into()),
        };
        let Some(guard) = table.get(self.key.as_str()).map_err(redb::Error::from)? else {
            return Ok(None);
        };
        formats::decode_canonical(guard.value()).map(Some)
    }

    fn save(&self, profile: &UserProfile) -> Result<(), CoreError> {
        let bytes = formats::encode_canonical(profile)?;
        let txn = self.db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = txn.open_table(PROFILES).map_err(redb::Error::from)?;
            table
                .insert(self.key.as_str(), bytes.as_slice())
                .map_err(redb::Error::from)?;
        }
        txn.commit().map_err(redb::Error::from)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        let txn = self.db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = txn.open_table(PROFILES).map_err(redb::Error::from)?;
            table
                .remove(self.key.as_str())
                .map_err(redb::Error::from)?;
        }
        txn.commit().map_err(redb::Error::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemId;

    #[test]
    fn fresh_database_is_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = RedbStore::open(&dir.path().join("save.redb"));
        assert!(store.is_ok());
        let Ok(store) = store else { return };
        assert!(matches!(store.load(), Ok(None)));
    }

    #[test]
    fn save_survives_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("save.redb");
        let mut profile = UserProfile::initial();
        profile.inventory.push(ItemId::new("spirit_fox"));

        {
            let store = RedbStore::open(&path).expect("open redb store");
            assert!(store.save(&profile).is_ok());
        }

        let store = RedbStore::open(&path).expect("open redb store");
        assert_eq!(store.load().ok().flatten(), Some(profile));
    }

    #[test]
    fn keys_are_isolated_and_clearable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = RedbStore::open(&dir.path().join("save.redb")).expect("open redb store");
        let store = store.with_key("alt");
        assert!(store.save(&UserProfile::initial()).is_ok());
        assert!(matches!(store.load(), Ok(Some(_))));
        assert!(store.clear().is_ok());
        assert!(matches!(store.load(), Ok(None)));
    }
}
