//! # Storage Module
//!
//! Where the save blob lives between runs.
//!
//! Two backends share the [`ProfileStore`] trait:
//! - [`JsonFileStore`]: one JSON file, the local-storage analogue
//! - [`RedbStore`]: redb embedded database (ACID, crash-safe
//!   copy-on-write B-trees) holding the canonical binary encoding

mod json_file;
mod redb_store;

pub use json_file::JsonFileStore;
pub use redb_store::RedbStore;

use crate::CoreError;
use crate::profile::UserProfile;

/// A single-profile key/value store.
pub trait ProfileStore {
    /// Load the saved profile, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<UserProfile>, CoreError>;

    /// Persist the profile, replacing any previous save.
    fn save(&self, profile: &UserProfile) -> Result<(), CoreError>;

    /// Remove the saved profile.
    fn clear(&self) -> Result<(), CoreError>;

    /// Load the saved profile or a fresh one.
    fn load_or_initial(&self) -> Result<UserProfile, CoreError> {
        Ok(self.load()?.unwrap_or_else(UserProfile::initial))
    }
}
