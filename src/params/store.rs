//! Directory-backed param store: one file per key, atomic writes.
//!
//! ## Rules
//! - A missing key is not an error; `get` returns `None`, `get_bool` returns false.
//! - An unreachable root at open time is fatal ([`ManagerError::Store`]).
//! - Writes go to a temp file in the same directory, then rename (atomic on
//!   the same filesystem).
//! - Single-writer discipline: the control loop is the only writer while the
//!   supervisor runs. No cross-process locking.
//!
//! ## Bulk clears
//! [`ParamStore::clear_all`] removes every key the static [`schema`] tags with
//! the given [`Category`]. Untracked keys are never bulk-cleared;
//! [`ParamStore::wipe_non_persistent`] (factory reset) removes everything not
//! tagged [`Category::Persistent`], tracked or not.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ManagerError;
use crate::params::schema::{self, Category};

/// Persistent key-value store with lifecycle-scoped clearing.
///
/// Cheap to clone: holds only the root path.
#[derive(Clone, Debug)]
pub struct ParamStore {
    root: PathBuf,
}

impl ParamStore {
    /// Opens (creating if needed) the store rooted at `root`.
    ///
    /// # Errors
    /// Returns [`ManagerError::Store`] if the root directory cannot be created;
    /// callers treat this as fatal to startup.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ManagerError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| ManagerError::Store {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Returns the value of `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    /// Returns the boolean value of `key`; absent or anything but `"1"` is false.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v.trim() == "1")
    }

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns [`ManagerError::Store`] on I/O failure; the store is considered
    /// unreachable at that point.
    pub fn put(&self, key: &str, value: &str) -> Result<(), ManagerError> {
        self.write_atomic(key, value)
            .map_err(|source| ManagerError::Store {
                path: self.root.clone(),
                source,
            })
    }

    /// Writes `value` as `"1"`/`"0"` under `key`.
    pub fn put_bool(&self, key: &str, value: bool) -> Result<(), ManagerError> {
        self.put(key, if value { "1" } else { "0" })
    }

    /// Writes `value` only if `key` is currently absent.
    ///
    /// Idempotent; used to seed the default table once per boot without
    /// clobbering operator-set values.
    pub fn ensure_default(&self, key: &str, value: &str) -> Result<(), ManagerError> {
        if self.get(key).is_none() {
            self.put(key, value)?;
        }
        Ok(())
    }

    /// Removes `key` if present. Missing keys are ignored.
    pub fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.key_path(key));
    }

    /// Removes every key the schema tags with `category`.
    pub fn clear_all(&self, category: Category) {
        for key in schema::keys_with(category) {
            self.remove(key);
        }
    }

    /// Factory reset: removes every stored key not tagged persistent,
    /// including keys outside the schema.
    pub fn wipe_non_persistent(&self) {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return;
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(key) = name.to_str() else { continue };
            if !schema::is_persistent(key) {
                let _ = fs::remove_file(entry.path());
            }
        }
    }

    /// Store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn write_atomic(&self, key: &str, value: &str) -> io::Result<()> {
        let tmp = self.root.join(format!(".{key}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.key_path(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ParamStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ParamStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_key_is_not_an_error() {
        let (_dir, s) = store();
        assert_eq!(s.get("Nope"), None);
        assert!(!s.get_bool("Nope"));
    }

    #[test]
    fn put_get_roundtrip_and_bool_coercion() {
        let (_dir, s) = store();
        s.put("DongleId", "abc123").unwrap();
        assert_eq!(s.get("DongleId").as_deref(), Some("abc123"));

        s.put_bool("DoReboot", true).unwrap();
        assert!(s.get_bool("DoReboot"));
        s.put_bool("DoReboot", false).unwrap();
        assert!(!s.get_bool("DoReboot"));

        // parse failure coerces to false
        s.put("DoReboot", "garbage").unwrap();
        assert!(!s.get_bool("DoReboot"));
    }

    #[test]
    fn ensure_default_never_clobbers() {
        let (_dir, s) = store();
        s.ensure_default("LanguageSetting", "main_en").unwrap();
        assert_eq!(s.get("LanguageSetting").as_deref(), Some("main_en"));

        // second call with same value: no-op
        s.ensure_default("LanguageSetting", "main_en").unwrap();
        assert_eq!(s.get("LanguageSetting").as_deref(), Some("main_en"));

        // operator changed it; a later default seed must not win
        s.put("LanguageSetting", "main_de").unwrap();
        s.ensure_default("LanguageSetting", "main_en").unwrap();
        assert_eq!(s.get("LanguageSetting").as_deref(), Some("main_de"));
    }

    #[test]
    fn clear_all_removes_only_tagged_keys() {
        let (_dir, s) = store();
        s.put("CarParams", "cp").unwrap();
        s.put("CurrentRoute", "r1").unwrap();
        s.put("DongleId", "abc123").unwrap();
        s.put("Untracked", "x").unwrap();

        s.clear_all(Category::OnroadTransition);

        assert_eq!(s.get("CarParams"), None);
        assert_eq!(s.get("CurrentRoute"), None);
        assert_eq!(s.get("DongleId").as_deref(), Some("abc123"));
        assert_eq!(s.get("Untracked").as_deref(), Some("x"));
    }

    #[test]
    fn wipe_non_persistent_spares_persistent_keys() {
        let (_dir, s) = store();
        s.put("DongleId", "abc123").unwrap();
        s.put("HasAcceptedTerms", "1").unwrap();
        s.put("CarParams", "cp").unwrap();
        s.put("SomethingAdHoc", "x").unwrap();

        s.wipe_non_persistent();

        assert_eq!(s.get("DongleId").as_deref(), Some("abc123"));
        assert_eq!(s.get("HasAcceptedTerms").as_deref(), Some("1"));
        assert_eq!(s.get("CarParams"), None);
        assert_eq!(s.get("SomethingAdHoc"), None);
    }
}
