//! Cross-run save
//!
//! A single JSON blob: `{"coins": n, "perm": {"hp": n, "dmg": n, "spd": n}}`.
//! Missing fields take their defaults; an unreadable blob is replaced by a
//! fresh save.

use serde::{Deserialize, Serialize};

use crate::consts::STARTING_COINS;
use crate::error::StorageError;
use crate::platform::KeyValueStore;

/// Storage key for the save blob
pub const SAVE_KEY: &str = "kargo_kacis_save_v1";

/// Permanent shop levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermLevels {
    pub hp: u32,
    pub dmg: u32,
    pub spd: u32,
}

/// Persistent coin balance and shop levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistentSave {
    pub coins: u64,
    pub perm: PermLevels,
}

impl Default for PersistentSave {
    fn default() -> Self {
        Self {
            coins: STARTING_COINS,
            perm: PermLevels::default(),
        }
    }
}

impl PersistentSave {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Read the save, falling back to a fresh one if absent or corrupt
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match store.get(SAVE_KEY) {
            Some(json) => match Self::from_json(&json) {
                Ok(save) => {
                    log::info!("Loaded save: {} coins, perm {:?}", save.coins, save.perm);
                    save
                }
                Err(e) => {
                    log::warn!("Corrupt save ({}), starting fresh", e);
                    Self::default()
                }
            },
            None => {
                log::info!("No save found, starting fresh");
                Self::default()
            }
        }
    }

    /// Overwrite the stored blob with this save
    pub fn store<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        let json = self
            .to_json()
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        store.set(SAVE_KEY, &json)?;
        log::info!("Save written ({} coins)", self.coins);
        Ok(())
    }

    /// Bank the coins collected during a run
    pub fn fold_run_coins(&mut self, coins: u64) {
        self.coins = self.coins.saturating_add(coins);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_default_save() {
        let save = PersistentSave::load(&MemoryStore::new());
        assert_eq!(save.coins, STARTING_COINS);
        assert_eq!(save.perm, PermLevels::default());
    }

    #[test]
    fn test_store_then_load() {
        let mut store = MemoryStore::new();
        let save = PersistentSave {
            coins: 321,
            perm: PermLevels { hp: 1, dmg: 2, spd: 3 },
        };
        save.store(&mut store).unwrap();
        assert_eq!(PersistentSave::load(&store), save);
    }

    #[test]
    fn test_wire_format() {
        let save = PersistentSave {
            coins: 5,
            perm: PermLevels { hp: 0, dmg: 1, spd: 0 },
        };
        assert_eq!(
            save.to_json().unwrap(),
            r#"{"coins":5,"perm":{"hp":0,"dmg":1,"spd":0}}"#
        );
    }

    #[test]
    fn test_missing_perm_defaults_to_zero() {
        let store = MemoryStore::new().with_entry(SAVE_KEY, r#"{"coins": 77}"#);
        let save = PersistentSave::load(&store);
        assert_eq!(save.coins, 77);
        assert_eq!(save.perm, PermLevels::default());

        let store = MemoryStore::new().with_entry(SAVE_KEY, r#"{"coins": 9, "perm": {"dmg": 4}}"#);
        let save = PersistentSave::load(&store);
        assert_eq!(save.perm, PermLevels { hp: 0, dmg: 4, spd: 0 });
    }

    #[test]
    fn test_corrupt_save_falls_back() {
        for raw in ["not json", r#"{"coins": -4}"#, r#"[1,2,3]"#, ""] {
            let store = MemoryStore::new().with_entry(SAVE_KEY, raw);
            assert_eq!(PersistentSave::load(&store), PersistentSave::default());
        }
    }

    #[test]
    fn test_fold_run_coins() {
        let mut save = PersistentSave {
            coins: 10,
            perm: PermLevels::default(),
        };
        save.fold_run_coins(32);
        assert_eq!(save.coins, 42);
    }
}
