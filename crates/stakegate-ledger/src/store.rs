use crate::account::Account;
use serde::{Deserialize, Serialize};
use stakegate_core::{BlockHeight, ElectionConfig, ParticipantId, StakeError};
use std::path::Path;

/// Ledger-wide metadata persisted once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerMeta {
    pub config: ElectionConfig,
    pub genesis_height: BlockHeight,
}

/// Persistent ledger store backed by sled (pure-Rust, no C dependencies).
///
/// Named trees:
///   accounts — ParticipantId bytes → bincode(Account)
///   meta     — utf8 key bytes      → bincode(LedgerMeta) / height bytes
///
/// The ledger itself stays in memory; the collaborator writes each changed
/// account here after the operation succeeds and rebuilds the ledger from
/// this store at startup.
pub struct LedgerStore {
    _db: sled::Db,
    accounts: sled::Tree,
    meta: sled::Tree,
}

const META_LEDGER: &str = "ledger_meta";
const META_HEIGHT: &str = "chain_height";

impl LedgerStore {
    /// Open or create the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StakeError> {
        let db = sled::open(path).map_err(|e| StakeError::Storage(e.to_string()))?;
        let accounts = db
            .open_tree("accounts")
            .map_err(|e| StakeError::Storage(e.to_string()))?;
        let meta = db
            .open_tree("meta")
            .map_err(|e| StakeError::Storage(e.to_string()))?;
        Ok(Self {
            _db: db,
            accounts,
            meta,
        })
    }

    // ── Accounts ─────────────────────────────────────────────────────────────

    pub fn get_account(&self, id: &ParticipantId) -> Result<Option<Account>, StakeError> {
        match self
            .accounts
            .get(id.as_bytes())
            .map_err(|e| StakeError::Storage(e.to_string()))?
        {
            Some(bytes) => {
                let acc = bincode::deserialize(&bytes)
                    .map_err(|e| StakeError::Serialization(e.to_string()))?;
                Ok(Some(acc))
            }
            None => Ok(None),
        }
    }

    pub fn put_account(&self, id: &ParticipantId, account: &Account) -> Result<(), StakeError> {
        let bytes =
            bincode::serialize(account).map_err(|e| StakeError::Serialization(e.to_string()))?;
        self.accounts
            .insert(id.as_bytes(), bytes)
            .map_err(|e| StakeError::Storage(e.to_string()))?;
        Ok(())
    }

    /// All persisted accounts, for rebuilding a ledger at startup.
    pub fn iter_accounts(&self) -> Result<Vec<(ParticipantId, Account)>, StakeError> {
        let mut out = Vec::new();
        for item in self.accounts.iter() {
            let (key, value) = item.map_err(|e| StakeError::Storage(e.to_string()))?;
            if key.len() != 32 {
                return Err(StakeError::Storage(format!(
                    "malformed account key ({} bytes)",
                    key.len()
                )));
            }
            let mut arr = [0u8; 32];
            arr.copy_from_slice(&key);
            let account = bincode::deserialize(&value)
                .map_err(|e| StakeError::Serialization(e.to_string()))?;
            out.push((ParticipantId::from_bytes(arr), account));
        }
        Ok(out)
    }

    // ── Meta ──────────────────────────────────────────────────────────────────

    pub fn put_ledger_meta(&self, meta: &LedgerMeta) -> Result<(), StakeError> {
        let bytes =
            bincode::serialize(meta).map_err(|e| StakeError::Serialization(e.to_string()))?;
        self.meta
            .insert(META_LEDGER.as_bytes(), bytes)
            .map_err(|e| StakeError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn get_ledger_meta(&self) -> Result<Option<LedgerMeta>, StakeError> {
        match self
            .meta
            .get(META_LEDGER.as_bytes())
            .map_err(|e| StakeError::Storage(e.to_string()))?
        {
            Some(bytes) => {
                let meta = bincode::deserialize(&bytes)
                    .map_err(|e| StakeError::Serialization(e.to_string()))?;
                Ok(Some(meta))
            }
            None => Ok(None),
        }
    }

    pub fn put_chain_height(&self, height: BlockHeight) -> Result<(), StakeError> {
        self.meta
            .insert(META_HEIGHT.as_bytes(), height.to_be_bytes().to_vec())
            .map_err(|e| StakeError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn get_chain_height(&self) -> Result<Option<BlockHeight>, StakeError> {
        match self
            .meta
            .get(META_HEIGHT.as_bytes())
            .map_err(|e| StakeError::Storage(e.to_string()))?
        {
            Some(bytes) => {
                if bytes.len() != 8 {
                    return Err(StakeError::Storage(format!(
                        "malformed chain height ({} bytes)",
                        bytes.len()
                    )));
                }
                let mut arr = [0u8; 8];
                arr.copy_from_slice(&bytes);
                Ok(Some(BlockHeight::from_be_bytes(arr)))
            }
            None => Ok(None),
        }
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), StakeError> {
        self._db
            .flush()
            .map_err(|e| StakeError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> LedgerStore {
        let dir = std::env::temp_dir().join(format!("stakegate_store_test_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        LedgerStore::open(&dir).expect("open temp store")
    }

    #[test]
    fn ledger_meta_roundtrip() {
        let store = temp_store("meta");
        assert!(store.get_ledger_meta().unwrap().is_none());

        let meta = LedgerMeta {
            config: ElectionConfig::devnet(),
            genesis_height: 3,
        };
        store.put_ledger_meta(&meta).unwrap();

        let back = store.get_ledger_meta().unwrap().unwrap();
        assert_eq!(back.genesis_height, 3);
        assert_eq!(back.config.withdraw_delay, meta.config.withdraw_delay);
        assert!(back.config.restricted_address.is_none());
    }

    #[test]
    fn account_roundtrip_and_overwrite() {
        let store = temp_store("accounts");
        let id = ParticipantId::from_label("alice");
        assert!(store.get_account(&id).unwrap().is_none());

        let mut account = Account {
            active_stake: 500,
            ..Account::default()
        };
        store.put_account(&id, &account).unwrap();
        assert_eq!(store.get_account(&id).unwrap().unwrap().active_stake, 500);

        account.active_stake = 750;
        store.put_account(&id, &account).unwrap();
        assert_eq!(store.get_account(&id).unwrap().unwrap().active_stake, 750);
    }

    #[test]
    fn iter_accounts_returns_all() {
        let store = temp_store("iter");
        for label in ["a", "b", "c"] {
            let id = ParticipantId::from_label(label);
            store.put_account(&id, &Account::default()).unwrap();
        }
        assert_eq!(store.iter_accounts().unwrap().len(), 3);
    }

    #[test]
    fn chain_height_roundtrip() {
        let store = temp_store("height");
        assert!(store.get_chain_height().unwrap().is_none());
        store.put_chain_height(99).unwrap();
        assert_eq!(store.get_chain_height().unwrap(), Some(99));
    }
}
