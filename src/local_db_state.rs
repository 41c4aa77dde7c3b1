//! LMDB-backed durable slot.
//!
//! The journal keeps a handful of whole-document blobs (the record collection
//! and the display name), so the environment holds a single named database and
//! every write is its own committed transaction. A successful [`DurableSlot::set`]
//! therefore means the blob is on disk.

use std::fs;
use std::path::PathBuf;

use lmdb::{Database, DatabaseFlags, Environment, Error as LmdbError, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::config::StoreConfig;
use crate::durable_slot::DurableSlot;
use crate::error::StoreError;

const SLOT_DB_NAME: &str = "slots";

pub struct AppDbState {
    env: Environment,
    db: Database,
    path: PathBuf,
}

impl AppDbState {
    /// Opens, or creates, the environment at `config.lmdb_dir()`.
    pub fn init(config: &StoreConfig) -> Result<Self, StoreError> {
        let path = config.lmdb_dir();
        fs::create_dir_all(&path)?;

        info!("Opening LMDB environment at {}", path.display());

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(config.map_size)
            .open(&path)?;
        let db = env.create_db(Some(SLOT_DB_NAME), DatabaseFlags::empty())?;

        Ok(Self { env, db, path })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Flushes the environment to disk. The handle stays usable; dropping it
    /// releases the environment.
    pub fn close_database(&mut self) -> Result<(), StoreError> {
        self.env.sync(true)?;
        info!("LMDB environment at {} synced for close", self.path.display());
        Ok(())
    }
}

impl DurableSlot for AppDbState {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let txn = self.env.begin_ro_txn()?;
        let bytes = match txn.get(self.db, &key) {
            Ok(bytes) => bytes.to_vec(),
            Err(LmdbError::NotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        txn.commit()?;

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| StoreError::InvalidUtf8(key.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;
        debug!("Wrote {} bytes to slot '{key}'", value.len());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut txn = self.env.begin_rw_txn()?;
        if let Err(e) = txn.clear_db(self.db) {
            warn!("Failed to clear LMDB database: {e}");
            return Err(e.into());
        }
        txn.commit()?;
        info!("Cleared every slot in {}", self.path.display());
        Ok(())
    }
}
