//! Durable [`KvBackend`] on top of an LMDB environment.
//!
//! Values are stored as JSON bytes in a single named database. `set` and
//! `update` each run in one write transaction. LMDB admits a single writer
//! at a time, so an `update` never interleaves with another writer on the
//! same environment, whichever handle or store issued it.
//!
//! LMDB must not be opened twice in one process. Backends opened on the
//! same directory therefore share one environment, kept in a process-wide
//! registry for as long as any backend holds it. LMDB calls block, so they
//! run on tokio's blocking pool.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, Weak};

use async_trait::async_trait;
use lmdb::{Database, DatabaseFlags, Environment, RwTransaction, Transaction, WriteFlags};
use log::{debug, info, trace};
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use tokio::task;

use crate::backend::{KvBackend, Mutation};
use crate::config::StoreConfig;
use crate::error::StoreError;

const MAIN_DB: &str = "clip_notes";

static ENVIRONMENTS: OnceLock<Mutex<HashMap<PathBuf, Weak<SharedEnv>>>> = OnceLock::new();

struct SharedEnv {
    env: Environment,
    db: Database,
}

pub struct LmdbBackend {
    shared: Arc<SharedEnv>,
    path: PathBuf,
}

impl LmdbBackend {
    /// Opens (creating if needed) the environment at `<db_path>.lmdb`.
    ///
    /// If another backend in this process already has the directory open,
    /// its environment is reused and `map_size` is ignored.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let dir = PathBuf::from(config.lmdb_dir());
        if dir.exists() {
            info!("Opening existing note database at: {}", dir.display());
        } else {
            info!("Creating new note database at: {}", dir.display());
            std::fs::create_dir_all(&dir)?;
        }
        let path = std::fs::canonicalize(&dir)?;
        let shared = shared_env(&path, config.map_size)?;
        Ok(LmdbBackend { shared, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether both backends write through the same LMDB environment.
    pub fn shares_environment_with(&self, other: &LmdbBackend) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

fn shared_env(path: &Path, map_size: usize) -> Result<Arc<SharedEnv>, StoreError> {
    let mut open = ENVIRONMENTS.get_or_init(Default::default).lock();
    if let Some(shared) = open.get(path).and_then(Weak::upgrade) {
        debug!("reusing open LMDB environment at {}", path.display());
        return Ok(shared);
    }
    open.retain(|_, shared| shared.strong_count() > 0);

    let env = Environment::new()
        .set_max_dbs(1)
        .set_map_size(map_size)
        .open(path)?;
    let db = env.create_db(Some(MAIN_DB), DatabaseFlags::empty())?;
    let shared = Arc::new(SharedEnv { env, db });
    open.insert(path.to_path_buf(), Arc::downgrade(&shared));
    Ok(shared)
}

#[async_trait]
impl KvBackend for LmdbBackend {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        let shared = Arc::clone(&self.shared);
        let key = key.to_string();
        task::spawn_blocking(move || read_value(&shared, &key)).await?
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&value)?;
        let shared = Arc::clone(&self.shared);
        let key = key.to_string();
        task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut txn = shared.env.begin_rw_txn()?;
            write_value(&mut txn, shared.db, &key, &bytes)?;
            txn.commit()?;
            Ok(())
        })
        .await?
    }

    async fn update(&self, key: &str, mutation: Mutation) -> Result<bool, StoreError> {
        let shared = Arc::clone(&self.shared);
        let key = key.to_string();
        task::spawn_blocking(move || update_value(&shared, &key, mutation)).await?
    }
}

fn decode(key: &str, bytes: &[u8]) -> Result<JsonValue, StoreError> {
    trace!("read {} bytes under key '{key}'", bytes.len());
    serde_json::from_slice(bytes).map_err(|source| StoreError::Corrupt {
        key: key.to_string(),
        source,
    })
}

fn read_value(shared: &SharedEnv, key: &str) -> Result<Option<JsonValue>, StoreError> {
    let txn = shared.env.begin_ro_txn()?;
    let value = match txn.get(shared.db, &key) {
        Ok(bytes) => Some(decode(key, bytes)?),
        Err(lmdb::Error::NotFound) => None,
        Err(e) => return Err(e.into()),
    };
    txn.commit()?;
    Ok(value)
}

fn update_value(shared: &SharedEnv, key: &str, mutation: Mutation) -> Result<bool, StoreError> {
    // dropping the transaction on any early return aborts it
    let mut txn = shared.env.begin_rw_txn()?;
    let current = match txn.get(shared.db, &key) {
        Ok(bytes) => Some(decode(key, bytes)?),
        Err(lmdb::Error::NotFound) => None,
        Err(e) => return Err(e.into()),
    };
    match mutation(current)? {
        Some(value) => {
            let bytes = serde_json::to_vec(&value)?;
            write_value(&mut txn, shared.db, key, &bytes)?;
            txn.commit()?;
            Ok(true)
        }
        None => {
            txn.abort();
            Ok(false)
        }
    }
}

fn write_value(
    txn: &mut RwTransaction<'_>,
    db: Database,
    key: &str,
    bytes: &[u8],
) -> Result<(), StoreError> {
    txn.put(db, &key, &bytes, WriteFlags::empty())?;
    trace!("wrote {} bytes under key '{key}'", bytes.len());
    Ok(())
}
