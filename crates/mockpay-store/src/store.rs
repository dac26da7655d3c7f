//! # JSON File Store
//!
//! Keyed, durable persistence: one JSON file per record under a collection
//! directory, with an in-memory index as the authoritative working set.
//! Writes go through a temp file and rename, so each record update is
//! atomic on its own; there is no whole-collection rewrite, which is what
//! made the original store lose updates under concurrency.

use mockpay_core::{
    Mutator, Order, OrderStore, PaymentError, PaymentResult, PaymentSession, SessionStore,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A keyed JSON-file store.
///
/// All mutating operations take the write lock for the duration of the
/// read-modify-write, so per-key sequences never interleave. A failed
/// durable write rolls the in-memory record back before surfacing the
/// error.
pub struct JsonStore<T> {
    dir: PathBuf,
    records: RwLock<HashMap<String, T>>,
}

impl<T> JsonStore<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    /// Open (or initialize) a collection directory, loading every record.
    ///
    /// Files that fail to parse are skipped with a warning rather than
    /// aborting startup.
    pub fn open(dir: impl Into<PathBuf>) -> PaymentResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| PaymentError::Storage(format!("create {}: {}", dir.display(), e)))?;

        let mut records = HashMap::new();
        let entries = fs::read_dir(&dir)
            .map_err(|e| PaymentError::Storage(format!("read {}: {}", dir.display(), e)))?;

        for entry in entries {
            let entry =
                entry.map_err(|e| PaymentError::Storage(format!("scan {}: {}", dir.display(), e)))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match load_record::<T>(&path) {
                Ok((key, record)) => {
                    records.insert(key, record);
                }
                Err(e) => {
                    warn!("skipping unreadable record {}: {}", path.display(), e);
                }
            }
        }

        debug!("loaded {} records from {}", records.len(), dir.display());
        Ok(Self {
            dir,
            records: RwLock::new(records),
        })
    }

    /// Append a new record under `key`
    pub async fn insert(&self, key: &str, record: T) -> PaymentResult<()> {
        validate_key(key)?;
        let mut records = self.records.write().await;
        if records.contains_key(key) {
            return Err(PaymentError::Storage(format!("duplicate key: {}", key)));
        }
        self.persist(key, &record)?;
        records.insert(key.to_string(), record);
        Ok(())
    }

    /// Fetch a record by key
    pub async fn get(&self, key: &str) -> Option<T> {
        self.records.read().await.get(key).cloned()
    }

    /// Atomically mutate a record in place.
    ///
    /// Returns `Ok(None)` for an unknown key; mutator errors propagate
    /// with the record untouched in memory and on disk.
    pub async fn update_with(&self, key: &str, mutate: Mutator<T>) -> PaymentResult<Option<T>> {
        let mut records = self.records.write().await;
        let Some(current) = records.get(key) else {
            return Ok(None);
        };

        let mut candidate = current.clone();
        mutate(&mut candidate)?;
        self.persist(key, &candidate)?;
        records.insert(key.to_string(), candidate.clone());
        Ok(Some(candidate))
    }

    /// Snapshot of every record
    pub async fn list(&self) -> Vec<T> {
        self.records.read().await.values().cloned().collect()
    }

    /// Snapshot of records matching a predicate
    pub async fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.records
            .read()
            .await
            .values()
            .filter(|r| pred(r))
            .cloned()
            .collect()
    }

    /// Delete a record and its file. Compensation path only.
    pub async fn remove(&self, key: &str) -> PaymentResult<()> {
        let mut records = self.records.write().await;
        if records.remove(key).is_none() {
            return Ok(());
        }
        let path = self.record_path(key);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(PaymentError::Storage(format!(
                    "remove {}: {}",
                    path.display(),
                    e
                )));
            }
        }
        Ok(())
    }

    /// Number of records currently held
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Durable write: serialize, write to a temp sibling, rename over.
    fn persist(&self, key: &str, record: &T) -> PaymentResult<()> {
        let path = self.record_path(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));

        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| PaymentError::Storage(format!("serialize {}: {}", key, e)))?;
        fs::write(&tmp, bytes)
            .map_err(|e| PaymentError::Storage(format!("write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .map_err(|e| PaymentError::Storage(format!("rename {}: {}", path.display(), e)))?;
        Ok(())
    }
}

fn load_record<T: DeserializeOwned>(path: &Path) -> Result<(String, T), String> {
    let key = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| "non-utf8 file name".to_string())?
        .to_string();
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let record = serde_json::from_slice(&bytes).map_err(|e| e.to_string())?;
    Ok((key, record))
}

/// Keys become file names; reject anything that could escape the dir
fn validate_key(key: &str) -> PaymentResult<()> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(PaymentError::Storage(format!("invalid record key: {}", key)))
    }
}

/// Durable session store backed by one file per session
pub type FileSessionStore = JsonStore<PaymentSession>;

/// Durable order store backed by one file per order
pub type FileOrderStore = JsonStore<Order>;

#[async_trait::async_trait]
impl SessionStore for JsonStore<PaymentSession> {
    async fn insert(&self, session: PaymentSession) -> PaymentResult<()> {
        let key = session.session_id.clone();
        JsonStore::insert(self, &key, session).await
    }

    async fn get(&self, session_id: &str) -> PaymentResult<Option<PaymentSession>> {
        Ok(JsonStore::get(self, session_id).await)
    }

    async fn update(
        &self,
        session_id: &str,
        mutate: Mutator<PaymentSession>,
    ) -> PaymentResult<PaymentSession> {
        self.update_with(session_id, mutate)
            .await?
            .ok_or_else(|| PaymentError::SessionNotFound {
                session_id: session_id.to_string(),
            })
    }

    async fn list(&self) -> PaymentResult<Vec<PaymentSession>> {
        Ok(JsonStore::list(self).await)
    }
}

#[async_trait::async_trait]
impl OrderStore for JsonStore<Order> {
    async fn insert(&self, order: Order) -> PaymentResult<()> {
        let key = order.order_id.clone();
        JsonStore::insert(self, &key, order).await
    }

    async fn get(&self, order_id: &str) -> PaymentResult<Option<Order>> {
        Ok(JsonStore::get(self, order_id).await)
    }

    async fn update(&self, order_id: &str, mutate: Mutator<Order>) -> PaymentResult<Order> {
        self.update_with(order_id, mutate)
            .await?
            .ok_or_else(|| PaymentError::OrderNotFound {
                order_id: order_id.to_string(),
            })
    }

    async fn list(&self) -> PaymentResult<Vec<Order>> {
        Ok(JsonStore::list(self).await)
    }

    async fn find_by_email(&self, email: &str) -> PaymentResult<Vec<Order>> {
        Ok(self.filter(|o| o.customer.email == email).await)
    }

    async fn remove(&self, order_id: &str) -> PaymentResult<()> {
        JsonStore::remove(self, order_id).await
    }
}
