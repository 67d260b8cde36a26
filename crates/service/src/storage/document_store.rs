use std::{collections::HashMap, io::ErrorKind, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::MovieInfo;
use tokio::{fs, sync::{mpsc, RwLock}};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::{MovieInfoStore, RecordStream};

struct Entry {
    seq: u64,
    record: MovieInfo,
}

/// Records keyed by id, remembering first-insert order.
#[derive(Default)]
struct Collection {
    next_seq: u64,
    docs: HashMap<String, Entry>,
}

impl Collection {
    fn from_records(records: Vec<MovieInfo>) -> Result<Self, ServiceError> {
        let mut collection = Collection::default();
        for record in records {
            let id = record
                .id
                .clone()
                .ok_or_else(|| ServiceError::Store("stored record without id".into()))?;
            collection.upsert(id, record);
        }
        Ok(collection)
    }

    fn ordered(&self) -> Vec<MovieInfo> {
        let mut entries: Vec<&Entry> = self.docs.values().collect();
        entries.sort_by_key(|e| e.seq);
        entries.into_iter().map(|e| e.record.clone()).collect()
    }

    /// Returns the record previously stored under `id`, if any.
    fn upsert(&mut self, id: String, record: MovieInfo) -> Option<MovieInfo> {
        match self.docs.get_mut(&id) {
            Some(entry) => Some(std::mem::replace(&mut entry.record, record)),
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.docs.insert(id, Entry { seq, record });
                None
            }
        }
    }
}

/// Document collection with optional JSON-file persistence.
///
/// Every mutation runs under the write lock and, when a file is configured,
/// rewrites the file before the lock is released, so writes to the same id are
/// serialized and the last one wins. A failed write leaves memory unchanged.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<RwLock<Collection>>,
    file_path: Option<PathBuf>,
    channel_capacity: usize,
}

impl DocumentStore {
    pub fn in_memory(channel_capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Collection::default())),
            file_path: None,
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Open a file-backed store. Creates the file with an empty collection if missing.
    pub async fn open<P: Into<PathBuf>>(path: P, channel_capacity: usize) -> Result<Self, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(ServiceError::store)?;
            }
        }

        let collection = match fs::read(&file_path).await {
            Ok(bytes) => {
                let records: Vec<MovieInfo> = serde_json::from_slice(&bytes).map_err(|e| {
                    ServiceError::Store(format!("{}: {}", file_path.display(), e))
                })?;
                Collection::from_records(records)?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::write(&file_path, b"[]").await.map_err(ServiceError::store)?;
                Collection::default()
            }
            Err(e) => return Err(ServiceError::store(e)),
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(collection)),
            file_path: Some(file_path),
            channel_capacity: channel_capacity.max(1),
        })
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.docs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn persist(&self, collection: &Collection) -> Result<(), ServiceError> {
        let Some(path) = &self.file_path else { return Ok(()) };
        let data = serde_json::to_vec_pretty(&collection.ordered()).map_err(ServiceError::store)?;
        fs::write(path, data).await.map_err(ServiceError::store)
    }
}

#[async_trait]
impl MovieInfoStore for DocumentStore {
    fn find_all(&self) -> RecordStream {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let snapshot = inner.read().await.ordered();
            for record in snapshot {
                if tx.send(Ok(record)).await.is_err() {
                    break;
                }
            }
        });
        Box::pin(ReceiverStream::new(rx))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MovieInfo>, ServiceError> {
        let collection = self.inner.read().await;
        Ok(collection.docs.get(id).map(|e| e.record.clone()))
    }

    async fn save(&self, record: MovieInfo) -> Result<MovieInfo, ServiceError> {
        let id = record.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let stored = record.with_id(id.clone());

        let mut collection = self.inner.write().await;
        let previous = collection.upsert(id.clone(), stored.clone());
        if let Err(e) = self.persist(&collection).await {
            match previous {
                Some(old) => {
                    collection.upsert(id, old);
                }
                None => {
                    collection.docs.remove(&id);
                }
            }
            return Err(e);
        }
        Ok(stored)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), ServiceError> {
        let mut collection = self.inner.write().await;
        let Some(removed) = collection.docs.remove(id) else { return Ok(()) };
        if let Err(e) = self.persist(&collection).await {
            collection.docs.insert(id.to_string(), removed);
            return Err(e);
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), ServiceError> {
        let mut collection = self.inner.write().await;
        let previous = std::mem::take(&mut *collection);
        if let Err(e) = self.persist(&collection).await {
            *collection = previous;
            return Err(e);
        }
        Ok(())
    }
}
