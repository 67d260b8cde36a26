//! Storage abstractions for the service layer
//!
//! `MovieInfoStore` is the only persisted-state boundary. Single results are
//! tri-state (`Ok(Some)`, `Ok(None)`, `Err`); multi-value results are
//! channel-backed streams produced by a spawned task.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use models::MovieInfo;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::debug;

use crate::errors::ServiceError;

pub mod document_store;

pub use document_store::DocumentStore;

/// Ordered records ending either when the channel closes (completion) or
/// after an `Err` item (failure).
pub type RecordStream = Pin<Box<dyn Stream<Item = Result<MovieInfo, ServiceError>> + Send>>;

#[async_trait]
pub trait MovieInfoStore: Send + Sync {
    /// Every record currently stored, in store order. Always finite.
    fn find_all(&self) -> RecordStream;

    /// `Ok(None)` when nothing is stored under `id`; absence is never an error.
    async fn find_by_id(&self, id: &str) -> Result<Option<MovieInfo>, ServiceError>;

    /// Drafts get a fresh id; records with an id are upserted.
    async fn save(&self, record: MovieInfo) -> Result<MovieInfo, ServiceError>;

    /// No-op when `id` is absent.
    async fn delete_by_id(&self, id: &str) -> Result<(), ServiceError>;

    /// Administrative: empties the collection. Not exposed over HTTP.
    async fn delete_all(&self) -> Result<(), ServiceError>;
}

/// Save `records` one after another, emitting each stored record in input order.
///
/// The producer stops after the first failure (which it emits) or as soon as
/// the consumer drops the stream.
pub fn save_all(
    store: Arc<dyn MovieInfoStore>,
    records: Vec<MovieInfo>,
    capacity: usize,
) -> RecordStream {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    tokio::spawn(async move {
        for record in records {
            let outcome = store.save(record).await;
            let failed = outcome.is_err();
            if tx.send(outcome).await.is_err() {
                debug!("save_all consumer dropped; stopping");
                return;
            }
            if failed {
                return;
            }
        }
    });
    Box::pin(ReceiverStream::new(rx))
}
