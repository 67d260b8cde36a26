//! Fixture helpers for tests: bounded-timeout waits, seeding and draining.
//! Never used on request paths.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::NaiveDate;
use models::MovieInfo;
use tokio_stream::StreamExt;

use crate::errors::ServiceError;
use crate::storage::{save_all, MovieInfoStore, RecordStream};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Await `fut`, failing if it does not finish within [`DEFAULT_TIMEOUT`].
pub async fn within<F: Future>(fut: F) -> anyhow::Result<F::Output> {
    tokio::time::timeout(DEFAULT_TIMEOUT, fut)
        .await
        .map_err(|_| anyhow!("timed out after {:?}", DEFAULT_TIMEOUT))
}

/// Collect a finite stream, surfacing its error marker as `Err`.
pub async fn drain(stream: RecordStream) -> anyhow::Result<Vec<MovieInfo>> {
    let collected: Result<Vec<MovieInfo>, ServiceError> = within(stream.collect()).await?;
    Ok(collected?)
}

/// Save `records` in order and wait for the last one to be stored.
pub async fn seed(store: Arc<dyn MovieInfoStore>, records: Vec<MovieInfo>) -> anyhow::Result<Vec<MovieInfo>> {
    drain(save_all(store, records, 4)).await.context("seeding store")
}

fn date(raw: &str) -> NaiveDate {
    raw.parse().expect("fixture date")
}

/// Two drafts and one record with the fixed id `abc`.
pub fn sample_movie_infos() -> Vec<MovieInfo> {
    vec![
        MovieInfo::draft(
            "Batman Begins",
            2005,
            vec!["Christian Bale".into(), "Michael Cane".into()],
            date("2005-06-15"),
        ),
        MovieInfo::draft(
            "The Dark Knight",
            2008,
            vec!["Christian Bale".into(), "HeathLedger".into()],
            date("2008-07-18"),
        ),
        MovieInfo::draft(
            "Dark Knight Rises",
            2012,
            vec!["Christian Bale".into(), "Tom Hardy".into()],
            date("2012-07-20"),
        )
        .with_id("abc"),
    ]
}

/// Store whose every operation fails, for exercising the failure path.
#[derive(Default)]
pub struct FailingStore {
    saves: AtomicUsize,
}

impl FailingStore {
    pub fn save_calls(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn failure() -> ServiceError {
        ServiceError::Store("backend unavailable".into())
    }
}

#[async_trait]
impl MovieInfoStore for FailingStore {
    fn find_all(&self) -> RecordStream {
        Box::pin(tokio_stream::once(Err(Self::failure())))
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<MovieInfo>, ServiceError> {
        Err(Self::failure())
    }

    async fn save(&self, _record: MovieInfo) -> Result<MovieInfo, ServiceError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Err(Self::failure())
    }

    async fn delete_by_id(&self, _id: &str) -> Result<(), ServiceError> {
        Err(Self::failure())
    }

    async fn delete_all(&self) -> Result<(), ServiceError> {
        Err(Self::failure())
    }
}
