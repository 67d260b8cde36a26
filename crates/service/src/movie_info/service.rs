use std::sync::Arc;

use models::MovieInfo;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::storage::{MovieInfoStore, RecordStream};

/// Application service for movie info records.
/// Stateless: every call round-trips through the store, nothing is cached.
pub struct MovieInfoService {
    store: Arc<dyn MovieInfoStore>,
}

impl MovieInfoService {
    pub fn new(store: Arc<dyn MovieInfoStore>) -> Self { Self { store } }

    pub fn list(&self) -> RecordStream { self.store.find_all() }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<MovieInfo, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("movie info", id))
    }

    /// Only drafts may be created; the store assigns the id.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: MovieInfo) -> Result<MovieInfo, ServiceError> {
        if let Some(id) = &draft.id {
            return Err(ServiceError::Validation(format!(
                "movieInfo.id must be absent on create, got {id:?}"
            )));
        }
        draft.validate()?;
        let created = self.store.save(draft).await?;
        info!(id = created.id.as_deref().unwrap_or_default(), "movie_info_created");
        Ok(created)
    }

    /// Replace every field of an existing record except its id.
    /// Any id carried by `patch` is ignored in favour of `id`.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: MovieInfo) -> Result<MovieInfo, ServiceError> {
        let existing = self.get(id).await?;
        let record = match existing.id {
            Some(existing_id) => patch.with_id(existing_id),
            None => return Err(ServiceError::Store(format!("stored movie info {id} has no id"))),
        };
        record.validate()?;
        let updated = self.store.save(record).await?;
        info!(%id, "movie_info_updated");
        Ok(updated)
    }

    /// Idempotent: deleting an absent id succeeds.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.store.delete_by_id(id).await?;
        info!(%id, "movie_info_deleted");
        Ok(())
    }
}
