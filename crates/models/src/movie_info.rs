use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// A catalog entry describing one movie.
///
/// - `id`: assigned by the store on first save; `None` marks a draft
/// - `cast`: kept exactly in submitted order, duplicates included
/// - `release_date`: serialized as `releaseDate` in `YYYY-MM-DD` form
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MovieInfo {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub year: i32,
    pub cast: Vec<String>,
    pub release_date: NaiveDate,
}

impl MovieInfo {
    pub fn draft(
        name: impl Into<String>,
        year: i32,
        cast: Vec<String>,
        release_date: NaiveDate,
    ) -> Self {
        Self { id: None, name: name.into(), year, cast, release_date }
    }

    pub fn is_draft(&self) -> bool {
        self.id.is_none()
    }

    /// Same fields, stored under `id`. Whatever id `self` carried is discarded.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..self }
    }

    /// Field rules checked before every write. All violations are reported in one message.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("movieInfo.name must be present".to_string());
        }
        if self.year <= 0 {
            problems.push("movieInfo.year must be a positive value".to_string());
        }
        if self.cast.iter().any(|member| member.trim().is_empty()) {
            problems.push("movieInfo.cast must not contain blank names".to_string());
        }
        if problems.is_empty() {
            return Ok(());
        }
        problems.sort();
        Err(ModelError::Validation(problems.join(", ")))
    }
}
