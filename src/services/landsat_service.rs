//! Domain service for pixel fetches and search history.
//!
//! A fetch validates the request, reads a 3×3 window from the imagery
//! provider, reshapes it into a [`PixelGrid`] and records the search with its
//! nine pixels in one transaction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clients::imagery::{ImageryError, SceneSummary};
use crate::db::{PixelData, Search};
use crate::domain::{CoordinateError, SearchId, UserId};
use crate::models::{BandMetadata, PixelGrid, PixelRecord};

/// Errors specific to Landsat operations.
///
/// The variant is kept until the HTTP boundary so logs can tell an upstream
/// failure apart from bad input or a storage problem.
#[derive(Debug, Error)]
pub enum LandsatError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Fetch(String),

    #[error("{0}")]
    Persistence(String),

    #[error("{0}")]
    NotFound(String),
}

impl LandsatError {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Fetch(_) => "fetch",
            Self::Persistence(_) => "persistence",
            Self::NotFound(_) => "not_found",
        }
    }
}

impl From<ImageryError> for LandsatError {
    fn from(err: ImageryError) -> Self {
        Self::Fetch(err.to_string())
    }
}

impl From<CoordinateError> for LandsatError {
    fn from(err: CoordinateError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<sea_orm::DbErr> for LandsatError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Persistence(err.to_string())
    }
}

// `DbErr` already renders its sources, so only the outer context and the
// root cause are kept.
impl From<anyhow::Error> for LandsatError {
    fn from(err: anyhow::Error) -> Self {
        if err.chain().count() > 1 {
            Self::Persistence(format!("{err}: {}", err.root_cause()))
        } else {
            Self::Persistence(err.to_string())
        }
    }
}

/// Body of `POST /api/landsat/data`.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub scene_id: String,
}

/// Result of a successful fetch.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedPixels {
    pub grid: PixelGrid,
    pub center_pixel: PixelRecord,
    pub metadata: BandMetadata,
    pub search_id: SearchId,
}

/// Body of `POST /api/landsat/search`. Missing fields fall back to config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneSearchRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub max_cloud_cover: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchDto {
    pub id: SearchId,
    pub latitude: f64,
    pub longitude: f64,
    pub scene_id: String,
    pub cloud_cover: Option<f64>,
    pub created_at: String,
}

impl From<Search> for SearchDto {
    fn from(search: Search) -> Self {
        Self {
            id: search.id,
            latitude: search.latitude,
            longitude: search.longitude,
            scene_id: search.scene_id,
            cloud_cover: search.cloud_cover,
            created_at: search.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PixelDto {
    pub grid_position: i32,
    pub is_center: bool,
    #[serde(flatten)]
    pub values: PixelRecord,
}

impl From<PixelData> for PixelDto {
    fn from(pixel: PixelData) -> Self {
        Self {
            grid_position: pixel.grid_position,
            is_center: pixel.is_center,
            values: pixel.values,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchDetailDto {
    #[serde(flatten)]
    pub search: SearchDto,
    pub pixels: Vec<PixelDto>,
}

/// Domain service trait for Landsat pixel fetches.
#[async_trait::async_trait]
pub trait LandsatService: Send + Sync {
    /// Fetches the 3×3 window around a point and records it for `user_id`.
    ///
    /// # Errors
    ///
    /// - [`LandsatError::InvalidInput`] before any provider call when the
    ///   coordinate or scene id is unusable.
    /// - [`LandsatError::Fetch`] when the provider fails; nothing is stored.
    /// - [`LandsatError::Persistence`] when the transaction fails; nothing is
    ///   stored either.
    async fn fetch_pixels(
        &self,
        user_id: UserId,
        request: FetchRequest,
    ) -> Result<ProcessedPixels, LandsatError>;

    /// Lists catalog scenes covering a point.
    async fn search_scenes(
        &self,
        request: SceneSearchRequest,
    ) -> Result<Vec<SceneSummary>, LandsatError>;

    /// Most recent searches of a user, newest first.
    async fn recent_searches(
        &self,
        user_id: UserId,
        limit: Option<u64>,
    ) -> Result<Vec<SearchDto>, LandsatError>;

    /// A stored search with its pixels ordered by grid position.
    ///
    /// # Errors
    ///
    /// Returns [`LandsatError::NotFound`] when the search does not exist or
    /// belongs to another user.
    async fn search_pixels(
        &self,
        user_id: UserId,
        search_id: SearchId,
    ) -> Result<SearchDetailDto, LandsatError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Band;

    #[test]
    fn error_kinds_are_stable() {
        assert_eq!(LandsatError::InvalidInput(String::new()).kind(), "invalid_input");
        assert_eq!(LandsatError::Fetch(String::new()).kind(), "fetch");
        assert_eq!(LandsatError::Persistence(String::new()).kind(), "persistence");
        assert_eq!(LandsatError::NotFound(String::new()).kind(), "not_found");
    }

    #[test]
    fn imagery_errors_become_fetch_errors_with_message() {
        let err: LandsatError = ImageryError::SceneNotFound("LC09_X".to_string()).into();
        assert!(matches!(err, LandsatError::Fetch(_)));
        assert_eq!(err.to_string(), "Scene not found: LC09_X");
    }

    #[test]
    fn persistence_errors_name_the_cause_once() {
        let err = anyhow::Error::new(sea_orm::DbErr::Custom(
            "no such table: pixel_data".to_string(),
        ))
        .context("Failed to insert pixel at position 0");

        let LandsatError::Persistence(message) = LandsatError::from(err) else {
            panic!("expected a persistence error");
        };
        assert!(message.starts_with("Failed to insert pixel at position 0: "));
        assert_eq!(message.matches("no such table: pixel_data").count(), 1);

        let bare = LandsatError::from(anyhow::anyhow!("database is locked"));
        assert_eq!(bare.to_string(), "database is locked");
    }

    #[test]
    fn pixel_dto_flattens_band_values() {
        let dto = PixelDto {
            grid_position: 4,
            is_center: true,
            values: PixelRecord::from_fn(|band| match band {
                Band::Blue => 0.1,
                _ => 0.0,
            }),
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["grid_position"], 4);
        assert_eq!(json["is_center"], true);
        assert_eq!(json["B2"], 0.1);
        assert_eq!(json["B7"], 0.0);
    }

    #[test]
    fn scene_search_request_defaults() {
        let req: SceneSearchRequest =
            serde_json::from_str(r#"{"latitude": 45.0, "longitude": -93.0}"#).unwrap();
        assert!(req.start_date.is_none());
        assert!(req.max_cloud_cover.is_none());

        let req: SceneSearchRequest = serde_json::from_str(
            r#"{"latitude": 45.0, "longitude": -93.0, "start_date": "2024-01-01", "max_cloud_cover": 10}"#,
        )
        .unwrap();
        assert_eq!(req.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(req.max_cloud_cover, Some(10.0));
    }
}
