//! `SeaORM` implementation of the `LandsatService` trait.

use async_trait::async_trait;
use chrono::{Days, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::imagery::{ImageryProvider, ImagerySession, SceneQuery, SceneSummary};
use crate::config::ImageryConfig;
use crate::constants::{landsat::MAX_SCENE_ID_LEN, limits};
use crate::db::{NewSearch, Store};
use crate::domain::{Coordinate, SearchId, UserId};
use crate::models::{BandMetadata, extract_grid};
use crate::services::landsat_service::{
    FetchRequest, LandsatError, LandsatService, PixelDto, ProcessedPixels, SceneSearchRequest,
    SearchDetailDto, SearchDto,
};

pub struct SeaOrmLandsatService {
    store: Store,
    imagery: Arc<dyn ImageryProvider>,
    config: ImageryConfig,
}

impl SeaOrmLandsatService {
    #[must_use]
    pub fn new(store: Store, imagery: Arc<dyn ImageryProvider>, config: ImageryConfig) -> Self {
        Self {
            store,
            imagery,
            config,
        }
    }

    async fn close_session(session: &dyn ImagerySession) {
        if let Err(e) = session.close().await {
            warn!(error = %e, "Failed to close imagery session");
        }
    }

    async fn fetch_and_record(
        &self,
        user_id: UserId,
        request: FetchRequest,
    ) -> Result<ProcessedPixels, LandsatError> {
        let at = Coordinate::new(request.latitude, request.longitude)?;
        let scene_id = validate_scene_id(&request.scene_id)?;

        let session = self.imagery.open_session().await?;
        let window = session.pixel_window(scene_id, at).await;
        Self::close_session(session.as_ref()).await;
        let window = window?;

        let grid = extract_grid(&window.bands);

        let (search, pixels) = self
            .store
            .record_search(
                NewSearch {
                    user_id,
                    latitude: at.latitude(),
                    longitude: at.longitude(),
                    scene_id: scene_id.to_string(),
                    cloud_cover: window.cloud_cover,
                },
                &grid,
            )
            .await?;

        info!(
            search_id = %search.id,
            scene_id = %search.scene_id,
            pixels = pixels.len(),
            "Recorded pixel grid"
        );

        Ok(ProcessedPixels {
            center_pixel: *grid.center(),
            grid,
            metadata: BandMetadata::landsat().with_cloud_cover(window.cloud_cover),
            search_id: search.id,
        })
    }

    fn scene_query(&self, request: &SceneSearchRequest) -> Result<SceneQuery, LandsatError> {
        let coordinate = Coordinate::new(request.latitude, request.longitude)?;

        let end_date = request.end_date.unwrap_or_else(|| Utc::now().date_naive());
        let start_date = match request.start_date {
            Some(date) => date,
            None => end_date
                .checked_sub_days(Days::new(u64::from(self.config.search_window_days)))
                .ok_or_else(|| LandsatError::InvalidInput("Invalid date range".to_string()))?,
        };

        if start_date > end_date {
            return Err(LandsatError::InvalidInput(format!(
                "start_date {start_date} is after end_date {end_date}"
            )));
        }

        let max_cloud_cover = request
            .max_cloud_cover
            .unwrap_or(self.config.max_cloud_cover);
        if !(0.0..=100.0).contains(&max_cloud_cover) {
            return Err(LandsatError::InvalidInput(format!(
                "max_cloud_cover must be between 0 and 100, got {max_cloud_cover}"
            )));
        }

        Ok(SceneQuery {
            coordinate,
            start_date,
            end_date,
            max_cloud_cover,
        })
    }
}

#[async_trait]
impl LandsatService for SeaOrmLandsatService {
    async fn fetch_pixels(
        &self,
        user_id: UserId,
        request: FetchRequest,
    ) -> Result<ProcessedPixels, LandsatError> {
        let result = self.fetch_and_record(user_id, request).await;

        let outcome = result.as_ref().map_or_else(LandsatError::kind, |_| "success");
        metrics::counter!("landsat_fetch_total", "outcome" => outcome).increment(1);

        result
    }

    async fn search_scenes(
        &self,
        request: SceneSearchRequest,
    ) -> Result<Vec<SceneSummary>, LandsatError> {
        let query = self.scene_query(&request)?;

        let session = self.imagery.open_session().await?;
        let scenes = session.search_scenes(&query).await;
        Self::close_session(session.as_ref()).await;

        let scenes = scenes?;
        debug!(count = scenes.len(), at = %query.coordinate, "Scene search returned");
        Ok(scenes)
    }

    async fn recent_searches(
        &self,
        user_id: UserId,
        limit: Option<u64>,
    ) -> Result<Vec<SearchDto>, LandsatError> {
        let limit = limit.unwrap_or(limits::DEFAULT_HISTORY_LIMIT);
        if !(1..=limits::MAX_HISTORY_LIMIT).contains(&limit) {
            return Err(LandsatError::InvalidInput(format!(
                "Invalid limit: {limit}. Limit must be between 1 and {}",
                limits::MAX_HISTORY_LIMIT
            )));
        }

        let searches = self.store.get_user_searches(user_id, limit).await?;
        Ok(searches.into_iter().map(SearchDto::from).collect())
    }

    async fn search_pixels(
        &self,
        user_id: UserId,
        search_id: SearchId,
    ) -> Result<SearchDetailDto, LandsatError> {
        let search = self
            .store
            .get_search(search_id)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| LandsatError::NotFound(format!("Search {search_id} not found")))?;

        let mut pixels = self.store.get_pixel_data(search_id).await?;
        pixels.sort_by_key(|p| p.grid_position);

        Ok(SearchDetailDto {
            search: search.into(),
            pixels: pixels.into_iter().map(PixelDto::from).collect(),
        })
    }
}

fn validate_scene_id(scene_id: &str) -> Result<&str, LandsatError> {
    let trimmed = scene_id.trim();
    if trimmed.is_empty() {
        return Err(LandsatError::InvalidInput(
            "scene_id cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_SCENE_ID_LEN {
        return Err(LandsatError::InvalidInput(format!(
            "scene_id must be {MAX_SCENE_ID_LEN} characters or less"
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_id_is_trimmed_and_bounded() {
        assert_eq!(validate_scene_id("  LC09_L2SP_TEST ").unwrap(), "LC09_L2SP_TEST");
        assert!(validate_scene_id("").is_err());
        assert!(validate_scene_id("   ").is_err());
        assert!(validate_scene_id(&"X".repeat(120)).is_ok());
        assert!(validate_scene_id(&"X".repeat(121)).is_err());
    }
}
