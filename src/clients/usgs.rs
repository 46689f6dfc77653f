//! USGS Machine-to-Machine (M2M) catalog client.
//!
//! Scene search and authentication go to the M2M JSON API. Pixel windows are
//! read from a raster-window service that serves small band windows of
//! Collection 2 Level 2 scenes as JSON.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;

use super::imagery::{
    ImageryError, ImageryProvider, ImagerySession, PixelWindow, SceneQuery, SceneSummary,
    lenient_f64,
};
use crate::constants::landsat::SEARCH_BOX_HALF_EXTENT;
use crate::domain::Coordinate;
use crate::models::grid::GRID_SIZE;

const AUTH_HEADER: &str = "X-Auth-Token";

const MAX_SCENE_RESULTS: u32 = 100;

#[derive(Debug, Clone)]
pub struct UsgsConfig {
    pub m2m_url: String,
    pub window_url: String,
    pub username: String,
    pub password: String,
    pub dataset: String,
}

#[derive(Debug, Clone)]
pub struct UsgsClient {
    client: Client,
    config: Arc<UsgsConfig>,
}

impl UsgsClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: UsgsConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.m2m_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl ImageryProvider for UsgsClient {
    #[instrument(skip(self), fields(user = %self.config.username))]
    async fn open_session(&self) -> Result<Box<dyn ImagerySession>, ImageryError> {
        if self.config.username.is_empty() {
            return Err(ImageryError::Authentication(
                "imagery credentials are not configured".to_string(),
            ));
        }

        let body = LoginRequest {
            username: &self.config.username,
            password: &self.config.password,
        };

        let response = self
            .client
            .post(self.endpoint("login"))
            .json(&body)
            .send()
            .await?;

        let token: String = match read_m2m(response).await {
            Ok(token) => token,
            Err(ImageryError::Api { code, message }) if code.starts_with("AUTH_") => {
                return Err(ImageryError::Authentication(message));
            }
            Err(e) => return Err(e),
        };

        debug!("Opened USGS M2M session");

        Ok(Box::new(UsgsSession {
            client: self.client.clone(),
            config: self.config.clone(),
            token,
        }))
    }
}

pub struct UsgsSession {
    client: Client,
    config: Arc<UsgsConfig>,
    token: String,
}

impl UsgsSession {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.m2m_url.trim_end_matches('/'), path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ImageryError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(path))
            .header(AUTH_HEADER, &self.token)
            .json(body)
            .send()
            .await?;

        read_m2m(response).await
    }

    /// Logout answers with `data: null`, so only the error fields are checked.
    async fn logout(&self) -> Result<(), ImageryError> {
        let response = self
            .client
            .post(self.endpoint("logout"))
            .header(AUTH_HEADER, &self.token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<M2mResponse<serde_json::Value>>(&body) {
            Ok(M2mResponse {
                error_code: Some(code),
                error_message,
                ..
            }) => Err(ImageryError::Api {
                code,
                message: error_message.unwrap_or_default(),
            }),
            _ if !status.is_success() => Err(ImageryError::Api {
                code: status.as_u16().to_string(),
                message: body,
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ImagerySession for UsgsSession {
    #[instrument(skip(self, query), fields(at = %query.coordinate))]
    async fn search_scenes(&self, query: &SceneQuery) -> Result<Vec<SceneSummary>, ImageryError> {
        let request = SceneSearchRequest::new(&self.config.dataset, query);
        let data: SceneSearchData = self.post("scene-search", &request).await?;

        let scenes = data.into_summaries();
        debug!(count = scenes.len(), "Scene search complete");
        Ok(scenes)
    }

    #[instrument(skip(self), fields(at = %at))]
    async fn pixel_window(
        &self,
        scene_id: &str,
        at: Coordinate,
    ) -> Result<PixelWindow, ImageryError> {
        let url = window_url(&self.config.window_url, scene_id, at)?;

        let response = self
            .client
            .get(url)
            .header(AUTH_HEADER, &self.token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ImageryError::SceneNotFound(scene_id.to_string()));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ImageryError::Authentication(format!(
                "raster-window service rejected the session ({status})"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageryError::Api {
                code: status.as_u16().to_string(),
                message: body,
            });
        }

        let window = response.json::<PixelWindow>().await?;
        Ok(window)
    }

    async fn close(&self) -> Result<(), ImageryError> {
        match self.logout().await {
            Ok(()) => {
                debug!("Closed USGS M2M session");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "USGS logout failed");
                Err(e)
            }
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct M2mResponse<T> {
    data: Option<T>,
    error_code: Option<String>,
    error_message: Option<String>,
}

impl<T> M2mResponse<T> {
    fn into_result(self) -> Result<T, ImageryError> {
        if let Some(code) = self.error_code {
            return Err(ImageryError::Api {
                code,
                message: self.error_message.unwrap_or_default(),
            });
        }

        self.data
            .ok_or_else(|| ImageryError::Decode("response carried no data".to_string()))
    }
}

async fn read_m2m<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ImageryError> {
    let status = response.status();
    let body = response.text().await?;

    // M2M reports most failures in the envelope, sometimes with a non-2xx status.
    match serde_json::from_str::<M2mResponse<T>>(&body) {
        Ok(envelope) => envelope.into_result(),
        Err(_) if !status.is_success() => Err(ImageryError::Api {
            code: status.as_u16().to_string(),
            message: body,
        }),
        Err(e) => Err(ImageryError::Decode(e.to_string())),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SceneSearchRequest<'a> {
    dataset_name: &'a str,
    max_results: u32,
    scene_filter: SceneFilter,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SceneFilter {
    spatial_filter: SpatialFilter,
    acquisition_filter: AcquisitionFilter,
    cloud_cover_filter: CloudCoverFilter,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpatialFilter {
    filter_type: &'static str,
    lower_left: Coordinate,
    upper_right: Coordinate,
}

#[derive(Debug, Serialize)]
struct AcquisitionFilter {
    start: String,
    end: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CloudCoverFilter {
    min: f64,
    max: f64,
    include_unknown: bool,
}

impl<'a> SceneSearchRequest<'a> {
    fn new(dataset: &'a str, query: &SceneQuery) -> Self {
        let (lower_left, upper_right) = query.coordinate.bounding_box(SEARCH_BOX_HALF_EXTENT);
        Self {
            dataset_name: dataset,
            max_results: MAX_SCENE_RESULTS,
            scene_filter: SceneFilter {
                spatial_filter: SpatialFilter {
                    filter_type: "mbr",
                    lower_left,
                    upper_right,
                },
                acquisition_filter: AcquisitionFilter {
                    start: query.start_date.format("%Y-%m-%d").to_string(),
                    end: query.end_date.format("%Y-%m-%d").to_string(),
                },
                cloud_cover_filter: CloudCoverFilter {
                    min: 0.0,
                    max: query.max_cloud_cover,
                    include_unknown: false,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct SceneSearchData {
    #[serde(default)]
    results: Vec<SceneResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneResult {
    entity_id: String,
    display_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    cloud_cover: Option<f64>,
    temporal_coverage: Option<TemporalCoverage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemporalCoverage {
    start_date: Option<String>,
}

impl SceneSearchData {
    fn into_summaries(self) -> Vec<SceneSummary> {
        self.results
            .into_iter()
            .map(|r| SceneSummary {
                scene_id: r.entity_id,
                display_id: r.display_id,
                cloud_cover: r.cloud_cover,
                date: r
                    .temporal_coverage
                    .and_then(|t| t.start_date)
                    .map(|d| d.chars().take(10).collect()),
            })
            .collect()
    }
}

/// `{base}/scenes/{scene_id}/window?lat=..&lon=..&size=3`
fn window_url(base: &str, scene_id: &str, at: Coordinate) -> Result<Url, ImageryError> {
    let mut url = Url::parse(base)
        .map_err(|e| ImageryError::Request(format!("invalid window service URL: {e}")))?;

    url.path_segments_mut()
        .map_err(|()| ImageryError::Request("window service URL cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(["scenes", scene_id, "window"]);

    url.query_pairs_mut()
        .append_pair("lat", &at.latitude().to_string())
        .append_pair("lon", &at.longitude().to_string())
        .append_pair("size", &GRID_SIZE.to_string());

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn envelope_error_code_wins() {
        let json = r#"{"data": null, "errorCode": "AUTH_INVALID", "errorMessage": "bad password"}"#;
        let envelope: M2mResponse<String> = serde_json::from_str(json).unwrap();
        match envelope.into_result() {
            Err(ImageryError::Api { code, message }) => {
                assert_eq!(code, "AUTH_INVALID");
                assert_eq!(message, "bad password");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn envelope_without_data_is_decode_error() {
        let envelope: M2mResponse<String> =
            serde_json::from_str(r#"{"data": null, "errorCode": null}"#).unwrap();
        assert!(matches!(
            envelope.into_result(),
            Err(ImageryError::Decode(_))
        ));
    }

    #[test]
    fn scene_results_map_to_summaries() {
        let json = serde_json::json!({
            "results": [
                {
                    "entityId": "LC90260292024045LGN00",
                    "displayId": "LC09_L2SP_026029_20240214_20240215_02_T1",
                    "cloudCover": "12.34",
                    "temporalCoverage": {"startDate": "2024-02-14 00:00:00", "endDate": "2024-02-14 00:00:00"}
                },
                {
                    "entityId": "LC80260292024037LGN00",
                    "cloudCover": -1
                }
            ],
            "totalHits": 2
        });
        let data: SceneSearchData = serde_json::from_value(json).unwrap();
        let scenes = data.into_summaries();

        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].scene_id, "LC90260292024045LGN00");
        assert_eq!(
            scenes[0].display_id.as_deref(),
            Some("LC09_L2SP_026029_20240214_20240215_02_T1")
        );
        assert_eq!(scenes[0].cloud_cover, Some(12.34));
        assert_eq!(scenes[0].date.as_deref(), Some("2024-02-14"));

        assert_eq!(scenes[1].scene_id, "LC80260292024037LGN00");
        assert_eq!(scenes[1].display_id, None);
        assert_eq!(scenes[1].cloud_cover, None);
        assert_eq!(scenes[1].date, None);
    }

    #[test]
    fn scene_search_request_shape() {
        let query = SceneQuery {
            coordinate: Coordinate::new(45.0, -93.0).unwrap(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            max_cloud_cover: 50.0,
        };
        let json = serde_json::to_value(SceneSearchRequest::new("landsat_ot_c2_l2", &query)).unwrap();

        assert_eq!(json["datasetName"], "landsat_ot_c2_l2");
        let filter = &json["sceneFilter"];
        assert_eq!(filter["spatialFilter"]["filterType"], "mbr");
        assert_eq!(filter["acquisitionFilter"]["start"], "2024-01-01");
        assert_eq!(filter["acquisitionFilter"]["end"], "2024-01-31");
        assert_eq!(filter["cloudCoverFilter"]["max"], 50.0);
        assert!(filter["spatialFilter"]["lowerLeft"]["latitude"].as_f64().unwrap() < 45.0);
        assert!(filter["spatialFilter"]["upperRight"]["longitude"].as_f64().unwrap() > -93.0);
    }

    #[test]
    fn window_url_encodes_scene_and_point() {
        let at = Coordinate::new(45.0, -93.5).unwrap();
        let url = window_url("https://raster.example.com/api/", "LC09 TEST", at).unwrap();

        assert_eq!(url.path(), "/api/scenes/LC09%20TEST/window");
        assert_eq!(url.query(), Some("lat=45&lon=-93.5&size=3"));
    }

    #[test]
    fn window_url_rejects_garbage_base() {
        let at = Coordinate::new(0.0, 0.0).unwrap();
        assert!(window_url("not a url", "X", at).is_err());
    }
}
