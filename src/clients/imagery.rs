//! Imagery provider abstraction.
//!
//! A provider hands out sessions. Every catalog or raster call goes through a
//! session, and the caller closes it explicitly when done, on success and on
//! failure alike.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::domain::Coordinate;
use crate::models::grid::BandWindows;

#[derive(Debug, Error)]
pub enum ImageryError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Invalid provider response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ImageryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Catalog search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneQuery {
    pub coordinate: Coordinate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub max_cloud_cover: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSummary {
    pub scene_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_id: Option<String>,
    pub cloud_cover: Option<f64>,
    pub date: Option<String>,
}

/// 3×3 windows of every band around a point, as served by the raster-window
/// service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelWindow {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cloud_cover: Option<f64>,
    pub bands: BandWindows,
}

#[async_trait]
pub trait ImageryProvider: Send + Sync {
    /// Authenticates and returns a session handle.
    async fn open_session(&self) -> Result<Box<dyn ImagerySession>, ImageryError>;
}

#[async_trait]
pub trait ImagerySession: Send + Sync {
    async fn search_scenes(&self, query: &SceneQuery) -> Result<Vec<SceneSummary>, ImageryError>;

    async fn pixel_window(
        &self,
        scene_id: &str,
        at: Coordinate,
    ) -> Result<PixelWindow, ImageryError>;

    /// Releases the remote session. The handle must not be used afterwards.
    async fn close(&self) -> Result<(), ImageryError>;
}

/// Accepts a number, a numeric string or null.
///
/// The USGS catalog reports cloud cover as a string for some datasets.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    Ok(
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::Number(n)) => Some(n),
            Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
            None => None,
        }
        .filter(|v: &f64| v.is_finite() && *v >= 0.0),
    )
}
