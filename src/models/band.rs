use serde::{Deserialize, Serialize};
use std::fmt;

/// Landsat 8/9 OLI surface reflectance bands carried through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "B2")]
    Blue,
    #[serde(rename = "B3")]
    Green,
    #[serde(rename = "B4")]
    Red,
    #[serde(rename = "B5")]
    Nir,
    #[serde(rename = "B6")]
    Swir1,
    #[serde(rename = "B7")]
    Swir2,
}

impl Band {
    /// Spectral order, shortest wavelength first.
    pub const ALL: [Self; 6] = [
        Self::Blue,
        Self::Green,
        Self::Red,
        Self::Nir,
        Self::Swir1,
        Self::Swir2,
    ];

    /// Identifier used by the provider and in JSON payloads (`B2`..`B7`).
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Blue => "B2",
            Self::Green => "B3",
            Self::Red => "B4",
            Self::Nir => "B5",
            Self::Swir1 => "B6",
            Self::Swir2 => "B7",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Blue => "Blue",
            Self::Green => "Green",
            Self::Red => "Red",
            Self::Nir => "NIR",
            Self::Swir1 => "SWIR1",
            Self::Swir2 => "SWIR2",
        }
    }

    /// Band center wavelength in micrometers.
    #[must_use]
    pub const fn wavelength_um(self) -> f64 {
        match self {
            Self::Blue => 0.48,
            Self::Green => 0.56,
            Self::Red => 0.65,
            Self::Nir => 0.86,
            Self::Swir1 => 1.61,
            Self::Swir2 => 2.2,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Static description of the bands returned with every grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BandMetadata {
    pub band_names: Vec<String>,
    pub wavelengths: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<f64>,
}

impl BandMetadata {
    #[must_use]
    pub fn landsat() -> Self {
        Self {
            band_names: Band::ALL
                .iter()
                .map(|b| b.display_name().to_string())
                .collect(),
            wavelengths: Band::ALL.iter().map(|b| b.wavelength_um()).collect(),
            cloud_cover: None,
        }
    }

    #[must_use]
    pub fn with_cloud_cover(mut self, cloud_cover: Option<f64>) -> Self {
        self.cloud_cover = cloud_cover;
        self
    }
}
