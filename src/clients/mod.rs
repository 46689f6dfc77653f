pub mod imagery;
pub mod usgs;
