pub mod band;
pub mod grid;

pub use band::{Band, BandMetadata};
pub use grid::{BandWindow, BandWindows, PixelGrid, PixelRecord, extract_grid};
