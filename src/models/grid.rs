//! 3×3 pixel grid extraction.
//!
//! Band windows arrive from the imagery provider as one 3×3 matrix per band.
//! The extractor flattens them into nine per-pixel records in row-major order,
//! which is also the order of the `grid_position` column in storage.

use serde::{Deserialize, Serialize};

use super::band::Band;

/// Side length of the window read around the requested coordinate.
pub const GRID_SIZE: usize = 3;

pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Row-major index of row 1, col 1.
pub const CENTER_POSITION: usize = 4;

pub type BandWindow = [[f64; GRID_SIZE]; GRID_SIZE];

/// One 3×3 window per band. All six bands are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandWindows {
    #[serde(rename = "B2")]
    pub blue: BandWindow,
    #[serde(rename = "B3")]
    pub green: BandWindow,
    #[serde(rename = "B4")]
    pub red: BandWindow,
    #[serde(rename = "B5")]
    pub nir: BandWindow,
    #[serde(rename = "B6")]
    pub swir1: BandWindow,
    #[serde(rename = "B7")]
    pub swir2: BandWindow,
}

impl BandWindows {
    /// Builds windows by evaluating `f(band, row, col)` for every cell.
    pub fn from_fn(f: impl Fn(Band, usize, usize) -> f64) -> Self {
        let window = |band: Band| -> BandWindow {
            std::array::from_fn(|row| std::array::from_fn(|col| f(band, row, col)))
        };
        Self {
            blue: window(Band::Blue),
            green: window(Band::Green),
            red: window(Band::Red),
            nir: window(Band::Nir),
            swir1: window(Band::Swir1),
            swir2: window(Band::Swir2),
        }
    }

    #[must_use]
    pub const fn window(&self, band: Band) -> &BandWindow {
        match band {
            Band::Blue => &self.blue,
            Band::Green => &self.green,
            Band::Red => &self.red,
            Band::Nir => &self.nir,
            Band::Swir1 => &self.swir1,
            Band::Swir2 => &self.swir2,
        }
    }
}

/// Values of the six bands at a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRecord {
    #[serde(rename = "B2")]
    pub blue: f64,
    #[serde(rename = "B3")]
    pub green: f64,
    #[serde(rename = "B4")]
    pub red: f64,
    #[serde(rename = "B5")]
    pub nir: f64,
    #[serde(rename = "B6")]
    pub swir1: f64,
    #[serde(rename = "B7")]
    pub swir2: f64,
}

impl PixelRecord {
    pub fn from_fn(f: impl Fn(Band) -> f64) -> Self {
        Self {
            blue: f(Band::Blue),
            green: f(Band::Green),
            red: f(Band::Red),
            nir: f(Band::Nir),
            swir1: f(Band::Swir1),
            swir2: f(Band::Swir2),
        }
    }

    #[must_use]
    pub const fn value(&self, band: Band) -> f64 {
        match band {
            Band::Blue => self.blue,
            Band::Green => self.green,
            Band::Red => self.red,
            Band::Nir => self.nir,
            Band::Swir1 => self.swir1,
            Band::Swir2 => self.swir2,
        }
    }

    /// Values in spectral order (B2..B7).
    #[must_use]
    pub fn values(&self) -> [f64; 6] {
        Band::ALL.map(|band| self.value(band))
    }
}

/// A cell of the grid as it is persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell<'a> {
    pub position: usize,
    pub is_center: bool,
    pub record: &'a PixelRecord,
}

/// Nine pixel records in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PixelGrid {
    cells: [PixelRecord; GRID_CELLS],
}

impl PixelGrid {
    #[must_use]
    pub const fn cells(&self) -> &[PixelRecord; GRID_CELLS] {
        &self.cells
    }

    #[must_use]
    pub const fn center(&self) -> &PixelRecord {
        &self.cells[CENTER_POSITION]
    }

    /// Record at `row`, `col`, both in `0..GRID_SIZE`.
    #[must_use]
    pub fn at(&self, row: usize, col: usize) -> Option<&PixelRecord> {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return None;
        }
        self.cells.get(position_of(row, col))
    }

    pub fn positions(&self) -> impl Iterator<Item = GridCell<'_>> {
        self.cells.iter().enumerate().map(|(position, record)| GridCell {
            position,
            is_center: position == CENTER_POSITION,
            record,
        })
    }
}

#[must_use]
pub const fn position_of(row: usize, col: usize) -> usize {
    row * GRID_SIZE + col
}

/// Flattens per-band windows into the row-major pixel grid.
#[must_use]
pub fn extract_grid(windows: &BandWindows) -> PixelGrid {
    let cells = std::array::from_fn(|position| {
        let (row, col) = (position / GRID_SIZE, position % GRID_SIZE);
        PixelRecord::from_fn(|band| windows.window(band)[row][col])
    });

    PixelGrid { cells }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encodes band, row and col in the value so every cell is distinct.
    #[allow(clippy::cast_precision_loss)]
    fn coded_windows() -> BandWindows {
        BandWindows::from_fn(|band, row, col| {
            let band_index = Band::ALL.iter().position(|b| *b == band).unwrap();
            (band_index * 100 + row * 10 + col) as f64
        })
    }

    #[test]
    fn extract_produces_nine_cells_row_major() {
        let grid = extract_grid(&coded_windows());
        assert_eq!(grid.cells().len(), GRID_CELLS);

        for (position, record) in grid.cells().iter().enumerate() {
            let (row, col) = (position / 3, position % 3);
            #[allow(clippy::cast_precision_loss)]
            let expected_blue = (row * 10 + col) as f64;
            assert_eq!(record.blue, expected_blue, "position {position}");
            assert_eq!(record.swir2, 500.0 + expected_blue);
        }
    }

    #[test]
    fn center_is_row_one_col_one() {
        let windows = coded_windows();
        let grid = extract_grid(&windows);

        assert_eq!(grid.center(), &grid.cells()[CENTER_POSITION]);
        assert_eq!(grid.at(1, 1), Some(grid.center()));
        for band in Band::ALL {
            assert_eq!(grid.center().value(band), windows.window(band)[1][1]);
        }
    }

    #[test]
    fn positions_flag_only_the_center() {
        let grid = extract_grid(&coded_windows());
        let cells: Vec<_> = grid.positions().collect();

        assert_eq!(
            cells.iter().map(|c| c.position).collect::<Vec<_>>(),
            (0..9).collect::<Vec<_>>()
        );
        let centers: Vec<_> = cells.iter().filter(|c| c.is_center).collect();
        assert_eq!(centers.len(), 1);
        assert_eq!(centers[0].position, 4);
    }

    #[test]
    fn at_rejects_out_of_range() {
        let grid = extract_grid(&coded_windows());
        assert!(grid.at(3, 0).is_none());
        assert!(grid.at(0, 3).is_none());
        assert_eq!(grid.at(2, 2), grid.cells().last());
    }

    #[test]
    fn grid_serializes_as_band_keyed_objects() {
        let grid = extract_grid(&coded_windows());
        let json = serde_json::to_value(&grid).unwrap();

        let cells = json.as_array().unwrap();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[4]["B2"], 11.0);
        assert_eq!(cells[4]["B7"], 511.0);
        assert_eq!(cells[0].as_object().unwrap().len(), 6);
    }

    #[test]
    fn windows_decode_from_provider_json() {
        let json = serde_json::json!({
            "B2": [[1, 2, 3], [4, 5, 6], [7, 8, 9]],
            "B3": [[1, 2, 3], [4, 5, 6], [7, 8, 9]],
            "B4": [[1, 2, 3], [4, 5, 6], [7, 8, 9]],
            "B5": [[1, 2, 3], [4, 5, 6], [7, 8, 9]],
            "B6": [[1, 2, 3], [4, 5, 6], [7, 8, 9]],
            "B7": [[1, 2, 3], [4, 5, 6], [7, 8, 9.5]]
        });
        let windows: BandWindows = serde_json::from_value(json).unwrap();
        assert_eq!(windows.swir2[2][2], 9.5);
        assert_eq!(extract_grid(&windows).center().red, 5.0);
    }

    #[test]
    fn windows_reject_wrong_shape_or_missing_band() {
        let short_row = serde_json::json!({
            "B2": [[1, 2], [4, 5, 6], [7, 8, 9]],
            "B3": [[1, 2, 3], [4, 5, 6], [7, 8, 9]],
            "B4": [[1, 2, 3], [4, 5, 6], [7, 8, 9]],
            "B5": [[1, 2, 3], [4, 5, 6], [7, 8, 9]],
            "B6": [[1, 2, 3], [4, 5, 6], [7, 8, 9]],
            "B7": [[1, 2, 3], [4, 5, 6], [7, 8, 9]]
        });
        assert!(serde_json::from_value::<BandWindows>(short_row).is_err());

        let missing_band = serde_json::json!({
            "B2": [[1, 2, 3], [4, 5, 6], [7, 8, 9]]
        });
        assert!(serde_json::from_value::<BandWindows>(missing_band).is_err());
    }
}
