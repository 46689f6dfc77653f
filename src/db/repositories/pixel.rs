use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::SearchId;
use crate::entities::pixel_data;
use crate::models::grid::PixelRecord;

/// A stored grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelData {
    pub id: i32,
    pub search_id: SearchId,
    pub values: PixelRecord,
    pub is_center: bool,
    pub grid_position: i32,
}

impl From<pixel_data::Model> for PixelData {
    fn from(model: pixel_data::Model) -> Self {
        Self {
            id: model.id,
            search_id: SearchId::new(model.search_id),
            values: PixelRecord {
                blue: model.band_2,
                green: model.band_3,
                red: model.band_4,
                nir: model.band_5,
                swir1: model.band_6,
                swir2: model.band_7,
            },
            is_center: model.is_center,
            grid_position: model.grid_position,
        }
    }
}

pub(super) fn new_pixel_row(
    search_id: i32,
    record: &PixelRecord,
    is_center: bool,
    position: i32,
) -> pixel_data::ActiveModel {
    pixel_data::ActiveModel {
        search_id: Set(search_id),
        band_2: Set(record.blue),
        band_3: Set(record.green),
        band_4: Set(record.red),
        band_5: Set(record.nir),
        band_6: Set(record.swir1),
        band_7: Set(record.swir2),
        is_center: Set(is_center),
        grid_position: Set(position),
        ..Default::default()
    }
}

pub struct PixelRepository {
    conn: DatabaseConnection,
}

impl PixelRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts one grid cell. Fails when `search_id` does not exist.
    pub async fn save(
        &self,
        search_id: SearchId,
        record: &PixelRecord,
        is_center: bool,
        position: i32,
    ) -> Result<PixelData> {
        let model = new_pixel_row(search_id.value(), record, is_center, position)
            .insert(&self.conn)
            .await
            .with_context(|| format!("Failed to insert pixel data for search {search_id}"))?;

        Ok(model.into())
    }

    /// All cells of a search. Order is unspecified.
    pub async fn list_for_search(&self, search_id: SearchId) -> Result<Vec<PixelData>> {
        let rows = pixel_data::Entity::find()
            .filter(pixel_data::Column::SearchId.eq(search_id.value()))
            .all(&self.conn)
            .await
            .context("Failed to query pixel data")?;

        Ok(rows.into_iter().map(PixelData::from).collect())
    }
}
