use anyhow::{Context, Result};
use chrono::SecondsFormat;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use super::pixel::{PixelData, new_pixel_row};
use crate::domain::{SearchId, UserId};
use crate::entities::{prelude::Searches, searches};
use crate::models::grid::{GRID_CELLS, PixelGrid};

#[derive(Debug, Clone, PartialEq)]
pub struct Search {
    pub id: SearchId,
    pub user_id: UserId,
    pub latitude: f64,
    pub longitude: f64,
    pub scene_id: String,
    pub cloud_cover: Option<f64>,
    pub created_at: String,
}

impl From<searches::Model> for Search {
    fn from(model: searches::Model) -> Self {
        Self {
            id: SearchId::new(model.id),
            user_id: UserId::new(model.user_id),
            latitude: model.latitude,
            longitude: model.longitude,
            scene_id: model.scene_id,
            cloud_cover: model.cloud_cover,
            created_at: model.created_at,
        }
    }
}

/// Values for a search row that has not been inserted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSearch {
    pub user_id: UserId,
    pub latitude: f64,
    pub longitude: f64,
    pub scene_id: String,
    pub cloud_cover: Option<f64>,
}

impl NewSearch {
    fn into_active_model(self) -> searches::ActiveModel {
        searches::ActiveModel {
            user_id: Set(self.user_id.value()),
            latitude: Set(self.latitude),
            longitude: Set(self.longitude),
            scene_id: Set(self.scene_id),
            cloud_cover: Set(self.cloud_cover),
            created_at: Set(timestamp_now()),
            ..Default::default()
        }
    }
}

/// Fixed precision keeps lexical order equal to chronological order.
fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub struct SearchRepository {
    conn: DatabaseConnection,
}

impl SearchRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts a single search row and commits it immediately.
    pub async fn save(&self, search: NewSearch) -> Result<Search> {
        let model = search
            .into_active_model()
            .insert(&self.conn)
            .await
            .context("Failed to insert search")?;

        Ok(model.into())
    }

    /// Inserts the search and all of its grid cells in one transaction.
    ///
    /// Nothing is written unless every row succeeds.
    pub async fn record_with_pixels(
        &self,
        search: NewSearch,
        grid: &PixelGrid,
    ) -> Result<(Search, Vec<PixelData>)> {
        let txn = self.conn.begin().await?;

        let search = search
            .into_active_model()
            .insert(&txn)
            .await
            .context("Failed to insert search")?;

        let mut pixels = Vec::with_capacity(GRID_CELLS);
        for cell in grid.positions() {
            let position = i32::try_from(cell.position)?;
            let row = new_pixel_row(search.id, cell.record, cell.is_center, position)
                .insert(&txn)
                .await
                .with_context(|| format!("Failed to insert pixel at position {position}"))?;
            pixels.push(PixelData::from(row));
        }

        txn.commit().await.context("Failed to commit search")?;

        Ok((search.into(), pixels))
    }

    pub async fn get(&self, id: SearchId) -> Result<Option<Search>> {
        let search = Searches::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query search by ID")?;

        Ok(search.map(Search::from))
    }

    /// Most recent searches of a user, newest first.
    pub async fn list_for_user(&self, user_id: UserId, limit: u64) -> Result<Vec<Search>> {
        let rows = Searches::find()
            .filter(searches::Column::UserId.eq(user_id.value()))
            .order_by_desc(searches::Column::CreatedAt)
            .order_by_desc(searches::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query user searches")?;

        Ok(rows.into_iter().map(Search::from).collect())
    }
}
