use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{SearchId, UserId};
use crate::models::grid::{PixelGrid, PixelRecord};

pub mod migrator;
pub mod repositories;

pub use repositories::pixel::PixelData;
pub use repositories::search::{NewSearch, Search};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn search_repo(&self) -> repositories::search::SearchRepository {
        repositories::search::SearchRepository::new(self.conn.clone())
    }

    fn pixel_repo(&self) -> repositories::pixel::PixelRepository {
        repositories::pixel::PixelRepository::new(self.conn.clone())
    }

    // ========== Search Repository Methods ==========

    /// Stores a single search row, committed on its own.
    pub async fn save_search(
        &self,
        user_id: UserId,
        latitude: f64,
        longitude: f64,
        scene_id: &str,
        cloud_cover: Option<f64>,
    ) -> Result<Search> {
        self.search_repo()
            .save(NewSearch {
                user_id,
                latitude,
                longitude,
                scene_id: scene_id.to_string(),
                cloud_cover,
            })
            .await
    }

    /// Stores a search together with its nine grid cells atomically.
    pub async fn record_search(
        &self,
        search: NewSearch,
        grid: &PixelGrid,
    ) -> Result<(Search, Vec<PixelData>)> {
        self.search_repo().record_with_pixels(search, grid).await
    }

    pub async fn get_search(&self, id: SearchId) -> Result<Option<Search>> {
        self.search_repo().get(id).await
    }

    pub async fn get_user_searches(&self, user_id: UserId, limit: u64) -> Result<Vec<Search>> {
        self.search_repo().list_for_user(user_id, limit).await
    }

    // ========== Pixel Repository Methods ==========

    pub async fn save_pixel_data(
        &self,
        search_id: SearchId,
        pixel: &PixelRecord,
        is_center: bool,
        position: i32,
    ) -> Result<PixelData> {
        self.pixel_repo()
            .save(search_id, pixel, is_center, position)
            .await
    }

    pub async fn get_pixel_data(&self, search_id: SearchId) -> Result<Vec<PixelData>> {
        self.pixel_repo().list_for_search(search_id).await
    }

    // ========== User Repository Methods ==========

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    pub async fn create_user(&self, username: &str, email: &str) -> Result<User> {
        self.user_repo().create(username, email).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn get_user_api_key(&self, username: &str) -> Result<Option<String>> {
        self.user_repo().get_api_key(username).await
    }

    pub async fn regenerate_user_api_key(&self, username: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(username).await
    }
}
