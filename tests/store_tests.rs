//! Integration tests for the persistence layer.

use landsat_explorer::db::{NewSearch, Store};
use landsat_explorer::domain::{SearchId, UserId};
use landsat_explorer::models::{BandWindows, PixelRecord, extract_grid};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};

async fn test_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("landsat-store-test-{}.db", uuid::Uuid::new_v4()));
    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("Failed to open test store")
}

async fn default_user(store: &Store) -> UserId {
    store
        .get_user_by_username("explorer")
        .await
        .unwrap()
        .expect("default user is seeded")
        .id
}

fn record(seed: f64) -> PixelRecord {
    PixelRecord::from_fn(|band| seed + f64::from(band as u8))
}

#[tokio::test]
async fn test_saved_search_accepts_nine_pixels() {
    let store = test_store().await;
    let user_id = default_user(&store).await;

    let search = store
        .save_search(user_id, 45.0, -93.0, "LC09_L2SP_TEST", Some(12.0))
        .await
        .unwrap();
    assert!(search.id.value() > 0);
    assert_eq!(search.user_id, user_id);

    for position in 0..9 {
        store
            .save_pixel_data(search.id, &record(f64::from(position)), position == 4, position)
            .await
            .unwrap();
    }

    let mut pixels = store.get_pixel_data(search.id).await.unwrap();
    pixels.sort_by_key(|p| p.grid_position);

    let positions: Vec<i32> = pixels.iter().map(|p| p.grid_position).collect();
    assert_eq!(positions, (0..9).collect::<Vec<i32>>());

    let centers: Vec<i32> = pixels
        .iter()
        .filter(|p| p.is_center)
        .map(|p| p.grid_position)
        .collect();
    assert_eq!(centers, vec![4]);
    assert_eq!(pixels[4].values, record(4.0));
}

#[tokio::test]
async fn test_pixel_for_unknown_search_fails() {
    let store = test_store().await;

    let result = store
        .save_pixel_data(SearchId::new(4242), &record(0.0), true, 4)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_duplicate_grid_position_fails() {
    let store = test_store().await;
    let user_id = default_user(&store).await;

    let search = store
        .save_search(user_id, 1.0, 2.0, "SCENE", None)
        .await
        .unwrap();
    store
        .save_pixel_data(search.id, &record(0.0), false, 0)
        .await
        .unwrap();
    assert!(
        store
            .save_pixel_data(search.id, &record(1.0), false, 0)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_user_searches_are_limited_and_newest_first() {
    let store = test_store().await;
    let user_id = default_user(&store).await;
    let other = store.create_user("other", "other@example.com").await.unwrap();

    for scene in ["A", "B", "C", "D"] {
        store
            .save_search(user_id, 10.0, 20.0, scene, None)
            .await
            .unwrap();
    }
    store
        .save_search(other.id, 10.0, 20.0, "OTHER", None)
        .await
        .unwrap();

    let searches = store.get_user_searches(user_id, 3).await.unwrap();
    let scenes: Vec<&str> = searches.iter().map(|s| s.scene_id.as_str()).collect();
    assert_eq!(scenes, vec!["D", "C", "B"]);

    let all = store.get_user_searches(user_id, 100).await.unwrap();
    assert_eq!(all.len(), 4);
    assert!(all.iter().all(|s| s.user_id == user_id));
}

#[tokio::test]
async fn test_record_search_writes_everything() {
    let store = test_store().await;
    let user_id = default_user(&store).await;

    let grid = extract_grid(&BandWindows::from_fn(|_, row, col| (row * 3 + col) as f64));
    let (search, pixels) = store
        .record_search(
            NewSearch {
                user_id,
                latitude: 45.0,
                longitude: -93.0,
                scene_id: "LC09_L2SP_TEST".to_string(),
                cloud_cover: None,
            },
            &grid,
        )
        .await
        .unwrap();

    assert_eq!(pixels.len(), 9);
    assert!(pixels.iter().all(|p| p.search_id == search.id));
    assert_eq!(store.get_pixel_data(search.id).await.unwrap().len(), 9);
    assert_eq!(store.get_search(search.id).await.unwrap(), Some(search));
}

#[tokio::test]
async fn test_record_search_rolls_back_on_pixel_failure() {
    use landsat_explorer::entities::searches;

    let store = test_store().await;
    let user_id = default_user(&store).await;

    store
        .conn
        .execute_unprepared("DROP TABLE pixel_data")
        .await
        .unwrap();

    let grid = extract_grid(&BandWindows::from_fn(|_, _, _| 1.0));
    let result = store
        .record_search(
            NewSearch {
                user_id,
                latitude: 45.0,
                longitude: -93.0,
                scene_id: "LC09_L2SP_TEST".to_string(),
                cloud_cover: Some(5.0),
            },
            &grid,
        )
        .await;
    assert!(result.is_err());

    let remaining = searches::Entity::find().count(&store.conn).await.unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_api_keys() {
    let store = test_store().await;

    let seeded = store
        .verify_api_key("landsat_default_api_key_please_regenerate")
        .await
        .unwrap()
        .expect("default key is seeded");
    assert_eq!(seeded.username, "explorer");

    assert!(store.verify_api_key("").await.unwrap().is_none());
    assert!(store.verify_api_key("nope").await.unwrap().is_none());

    let user = store
        .create_user("scientist", "scientist@example.com")
        .await
        .unwrap();
    assert_eq!(user.api_key.len(), 64);
    assert_eq!(
        store.verify_api_key(&user.api_key).await.unwrap().map(|u| u.id),
        Some(user.id)
    );

    let new_key = store.regenerate_user_api_key("scientist").await.unwrap();
    assert_ne!(new_key, user.api_key);
    assert!(store.verify_api_key(&user.api_key).await.unwrap().is_none());
    assert_eq!(
        store.get_user_api_key("scientist").await.unwrap(),
        Some(new_key)
    );

    assert!(store.regenerate_user_api_key("missing").await.is_err());
}
