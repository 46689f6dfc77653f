use crate::config::Config;
use crate::services::SceneSearchRequest;
use crate::state::SharedState;

pub async fn cmd_scenes(
    config: &Config,
    latitude: f64,
    longitude: f64,
    days: Option<u32>,
    max_cloud: Option<f64>,
) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(days) = days {
        config.imagery.search_window_days = days;
    }
    let state = SharedState::new(config).await?;

    println!("Searching scenes at ({latitude}, {longitude})...");

    let scenes = state
        .landsat_service
        .search_scenes(SceneSearchRequest {
            latitude,
            longitude,
            max_cloud_cover: max_cloud,
            ..Default::default()
        })
        .await?;

    if scenes.is_empty() {
        println!("No scenes found.");
        return Ok(());
    }

    println!("Scenes ({} found):", scenes.len());
    println!("{:-<70}", "");

    for scene in scenes {
        let cloud = scene
            .cloud_cover
            .map_or_else(|| "?".to_string(), |c| format!("{c:.1}%"));
        println!("• {}", scene.scene_id);
        if let Some(display_id) = &scene.display_id {
            println!("  {display_id}");
        }
        println!(
            "  Date: {} | Cloud cover: {}",
            scene.date.as_deref().unwrap_or("unknown"),
            cloud
        );
    }

    Ok(())
}
