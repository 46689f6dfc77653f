use super::resolve_user;
use crate::config::Config;
use crate::models::Band;
use crate::models::grid::GRID_SIZE;
use crate::services::FetchRequest;
use crate::state::SharedState;

pub async fn cmd_fetch(
    config: &Config,
    latitude: f64,
    longitude: f64,
    scene_id: &str,
    username: &str,
) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;

    let Some(user) = resolve_user(&state.store, username).await? else {
        return Ok(());
    };

    let processed = state
        .landsat_service
        .fetch_pixels(
            user.id,
            FetchRequest {
                latitude,
                longitude,
                scene_id: scene_id.to_string(),
            },
        )
        .await?;

    println!("✓ Stored search {} for scene {scene_id}", processed.search_id);
    if let Some(cloud) = processed.metadata.cloud_cover {
        println!("Cloud cover: {cloud:.1}%");
    }
    println!();

    for band in Band::ALL {
        println!("{} ({}, {} µm)", band, band.display_name(), band.wavelength_um());
        for row in 0..GRID_SIZE {
            let cells: Vec<String> = (0..GRID_SIZE)
                .filter_map(|col| processed.grid.at(row, col))
                .map(|pixel| format!("{:>12.4}", pixel.value(band)))
                .collect();
            println!("  {}", cells.join(" "));
        }
    }

    Ok(())
}
