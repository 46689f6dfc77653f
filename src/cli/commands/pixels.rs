use super::resolve_user;
use crate::config::Config;
use crate::domain::SearchId;
use crate::models::Band;
use crate::state::SharedState;

pub async fn cmd_pixels(config: &Config, search_id: i32, username: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;

    let Some(user) = resolve_user(&state.store, username).await? else {
        return Ok(());
    };

    let detail = match state
        .landsat_service
        .search_pixels(user.id, SearchId::new(search_id))
        .await
    {
        Ok(detail) => detail,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    let search = &detail.search;
    println!(
        "Search {} | {} at ({:.5}, {:.5})",
        search.id, search.scene_id, search.latitude, search.longitude
    );
    println!("{:-<70}", "");

    let header: Vec<String> = Band::ALL.iter().map(|b| format!("{:>10}", b.id())).collect();
    println!("pos    {}", header.join(" "));

    for pixel in &detail.pixels {
        let marker = if pixel.is_center { "*" } else { " " };
        let values: Vec<String> = pixel
            .values
            .values()
            .iter()
            .map(|v| format!("{v:>10.4}"))
            .collect();
        println!("{}{:<5} {}", marker, pixel.grid_position, values.join(" "));
    }

    println!();
    println!("* = center pixel");

    Ok(())
}
