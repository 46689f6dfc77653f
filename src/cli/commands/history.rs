use super::resolve_user;
use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_history(config: &Config, username: &str, limit: u64) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;

    let Some(user) = resolve_user(&state.store, username).await? else {
        return Ok(());
    };

    let searches = match state
        .landsat_service
        .recent_searches(user.id, Some(limit))
        .await
    {
        Ok(searches) => searches,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    if searches.is_empty() {
        println!("No search history.");
        return Ok(());
    }

    println!("Recent Searches (last {}):", searches.len());
    println!("{:-<70}", "");

    for search in searches {
        let cloud = search
            .cloud_cover
            .map_or_else(|| "?".to_string(), |c| format!("{c:.1}%"));
        println!(
            "[{}] {} at ({:.5}, {:.5})",
            search.id, search.scene_id, search.latitude, search.longitude
        );
        println!("  Cloud cover: {} | {}", cloud, search.created_at);
    }

    Ok(())
}
