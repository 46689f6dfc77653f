mod fetch;
mod history;
mod pixels;
mod scenes;
mod user;

pub use fetch::cmd_fetch;
pub use history::cmd_history;
pub use pixels::cmd_pixels;
pub use scenes::cmd_scenes;
pub use user::{cmd_user_add, cmd_user_api_key};

use crate::db::{Store, User};

async fn resolve_user(store: &Store, username: &str) -> anyhow::Result<Option<User>> {
    let user = store.get_user_by_username(username).await?;
    if user.is_none() {
        println!("User '{username}' not found.");
        println!("Create it with: landsat-explorer user add {username} <email>");
    }
    Ok(user)
}
