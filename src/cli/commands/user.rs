use crate::config::Config;
use crate::db::Store;

pub async fn cmd_user_add(config: &Config, username: &str, email: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    if store.get_user_by_username(username).await?.is_some() {
        println!("User '{username}' already exists.");
        return Ok(());
    }

    let user = store.create_user(username, email).await?;
    println!("✓ Created user {} (ID: {})", user.username, user.id);
    println!("API key: {}", user.api_key);

    Ok(())
}

pub async fn cmd_user_api_key(
    config: &Config,
    username: &str,
    regenerate: bool,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    if regenerate {
        let key = store.regenerate_user_api_key(username).await?;
        println!("✓ New API key for {username}: {key}");
        return Ok(());
    }

    match store.get_user_api_key(username).await? {
        Some(key) => println!("{key}"),
        None => println!("User '{username}' not found."),
    }

    Ok(())
}
