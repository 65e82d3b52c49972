use sea_orm::{Database, DatabaseConnection};
use anyhow::Result;
use tracing::info;

pub async fn get_db_connection(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to database via Sea-ORM at: {}", database_url);
    if let Some(dir) = database_url
        .strip_prefix("sqlite://")
        .and_then(|p| p.split('?').next())
        .and_then(|p| std::path::Path::new(p).parent())
    {
        std::fs::create_dir_all(dir)?;
    }
    let db = Database::connect(database_url).await?;
    Ok(db)
}
