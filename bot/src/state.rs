use sea_orm::DatabaseConnection;
use shared::{get_db_connection, Config};

pub struct AppState {
    pub config: Config,
    pub db: DatabaseConnection,
}

impl AppState {
    pub async fn new() -> Result<Self, anyhow::Error> {
        let config = Config::from_env()?;
        let db = get_db_connection(&config.database_url).await?;
        tracing::info!("Connected to database successfully");
        Ok(AppState { config, db })
    }
}
