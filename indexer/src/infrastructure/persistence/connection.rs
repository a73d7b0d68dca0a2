use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::DbCfg;
use crate::infrastructure::persistence::error::DbError;

/// Manages the database connection pool.
pub struct DbPool {
    connection: DatabaseConnection,
}

impl DbPool {
    pub async fn new(config: &DbCfg) -> Result<Self, DbError> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let connection = Database::connect(options).await?;
        tracing::info!("database connection established");
        Ok(DbPool { connection })
    }

    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}
