use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::ApiConfig;
use crate::db::error::DbError;
use crate::db::repositories::Repositories;

/// Manages the database connection pool.
pub struct DbPool {
    connection: DatabaseConnection,
}

impl DbPool {
    pub async fn new(config: &ApiConfig) -> Result<Self, DbError> {
        let mut options = ConnectOptions::new(config.db.url.clone());
        options
            .max_connections(config.db.max_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let connection = Database::connect(options)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;
        Ok(DbPool { connection })
    }

    pub fn repositories(&self) -> Repositories {
        Repositories::new(self.connection.clone())
    }
}
