/// Error type for read-path database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    SeaOrm(#[from] sea_orm::DbErr),
    #[error("connection error: {0}")]
    Connection(String),
}
