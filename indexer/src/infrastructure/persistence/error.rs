/// Error type for database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    SeaOrm(#[from] sea_orm::DbErr),
    #[error("query error: {0}")]
    Query(String),
}
