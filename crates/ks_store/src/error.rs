use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Stored row is malformed: {0}")]
    InvalidRow(String),

    #[error("Migration error: {0}")]
    Migration(String),
}
