use thiserror::Error;

pub mod agreements;
pub mod quotes;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored row could not be decoded: {0}")]
    Decode(String),
    #[error("record not found")]
    NotFound,
}
