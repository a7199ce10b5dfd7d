use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to start the expiry sweeper thread: {0}")]
    SpawnSweeper(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
