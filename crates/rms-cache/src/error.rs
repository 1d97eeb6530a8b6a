use thiserror::Error;

/// Errors from cache construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache capacity must be greater than zero")]
    ZeroCapacity,
}
