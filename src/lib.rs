pub mod cache;
pub mod cli;
pub mod errors;
pub mod utils;

pub use cache::{Artifact, Cache, CacheBuilder, CacheConfig, Category, RetentionPolicy};
pub use errors::CacheError;

/// Configures logging from the `MEDIACACHE_LOG_*` environment variables.
///
/// Call once at start-up, before constructing a [`Cache`].
///
/// # Errors
/// Returns `CacheError::Logger` or `CacheError::Io` if logging cannot be set up.
pub fn init() -> Result<(), CacheError> {
    utils::logger::configure_from_env()
}
