//! Cache domain - result cache abstraction and key derivation

mod key;
mod repository;

pub use key::{CacheKeyGenerator, CacheKeyParams, FingerprintKeyGenerator};
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
