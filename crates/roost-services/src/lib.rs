//! Orchestration layer: cache gateway, read and upload orchestrators, and the
//! [`TwitterProxy`] facade the HTTP boundary talks to.

pub mod cache;
pub mod proxy;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cache::{build_cache, CacheError, CacheKey, CacheStore, FileCache, MemoryCache};
pub use proxy::TwitterProxy;
pub use services::publish::{UpdateOptions, UploadOrchestrator};
pub use services::read::{ReadKind, ReadOrchestrator};
