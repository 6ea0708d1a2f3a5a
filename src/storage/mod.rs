mod kv_store;
pub mod media_cache;

pub use kv_store::{KvStore, StorageError, KEY_NAMESPACE};
pub use media_cache::{CachedClip, CachedImage, MediaCache, MediaCacheError};
