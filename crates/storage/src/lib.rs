pub mod backend;
pub mod error;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::path::Path as StorePath;
use object_store::ObjectStore;

pub use backend::{LocalBackend, S3Backend, StorageBackend};
pub use error::StorageError;

/// List all object keys under a prefix, sorted.
pub async fn list_keys(store: &dyn ObjectStore, prefix: &str) -> Result<Vec<String>, StorageError> {
    let prefix_path = StorePath::from(prefix);
    let mut stream = store.list(Some(&prefix_path));
    let mut keys = Vec::new();

    while let Some(meta) = stream.try_next().await? {
        keys.push(meta.location.to_string());
    }

    keys.sort();
    Ok(keys)
}

/// Fetch a whole object into memory.
pub async fn get_bytes(store: &dyn ObjectStore, key: &str) -> Result<Bytes, StorageError> {
    let path = StorePath::from(key);
    Ok(store.get(&path).await?.bytes().await?)
}

/// Write a whole object.
pub async fn put_bytes(
    store: &dyn ObjectStore,
    key: &str,
    data: Vec<u8>,
) -> Result<(), StorageError> {
    let path = StorePath::from(key);
    store.put(&path, Bytes::from(data).into()).await?;
    Ok(())
}
