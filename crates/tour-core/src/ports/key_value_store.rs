//! Key/value storage port
//!
//! Raw durable storage addressed by string keys. Implementations are provided
//! by the infrastructure layer (file-based or in-memory).

use async_trait::async_trait;

#[async_trait]
pub trait KeyValueStorePort: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Store `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Remove the value stored under `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

