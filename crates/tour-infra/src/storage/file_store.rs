//! File-based key/value store
//!
//! Each key is stored as its own JSON file under a base directory. Writes go
//! to a temporary sibling file first and are renamed into place, so a reader
//! sees either the previous or the new content.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs;
use tour_core::ports::KeyValueStorePort;

const FILE_EXTENSION: &str = "json";

pub struct FileKeyValueStore {
    base_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Maps a key to its file, replacing characters that are unsafe in file names.
    fn path_for(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_dir
            .join(format!("{file_stem}.{FILE_EXTENSION}"))
    }

    async fn ensure_base_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.base_dir)
            .await
            .with_context(|| format!("create store dir failed: {}", self.base_dir.display()))
    }
}

#[async_trait]
impl KeyValueStorePort for FileKeyValueStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("read store file failed: {}", path.display()))?;
        Ok(Some(content))
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.ensure_base_dir().await?;

        let path = self.path_for(key);
        let tmp_path = path.with_extension(format!("{FILE_EXTENSION}.tmp"));
        fs::write(&tmp_path, value)
            .await
            .with_context(|| format!("write temp store file failed: {}", tmp_path.display()))?;

        fs::rename(&tmp_path, &path).await.with_context(|| {
            format!(
                "rename temp store file failed: {} -> {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        if fs::try_exists(&path).await.unwrap_or(false) {
            fs::remove_file(&path)
                .await
                .with_context(|| format!("remove store file failed: {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn get_returns_none_when_file_not_exists() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("nested"));

        assert_eq!(store.get("tour-progress").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("nested"));

        store.set("tour-progress", r#"{"a":1}"#).await.unwrap();

        assert_eq!(
            store.get("tour-progress").await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
        assert!(temp_dir.path().join("nested/tour-progress.json").exists());
        assert!(!temp_dir.path().join("nested/tour-progress.json.tmp").exists());
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.set("k", "first").await.unwrap();
        store.set("k", "second").await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn remove_deletes_file_and_tolerates_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.remove("k").await.unwrap();
        store.set("k", "value").await.unwrap();
        store.remove("k").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[test]
    fn unsafe_key_characters_are_replaced() {
        let store = FileKeyValueStore::new("/base");
        assert_eq!(
            store.path_for("../tour progress"),
            PathBuf::from("/base/.._tour_progress.json")
        );
    }
}
