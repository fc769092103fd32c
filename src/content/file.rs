//! A file-backed implementation of the [`ContentStore`][super::ContentStore] trait.
use crate::content::{index_path, site_dir, ContentStore};
use crate::error::Error;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Writes each site's index page below a root directory served by the proxy.
#[derive(Default, Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct FileContentStore {
    root: PathBuf,
}

impl FileContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileContentStore { root: root.into() }
    }

    /// Create the root directory if it doesn't exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the directory can't be created.
    pub async fn ensure_root(&self) -> Result<(), Error> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ContentStore for FileContentStore {
    fn site_dir(&self, customer: &str, domain: &str) -> PathBuf {
        site_dir(&self.root, customer, domain)
    }

    async fn put_index(
        &mut self,
        customer: &str,
        domain: &str,
        html: &str,
    ) -> Result<PathBuf, Error> {
        fs::create_dir_all(site_dir(&self.root, customer, domain)).await?;
        let path = index_path(&self.root, customer, domain);
        fs::write(&path, html).await?;
        tracing::info!("wrote {}", path.display());
        Ok(path)
    }

    async fn get_index(&self, customer: &str, domain: &str) -> Option<String> {
        match fs::read_to_string(index_path(&self.root, customer, domain)).await {
            Ok(html) => Some(html),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!("reading index for {customer}/{domain}: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_below_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileContentStore::new(dir.path().join("sandcastles"));
        store.ensure_root().await.unwrap();

        let path = store
            .put_index("c1", "a.example", "<h1>hi</h1>")
            .await
            .unwrap();
        assert_eq!(
            path,
            dir.path().join("sandcastles/c1/a.example/index.html")
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<h1>hi</h1>");

        store.put_index("c1", "a.example", "<h1>bye</h1>").await.unwrap();
        assert_eq!(
            store.get_index("c1", "a.example").await.as_deref(),
            Some("<h1>bye</h1>")
        );
        assert!(store.get_index("c1", "b.example").await.is_none());
    }
}
