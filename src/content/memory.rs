use crate::content::{index_path, site_dir, ContentStore};
use crate::error::Error;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Default, Debug, Clone)]
pub struct InMemoryContentStore {
    root: PathBuf,
    pages: HashMap<(String, String), String>,
}

impl InMemoryContentStore {
    /// Create an empty store reporting paths below `root`. Nothing is written there.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        InMemoryContentStore {
            root: root.into(),
            pages: HashMap::default(),
        }
    }
}

#[async_trait::async_trait]
impl ContentStore for InMemoryContentStore {
    fn site_dir(&self, customer: &str, domain: &str) -> PathBuf {
        site_dir(&self.root, customer, domain)
    }

    async fn put_index(
        &mut self,
        customer: &str,
        domain: &str,
        html: &str,
    ) -> Result<PathBuf, Error> {
        self.pages
            .insert((customer.to_string(), domain.to_string()), html.to_string());
        Ok(index_path(&self.root, customer, domain))
    }

    async fn get_index(&self, customer: &str, domain: &str) -> Option<String> {
        self.pages
            .get(&(customer.to_string(), domain.to_string()))
            .cloned()
    }
}
