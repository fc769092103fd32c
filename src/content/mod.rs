//! Site content storage.
//!
//! Every site is a single `index.html` published under
//! `<root>/<customer>/<domain>/index.html`. The directory containing it is the document root
//! embedded in the domain's proxy configuration.
//!
//! Two implementations are provided, [`file::FileContentStore`] and
//! [`memory::InMemoryContentStore`]. The former writes pages to disk where the proxy can serve
//! them. The latter keeps pages in memory and is only useful for tests.

use crate::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod file;
pub mod memory;

#[allow(clippy::module_name_repetitions)]
pub use file::FileContentStore;
#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryContentStore;

const INDEX_FILE: &str = "index.html";

/// `DynContentStore` is a type alias for a [`ContentStore`] that can be used by multiple
/// read/write consumers that coordinate through an [`Arc`] and a [`RwLock`] wrapping the
/// [`ContentStore`].
#[allow(clippy::module_name_repetitions)]
pub type DynContentStore = Arc<RwLock<dyn ContentStore + Send + Sync>>;

/// An async trait describing storage of published site pages, keyed by customer and domain.
#[async_trait::async_trait]
pub trait ContentStore {
    /// The document root for a customer's domain.
    fn site_dir(&self, customer: &str, domain: &str) -> PathBuf;

    /// Replace the index page for a customer's domain, returning the path it was stored at.
    async fn put_index(&mut self, customer: &str, domain: &str, html: &str)
        -> Result<PathBuf, Error>;

    /// Get the index page for a customer's domain (if any).
    async fn get_index(&self, customer: &str, domain: &str) -> Option<String>;
}

pub(crate) fn site_dir(root: &Path, customer: &str, domain: &str) -> PathBuf {
    root.join(customer).join(domain)
}

pub(crate) fn index_path(root: &Path, customer: &str, domain: &str) -> PathBuf {
    site_dir(root, customer, domain).join(INDEX_FILE)
}
