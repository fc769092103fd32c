//! Publishing a site end to end.
//!
//! A [`Provisioner`] writes the page through the [content store][crate::content], rewrites the
//! domain's proxy configuration with [`update_site`], then runs the configured reload command.
//!
//! Config updates for the same file are serialised through a per-path lock. Updates for
//! different files run in parallel. The lock is held for the whole write, including when the
//! caller gives up waiting for it.
use crate::caddy::update_site;
use crate::config::Shared;
use crate::content::{ContentStore, DynContentStore};
use crate::error::Error;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Mutex;

/// A validated request to publish a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRequest {
    pub customer: String,
    /// ASCII (IDNA-normalised) domain name.
    pub domain: String,
    pub html: String,
}

/// What happened to the proxy after a successful config write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// No reload command is configured.
    Skipped,
    Reloaded,
    /// The command failed to start or exited unsuccessfully. Carries its error output.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    pub index_path: PathBuf,
    pub config_path: PathBuf,
    /// `true` if the domain had no block in its config file before this update.
    pub created: bool,
    pub reload: ReloadOutcome,
}

pub struct Provisioner {
    config: Shared,
    content: DynContentStore,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl Provisioner {
    pub fn new(config: Shared, content: DynContentStore) -> Self {
        Provisioner {
            config,
            content,
            locks: Mutex::default(),
        }
    }

    /// Publish `request`: store the page, point the domain's proxy config at it, reload the
    /// proxy.
    ///
    /// A failed reload doesn't fail the call and doesn't undo the config write. It is reported
    /// in [`Provisioned::reload`].
    ///
    /// # Errors
    ///
    /// Returns any [content store][crate::content::ContentStore::put_index] or
    /// [`update_site`] error. Nothing is retried.
    pub async fn provision(&self, request: &SiteRequest) -> Result<Provisioned, Error> {
        let (index_path, document_root) = {
            let mut content = self.content.write().await;
            let index_path = content
                .put_index(&request.customer, &request.domain, &request.html)
                .await?;
            let document_root = content.site_dir(&request.customer, &request.domain);
            (index_path, document_root)
        };

        let config_path = self.config.site_config_file(&request.domain);
        let update = {
            // The guard moves into the blocking task, so the file stays locked until
            // `update_site` returns even if this future is dropped (e.g. on request timeout).
            let guard = self.lock_for(&config_path).await.lock_owned().await;
            let path = config_path.clone();
            let domain = request.domain.clone();
            let document_root = document_root.display().to_string();
            tokio::task::spawn_blocking(move || {
                let update = update_site(path, &domain, &document_root);
                drop(guard);
                update
            })
            .await??
        };

        let reload = self.reload().await;
        tracing::info!("done {}", request.domain);

        Ok(Provisioned {
            index_path,
            config_path,
            created: update.created,
            reload,
        })
    }

    // Entries nobody holds or waits on are pruned, so the map only tracks in-flight paths.
    async fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(path.to_path_buf()).or_default().clone()
    }

    async fn reload(&self) -> ReloadOutcome {
        let Some((program, args)) = self
            .config
            .reload_command
            .as_ref()
            .and_then(|argv| argv.split_first())
        else {
            return ReloadOutcome::Skipped;
        };

        match Command::new(program).args(args).output().await {
            Ok(output) if output.status.success() => {
                tracing::info!(
                    "reload succeeded: {}",
                    String::from_utf8_lossy(&output.stdout).trim()
                );
                ReloadOutcome::Reloaded
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                tracing::error!("reload failed ({}): {stderr}", output.status);
                ReloadOutcome::Failed(stderr)
            }
            Err(err) => {
                tracing::error!("reload failed: {err}");
                ReloadOutcome::Failed(err.to_string())
            }
        }
    }
}
