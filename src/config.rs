use crate::error::Error;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;

pub type Shared = Arc<Config>;

/// Placeholder substituted with the domain name in [`Config::site_config_path`].
pub const DOMAIN_PLACEHOLDER: &str = "{domain}";

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
    pub token: String,
    pub sandcastles_dir: PathBuf,
    /// Path of the per-domain proxy config file, e.g. `/etc/caddy/sld/{domain}`.
    pub site_config_path: String,
    /// Command (program and arguments) that reloads the proxy after a config write.
    #[serde(default)]
    pub reload_command: Option<Vec<String>>,
}

impl Config {
    /// Load and validate a [`Config`] from the JSON file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the file can't be read, [`Error::InvalidJSON`] if it doesn't
    /// deserialize and [`Error::InvalidConfig`] if it fails [validation][Config::validate].
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.validate()?;
        Ok(conf)
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the token is empty, the site config path has no
    /// `{domain}` placeholder, or the reload command is an empty list.
    pub fn validate(&self) -> Result<(), Error> {
        if self.token.trim().is_empty() {
            return Err(Error::InvalidConfig("token must not be empty".into()));
        }
        if !self.site_config_path.contains(DOMAIN_PLACEHOLDER) {
            return Err(Error::InvalidConfig(format!(
                "site_config_path must contain {DOMAIN_PLACEHOLDER}"
            )));
        }
        if matches!(&self.reload_command, Some(argv) if argv.is_empty()) {
            return Err(Error::InvalidConfig(
                "reload_command must name a program".into(),
            ));
        }
        Ok(())
    }

    /// Compare a presented bearer token to the configured one in constant time.
    pub fn token_permitted(&self, token: &str) -> bool {
        self.token.as_bytes().ct_eq(token.as_bytes()).into()
    }

    pub fn site_config_file(&self, domain: &str) -> PathBuf {
        PathBuf::from(self.site_config_path.replace(DOMAIN_PLACEHOLDER, domain))
    }
}
