//! Sandcastle
//!
//! Publishes single-page static sites behind a [Caddy] reverse proxy.
//!
//! A client `POST`s a customer ID, a domain and the page's HTML to the [HTTP API][crate::api].
//! Sandcastle writes the page below its content root, rewrites the domain's block in its
//! per-domain [Caddy configuration file][crate::caddy] so the domain serves that page under the
//! TLS certificate already declared for it, then reloads the proxy.
//!
//! [Caddy]: https://caddyserver.com
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod caddy;
pub mod config;
pub mod content;
pub mod error;
pub mod provision;

use crate::content::{file, memory};
pub use api::new as new_http;
pub use config::{Config, Shared};
pub use file::FileContentStore;
pub use memory::InMemoryContentStore;
pub use provision::Provisioner;
