//! Per-domain Caddy configuration files.
//!
//! Each domain group has its own small configuration file in Caddy's brace-delimited format. The
//! certificate and key for a domain are declared out of band (e.g. by the process that issued
//! them) before any content is published:
//!
//! ```text
//! example.com {
//!   tls /etc/ssl/example.com.pem /etc/ssl/example.com.key
//! }
//! ```
//!
//! Publishing a site rewrites that block to serve the site's document root while keeping the
//! declared TLS material:
//!
//! ```text
//! example.com {
//!   import common
//!   root * /var/www/sandcastles/<customer>/example.com
//!   tls /etc/ssl/example.com.pem /etc/ssl/example.com.key
//! }
//! ```
//!
//! Every other root-level block in the file is written back byte-for-byte.
//!
//! [`update_site`] runs the whole read, [`parse`], [`synthesize`], rewrite and atomic write cycle.

pub mod block;
pub mod parser;
pub mod synth;
pub mod writer;

pub use block::{BlockNode, ConfigDocument, Entry, Rewrite, TlsMaterial};
pub use parser::parse;
pub use synth::synthesize;
pub use writer::{update_site, SiteUpdate};
