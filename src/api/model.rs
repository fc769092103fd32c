use crate::provision::{Provisioned, ReloadOutcome, SiteRequest};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Host;

/// Body of `POST /api`. Missing fields deserialize as empty and are rejected by
/// [`ProvisionRequest::validate`].
#[derive(Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub(super) struct ProvisionRequest {
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub domain: String,
}

#[derive(thiserror::Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum RequestError {
    #[error("missing data")]
    MissingData,
    #[error("invalid customer ID")]
    InvalidCustomer,
    #[error("invalid domain")]
    InvalidDomain,
}

lazy_static! {
    static ref CUSTOMER_RE: Regex = Regex::new(
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$"
    )
    .unwrap();
    static ref DOMAIN_RE: Regex = Regex::new(
        r"^[a-zA-Z0-9][a-zA-Z0-9-]{0,61}[a-zA-Z0-9](?:\.[a-zA-Z0-9][a-zA-Z0-9-]{0,61}[a-zA-Z0-9])*$"
    )
    .unwrap();
}

impl ProvisionRequest {
    /// Check the request and normalise its domain to ASCII.
    pub fn validate(self) -> Result<SiteRequest, RequestError> {
        if self.customer.is_empty() || self.data.is_empty() || self.domain.trim().is_empty() {
            return Err(RequestError::MissingData);
        }
        if !CUSTOMER_RE.is_match(&self.customer) {
            return Err(RequestError::InvalidCustomer);
        }
        let domain = ascii_domain(&self.domain).ok_or(RequestError::InvalidDomain)?;

        Ok(SiteRequest {
            customer: self.customer,
            domain,
            html: self.data,
        })
    }
}

// IDNA (UTS #46) to-ASCII, then the DNS label syntax check. IP literals are rejected.
fn ascii_domain(domain: &str) -> Option<String> {
    match Host::parse(domain.trim()) {
        Ok(Host::Domain(ascii)) if DOMAIN_RE.is_match(&ascii) => Some(ascii),
        _ => None,
    }
}

#[derive(Serialize, Debug, Clone, Eq, PartialEq)]
pub(super) struct ProvisionResult {
    pub message: String,
    pub success: bool,
    pub created: bool,
    /// `null` when no reload command is configured.
    pub reloaded: Option<bool>,
}

impl ProvisionResult {
    pub fn new(domain: &str, done: &Provisioned) -> Self {
        ProvisionResult {
            message: format!("Updated site for {domain}!"),
            success: true,
            created: done.created,
            reloaded: match done.reload {
                ReloadOutcome::Skipped => None,
                ReloadOutcome::Reloaded => Some(true),
                ReloadOutcome::Failed(_) => Some(false),
            },
        }
    }
}
