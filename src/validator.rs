// src/validator.rs
//! Profile URL validation

use serde::{Deserialize, Serialize};
use url::Url;

const LINKEDIN_HOST: &str = "linkedin.com";

/// Which host rule a session applies to submitted URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostMatching {
    /// Host contains `linkedin.com` anywhere (observed production behavior)
    #[default]
    Substring,
    /// Host is `linkedin.com` or a subdomain of it
    Strict,
}

impl HostMatching {
    pub fn accepts(&self, input: &str) -> bool {
        match self {
            Self::Substring => is_valid_profile_url(input),
            Self::Strict => is_strict_profile_url(input),
        }
    }
}

fn parse_host(input: &str) -> Option<(Url, String)> {
    let parsed = Url::parse(input.trim()).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some((parsed, host))
}

/// Absolute URL whose host contains `linkedin.com`.
///
/// Loose on purpose: `notlinkedin.com.evil.example` passes. Use
/// [`is_strict_profile_url`] for exact/suffix matching.
pub fn is_valid_profile_url(input: &str) -> bool {
    match parse_host(input) {
        Some((_, host)) => host.contains(LINKEDIN_HOST),
        None => false,
    }
}

pub fn is_strict_profile_url(input: &str) -> bool {
    match parse_host(input) {
        Some((parsed, host)) => {
            matches!(parsed.scheme(), "http" | "https")
                && (host == LINKEDIN_HOST || host.ends_with(".linkedin.com"))
        }
        None => false,
    }
}
