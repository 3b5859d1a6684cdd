//! Connection settings for the DMPonline API.

use std::path::PathBuf;

/// Default base URL of the hosted DMPonline service.
pub const DEFAULT_URL: &str = "https://dmponline.dcc.ac.uk/api/";

/// How TLS certificates of the API host are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsVerification {
    /// Verify against the system trust store.
    Enabled,
    /// Accept any certificate.
    Disabled,
    /// Additionally trust the PEM certificate at this path.
    CaCertificate(PathBuf),
}

impl TlsVerification {
    /// Resolve the command-line flags into a verification mode.
    ///
    /// A certificate file that exists wins over `--do-not-verify`.
    pub fn resolve(do_not_verify: bool, cert_file: Option<PathBuf>) -> Self {
        match cert_file {
            Some(path) if path.exists() => Self::CaCertificate(path),
            _ if do_not_verify => Self::Disabled,
            _ => Self::Enabled,
        }
    }
}

/// Everything needed to connect to a DMPonline instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, always ending in `/`.
    pub base_url: String,
    /// API token. Sent as-is to v0 and exchanged for a bearer token on v1.
    pub token: String,
    /// Account the token belongs to. Without it v1 is unavailable.
    pub user_email: Option<String>,
    pub tls: TlsVerification,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            token: token.into(),
            user_email: None,
            tls: TlsVerification::Enabled,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn with_user_email(mut self, user_email: Option<String>) -> Self {
        self.user_email = user_email;
        self
    }

    pub fn with_tls(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }
}
