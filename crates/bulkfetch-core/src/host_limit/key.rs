use std::fmt;

/// Identity of a remote origin for connection limiting.
///
/// URLs are normalised down to `(scheme, host, port)` so every path on the
/// same origin shares one limit, and `http://h` / `http://h:80` are the same host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostKey {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

/// The URL could not be reduced to a host key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostKeyError {
    #[error("invalid URL {url:?}: {reason}")]
    Invalid { url: String, reason: String },
    #[error("URL {0:?} has no host")]
    MissingHost(String),
    #[error("URL {0:?} has no port and no known default")]
    MissingPort(String),
}

impl HostKey {
    /// Construct a host key from a URL string.
    pub fn from_url(url: &str) -> Result<Self, HostKeyError> {
        let parsed = url::Url::parse(url).map_err(|e| HostKeyError::Invalid {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme().to_string();
        let host = parsed
            .host_str()
            .ok_or_else(|| HostKeyError::MissingHost(url.to_string()))?
            .to_ascii_lowercase();
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| HostKeyError::MissingPort(url.to_string()))?;

        Ok(Self { scheme, host, port })
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}
