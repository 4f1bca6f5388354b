//! Manifest base URL resolution.

use crate::{Error, Result};
use url::Url;

/// The parts of a manifest URL every relative reference inside it resolves against.
///
/// Segment and key URIs are resolved as `scheme://host + path_prefix + relative`,
/// followed by the manifest's own query string. The CDN rejects segment and key
/// requests that do not carry that query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestBase {
    pub scheme: String,
    /// Host, including a non-default port.
    pub host: String,
    /// Path up to and including the last `/`.
    pub path_prefix: String,
    /// Query string without the leading `?`. Empty when the URL has none.
    pub raw_query: String,
}

impl ManifestBase {
    /// Derive the base of a manifest URL.
    pub fn parse(manifest_url: &str) -> Result<Self> {
        let url = Url::parse(manifest_url)
            .map_err(|e| Error::parse(format!("invalid manifest URL {manifest_url}: {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::parse(format!("manifest URL has no host: {manifest_url}")))?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let path = url.path();
        let cut = path.rfind('/').map(|idx| idx + 1).unwrap_or(0);

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            path_prefix: path[..cut].to_string(),
            raw_query: url.query().unwrap_or_default().to_string(),
        })
    }

    /// `scheme://host/path/` without the query.
    pub fn prefix(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path_prefix)
    }

    /// `?` followed by the manifest's query string.
    pub fn query_suffix(&self) -> String {
        format!("?{}", self.raw_query)
    }

    /// Resolve a URI found inside the manifest into a fetchable URL.
    pub fn resolve(&self, relative: &str) -> String {
        format!("{}{}{}", self.prefix(), relative, self.query_suffix())
    }
}
