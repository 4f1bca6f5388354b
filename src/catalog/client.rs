use super::types::{ContainerEnvelope, Release, StreamMeta};
use crate::config::ApiConfig;
use crate::http;
use reqwest::Client;
use showtape_common::{Error, Result, StreamParams};

/// What a stream-metadata request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRequest {
    /// One track, on one delivery platform.
    Track { track_id: u64, platform: u8 },
    /// The video of a container, by product sku.
    Video { container_id: u64, sku_id: u64 },
}

impl StreamRequest {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match *self {
            Self::Track { track_id, platform } => vec![
                ("platformID", platform.to_string()),
                ("trackID", track_id.to_string()),
            ],
            Self::Video {
                container_id,
                sku_id,
            } => vec![
                ("skuId", sku_id.to_string()),
                ("containerID", container_id.to_string()),
                ("chap", "1".to_string()),
            ],
        }
    }
}

/// Client for the catalog's stream and container endpoints.
#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    user_agent: String,
    stream_user_agent: String,
}

impl CatalogClient {
    pub fn new(client: Client, api: &ApiConfig) -> Self {
        Self {
            client,
            base_url: api.base_url.clone(),
            user_agent: api.user_agent.clone(),
            stream_user_agent: api.stream_user_agent.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ask the stream-metadata endpoint for a stream URL.
    ///
    /// An absent or empty `streamLink` is [`Error::NoStreamUrl`].
    pub async fn stream_link(&self, request: StreamRequest, params: &StreamParams) -> Result<String> {
        let mut query = request.query_pairs();
        query.push(("app", "1".to_string()));
        query.extend(params.query_pairs());

        let response = http::send(
            self.client
                .get(self.url("bigriver/subPlayer.aspx"))
                .query(&query)
                .header(reqwest::header::USER_AGENT, &self.stream_user_agent),
        )
        .await?;

        let meta: StreamMeta = serde_json::from_str(&http::text(response).await?)?;
        match meta.stream_link {
            Some(link) if !link.is_empty() => Ok(link),
            _ => Err(Error::NoStreamUrl),
        }
    }

    /// Fetch a release container's metadata.
    pub async fn release(&self, container_id: &str) -> Result<Release> {
        let response = http::send(
            self.client
                .get(self.url("api.aspx"))
                .query(&[
                    ("method", "catalog.container"),
                    ("containerID", container_id),
                    ("vdisp", "1"),
                ])
                .header(reqwest::header::USER_AGENT, &self.user_agent),
        )
        .await?;

        let envelope: ContainerEnvelope = serde_json::from_str(&http::text(response).await?)?;
        envelope
            .response
            .ok_or_else(|| Error::parse(format!("container {container_id} has no metadata")))
    }
}
