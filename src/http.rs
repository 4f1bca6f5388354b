//! Shared HTTP plumbing.
//!
//! One [`reqwest::Client`] with a cookie store is built per run and cloned
//! into every component. No timeouts are configured.

use reqwest::{Client, Response};
use showtape_common::{Error, Result};

/// Build the client shared by every pipeline component.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .cookie_store(true)
        .build()
        .map_err(Error::transport)
}

/// Send a prepared request, mapping transport failures and non-2xx statuses.
pub async fn send(request: reqwest::RequestBuilder) -> Result<Response> {
    let response = request.send().await.map_err(Error::transport)?;
    ensure_success(response)
}

/// Turn a non-2xx response into [`Error::Network`] carrying the status line.
pub fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::network(status))
    }
}

/// Read the whole body as text.
pub async fn text(response: Response) -> Result<String> {
    response.text().await.map_err(Error::transport)
}
