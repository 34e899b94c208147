use std::time::Duration;

use forge_core::{ChainFetch, ChainSnapshot, FetchError};

/// Fetches peer chains over HTTP. The per-request timeout bounds each
/// peer's contribution to a resolution round; a peer that exceeds it is
/// reported unreachable and skipped.
#[derive(Clone)]
pub struct HttpFetch {
    client: reqwest::Client,
}

impl HttpFetch {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client");
        Self { client }
    }
}

impl ChainFetch for HttpFetch {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot, FetchError> {
        let url = format!("http://{peer}/chain");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| FetchError::Unreachable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(FetchError::Unreachable(format!(
                "{url} returned {}",
                response.status()
            )));
        }
        response
            .json::<ChainSnapshot>()
            .await
            .map_err(|err| FetchError::Malformed(err.to_string()))
    }
}
