use reqwest::blocking::Client;

use super::*;

/// Batch lookup against the upstream thing service.
pub(super) trait ThingSource {
    /// Fetches the raw XML document describing `ids`.
    fn fetch_batch(&self, ids: &[u64]) -> Result<String>;
}

pub(super) struct HttpThingSource {
    client: Client,
    endpoint: String,
}

impl HttpThingSource {
    pub(super) fn new(endpoint: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('?').to_string(),
        })
    }

    pub(super) fn batch_url(&self, ids: &[u64]) -> String {
        format!("{}?id={}&stats=1", self.endpoint, join_ids(ids))
    }
}

impl ThingSource for HttpThingSource {
    fn fetch_batch(&self, ids: &[u64]) -> Result<String> {
        let url = self.batch_url(ids);
        debug!(url = %url, "requesting batch");

        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("request failed: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("upstream returned status {status} for {url}");
        }

        response
            .text()
            .with_context(|| format!("failed to read response body: {url}"))
    }
}

pub(super) fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<String>>()
        .join(",")
}
