use std::time::Duration;

use reqwest::{Client, header::CONTENT_TYPE};
use tracing::debug;
use url::Url;

use crate::{
    BridgeConfig,
    errors::BridgeError,
    types::{BridgeReply, DownloadSubmission},
};

/// Upper bound for a single bridge call, connect through body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Header carrying the bridge token.
pub const TOKEN_HEADER: &str = "X-Token";

/// Delivers one download submission to the bridge and hands back whatever it answered.
///
/// HTTP error statuses are not errors at this level, they come back as a
/// [`BridgeReply`] so the caller can shape them.
#[allow(async_fn_in_trait)]
pub trait Forwarder {
    async fn forward(
        &self,
        config: &BridgeConfig,
        submission: &DownloadSubmission,
    ) -> Result<BridgeReply, BridgeError>;
}

#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: Client,
}

impl HttpForwarder {
    pub fn new() -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }
}

impl Forwarder for HttpForwarder {
    async fn forward(
        &self,
        config: &BridgeConfig,
        submission: &DownloadSubmission,
    ) -> Result<BridgeReply, BridgeError> {
        let endpoint = Url::parse(config.endpoint())?;
        debug!("POST {} url={}", endpoint, submission.url);

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(TOKEN_HEADER, config.token())
            .json(submission)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("bridge answered {} ({} bytes)", status, body.len());

        Ok(BridgeReply { status, body })
    }
}
