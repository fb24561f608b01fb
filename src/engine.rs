// Async HTTP engine for authprobe
// Uses reqwest; one client (and its connection pool) is shared by every probe of a run

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::Result;
use crate::models::Method;
use crate::probe::{ProbeOutcome, Prober};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpEngine {
    pub client: Client,
}

impl HttpEngine {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Prober for HttpEngine {
    async fn probe(&self, method: Method, url: &str, headers: &[(&str, &str)]) -> ProbeOutcome {
        let mut req = self.client.request(method.to_reqwest(), url);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        // The response (and its unread body) is dropped before returning, which
        // hands the connection back or closes it.
        match req.send().await {
            Ok(resp) => ProbeOutcome::status(resp.status().as_u16()),
            Err(e) => {
                debug!("{} {} failed: {}", method, url, e);
                ProbeOutcome::TransportError
            }
        }
    }
}
