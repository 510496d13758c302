use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::ReaderConfig;
use crate::error::{DiError, Result};

/// Access to the remote service.
///
/// Implementations must fail on any non-success status; the readers never retry.
pub trait Transport: Send + Sync {
    /// GET an endpoint and decode its JSON body.
    fn fetch(&self, path: &str) -> Result<Value>;

    /// POST a JSON payload and decode the JSON array it answers with.
    fn submit(&self, path: &str, payload: &Value) -> Result<Vec<Value>>;
}

/// Blocking HTTP transport.
#[derive(Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    config: ReaderConfig,
}

impl HttpTransport {
    pub fn new(config: ReaderConfig) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms.max(100));
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .user_agent(&config.user_agent)
            .build();
        Self { agent, config }
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, path: &str) -> Result<Value> {
        let url = self.config.url(path);
        debug!(%url, "GET");
        let response = self
            .agent
            .get(&url)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| transport_error(path, e))?;
        Ok(serde_json::from_reader(response.into_reader())?)
    }

    fn submit(&self, path: &str, payload: &Value) -> Result<Vec<Value>> {
        let url = self.config.url(path);
        debug!(%url, "POST");
        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
            .send_json(payload.clone())
            .map_err(|e| transport_error(path, e))?;
        Ok(serde_json::from_reader(response.into_reader())?)
    }
}

fn transport_error(path: &str, err: ureq::Error) -> DiError {
    match err {
        ureq::Error::Status(status, _) => DiError::Transport {
            path: path.to_string(),
            status: Some(status),
            message: format!("http status {status}"),
        },
        ureq::Error::Transport(transport) => DiError::Transport {
            path: path.to_string(),
            status: None,
            message: transport.to_string(),
        },
    }
}
