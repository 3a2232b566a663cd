//! Consul KV store client.

use url::Url;

use crate::error::ConfigError;
use crate::store::Store;

/// Reads the managed document from a single Consul KV key.
///
/// `consul://host:port/path/to/key` maps to a raw KV read:
/// `GET http://host:port/v1/kv/path/to/key?raw`.
#[derive(Debug, Clone)]
pub struct ConsulStore {
    client: reqwest::Client,
    kv_url: String,
}

impl ConsulStore {
    pub fn new(uri: &Url) -> Result<Self, ConfigError> {
        let host = uri
            .host_str()
            .ok_or_else(|| ConfigError::Backend("consul URI is missing a host".into()))?;
        let port = uri.port().unwrap_or(8500);
        let key = uri.path().trim_start_matches('/');
        if key.is_empty() {
            return Err(ConfigError::Backend(
                "consul URI is missing a KV key path".into(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            kv_url: format!("http://{host}:{port}/v1/kv/{key}?raw"),
        })
    }

    pub fn kv_url(&self) -> &str {
        &self.kv_url
    }
}

impl Store for ConsulStore {
    async fn fetch(&self) -> Result<Vec<u8>, ConfigError> {
        let response = self
            .client
            .get(&self.kv_url)
            .send()
            .await
            .map_err(|e| ConfigError::Backend(format!("consul request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfigError::Backend(format!(
                "consul returned {status} for {}",
                self.kv_url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ConfigError::Backend(format!("consul read failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}
