use crate::utils::errors::InstallerError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::info;
use url::Url;

const USER_AGENT: &str = concat!("healthcheck-installer/", env!("CARGO_PKG_VERSION"));

/// Where release artifacts are downloaded from.
///
/// The store is the only network capability of the installer. Installs take it by
/// value and drop it as soon as the bytes are in memory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Returns the full body of the artifact at `url`.
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, InstallerError>;
}

/// Plain HTTP(S) download, following redirects as release hosts commonly use them.
pub struct HttpArtifactStore {
    client: Client,
}

impl HttpArtifactStore {
    pub fn new(request_timeout: Duration) -> Result<Self, InstallerError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| InstallerError::FetchError {
                url: String::new(),
                message: format!("failed to build http client: {:?}", e),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArtifactStore for HttpArtifactStore {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, InstallerError> {
        let fetch_error = |message: String| InstallerError::FetchError {
            url: url.to_string(),
            message,
        };

        info!(url = url.as_str(), "[Installer] Downloading artifact");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_error(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("unexpected status {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(format!("failed to read body: {}", e)))?;
        if bytes.is_empty() {
            return Err(fetch_error("empty response body".to_string()));
        }

        info!(
            url = url.as_str(),
            size_bytes = bytes.len(),
            "[Installer] Artifact downloaded"
        );
        Ok(bytes.to_vec())
    }
}
