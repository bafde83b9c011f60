use std::time::Duration;

use reqwest::Client;

use crate::error::KitnError;

/// Fetches the body behind a registry URL.
pub trait Transport {
    async fn get(&self, url: &str) -> Result<String, KitnError>;
}

/// HTTP(S) transport; `file://` URLs are read from disk so local
/// registries work without a server.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, KitnError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("kitn/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(KitnError::HttpClient)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, KitnError> {
        if let Some(path) = url.strip_prefix("file://") {
            return read_local(url, path).await;
        }

        tracing::debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| KitnError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(KitnError::FetchFailed {
                url: url.to_string(),
                status: status.to_string(),
            });
        }

        response.text().await.map_err(|source| KitnError::Request {
            url: url.to_string(),
            source,
        })
    }
}

async fn read_local(url: &str, path: &str) -> Result<String, KitnError> {
    tracing::debug!("reading {path}");
    match tokio::fs::read_to_string(path).await {
        Ok(body) => Ok(body),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(KitnError::FetchFailed {
            url: url.to_string(),
            status: "not found".to_string(),
        }),
        Err(source) => Err(KitnError::FileRead {
            path: path.into(),
            source,
        }),
    }
}
