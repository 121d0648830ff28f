use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

/// Errors that can occur while fetching a document
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Supplies the raw catalog and synonym documents
///
/// Implementations only fetch; parsing and validation happen in
/// [`crate::services::catalog`].
pub trait DataSource: Send + Sync {
    /// Raw JSON text of the professionals catalog
    fn fetch_catalog(&self) -> impl Future<Output = Result<String, SourceError>> + Send;

    /// Raw JSON text of the synonym mapping, `None` when none is configured
    fn fetch_synonyms(&self) -> impl Future<Output = Result<Option<String>, SourceError>> + Send;
}

/// Where a document lives: a local file or an `http(s)://` URL
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentLocation {
    Path(PathBuf),
    Url(String),
}

impl DocumentLocation {
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::Path(PathBuf::from(location))
        }
    }
}

impl std::fmt::Display for DocumentLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Fetches documents from files or over HTTP
pub struct DocumentSource {
    client: Client,
    catalog: DocumentLocation,
    synonyms: Option<DocumentLocation>,
}

impl DocumentSource {
    /// Create a source; `timeout` bounds each HTTP request
    pub fn new(catalog: DocumentLocation, synonyms: Option<DocumentLocation>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            catalog,
            synonyms,
        }
    }

    pub fn catalog_location(&self) -> &DocumentLocation {
        &self.catalog
    }

    async fn fetch(&self, location: &DocumentLocation) -> Result<String, SourceError> {
        match location {
            DocumentLocation::Path(path) => {
                tracing::debug!("Reading document from {}", path.display());
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SourceError::Io {
                        path: path.clone(),
                        source,
                    })
            }
            DocumentLocation::Url(url) => {
                tracing::debug!("Fetching document from {}", url);
                let response = self.client.get(url).send().await?;

                if !response.status().is_success() {
                    return Err(SourceError::Status {
                        url: url.clone(),
                        status: response.status().as_u16(),
                    });
                }

                Ok(response.text().await?)
            }
        }
    }
}

impl DataSource for DocumentSource {
    async fn fetch_catalog(&self) -> Result<String, SourceError> {
        self.fetch(&self.catalog).await
    }

    async fn fetch_synonyms(&self) -> Result<Option<String>, SourceError> {
        match &self.synonyms {
            Some(location) => self.fetch(location).await.map(Some),
            None => Ok(None),
        }
    }
}

/// Documents held in memory, for embedding fixed catalogs and for tests
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    catalog: String,
    synonyms: Option<String>,
}

impl StaticSource {
    pub fn new(catalog: impl Into<String>, synonyms: Option<String>) -> Self {
        Self {
            catalog: catalog.into(),
            synonyms,
        }
    }
}

impl DataSource for StaticSource {
    async fn fetch_catalog(&self) -> Result<String, SourceError> {
        Ok(self.catalog.clone())
    }

    async fn fetch_synonyms(&self) -> Result<Option<String>, SourceError> {
        Ok(self.synonyms.clone())
    }
}
