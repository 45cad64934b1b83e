//! Loading source documents from files and URLs.
//!
//! Network and filesystem access sit behind the [`Fetcher`] and
//! [`FileReader`] traits so the loader can be driven by in-memory fakes in
//! tests. Every read is bounded by a timeout.
//!
//! # Examples
//!
//! ```no_run
//! use contractspec_core::loader::DocumentLoader;
//!
//! # async fn run() -> contractspec_core::Result<()> {
//! let loaded = DocumentLoader::new().load("https://api.example.com/openapi.json").await?;
//! println!("{:?}", loaded.document.title());
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use futures::future::BoxFuture;
use url::Url;

use crate::contract::{SourceKind, SourceOrigin};
use crate::openapi::{DocumentFormat, OpenApiDocument};
use crate::{Error, Result};

/// Default bound on a single fetch or read
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Retrieves the body of a remote document
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Reads a local document
pub trait FileReader: Send + Sync {
    fn read<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String>>;
}

/// [`Fetcher`] backed by reqwest
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::Fetch {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            Ok(response.text().await?)
        })
    }
}

/// [`FileReader`] backed by tokio's filesystem API
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move { Ok(tokio::fs::read_to_string(path).await?) })
    }
}

/// A parsed document together with where it came from
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document: OpenApiDocument,
    pub format: DocumentFormat,
    pub origin: SourceOrigin,
}

/// Source kind implied by a location's extension, for non-OpenAPI types
fn kind_from_extension(location: &str) -> Option<SourceKind> {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    match Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("graphql") | Some("gql") => Some(SourceKind::GraphQl),
        Some("proto") => Some(SourceKind::Protobuf),
        _ => None,
    }
}

/// Parse `location` as an http(s) URL, or `None` for a filesystem path
fn as_remote(location: &str) -> Option<Url> {
    Url::parse(location)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Loads OpenAPI documents from URLs or files
pub struct DocumentLoader {
    fetcher: Box<dyn Fetcher>,
    reader: Box<dyn FileReader>,
    timeout: Duration,
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self::with_collaborators(Box::<HttpFetcher>::default(), Box::new(FsReader))
    }

    pub fn with_collaborators(fetcher: Box<dyn Fetcher>, reader: Box<dyn FileReader>) -> Self {
        Self {
            fetcher,
            reader,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Read the raw text at `location` without parsing it
    pub async fn load_text(&self, location: &str) -> Result<(String, SourceOrigin)> {
        if let Some(kind) = kind_from_extension(location) {
            return Err(Error::UnsupportedSource(format!("{} ({})", location, kind)));
        }

        let remote = as_remote(location);
        let read = async {
            match &remote {
                Some(url) => self.fetcher.fetch(url.as_str()).await,
                None => self.reader.read(Path::new(location)).await,
            }
        };
        log::debug!("Loading {} (timeout {:?})", location, self.timeout);
        let content = tokio::time::timeout(self.timeout, read)
            .await
            .map_err(|_| Error::FetchTimeout {
                url: location.to_string(),
                timeout: self.timeout,
            })??;

        let origin = SourceOrigin {
            kind: SourceKind::OpenApi,
            url: remote.map(|url| url.to_string()),
            file: as_remote(location).is_none().then(|| location.to_string()),
        };
        Ok((content, origin))
    }

    /// Load and parse the document at `location`
    pub async fn load(&self, location: &str) -> Result<LoadedDocument> {
        let (content, origin) = self.load_text(location).await?;
        let format = DocumentFormat::from_extension(location).unwrap_or_else(|| DocumentFormat::sniff(&content));
        let document = OpenApiDocument::parse_content(&content, Some(format)).map_err(|e| {
            Error::openapi(format!("Failed to parse document at {}: {}", location, e))
        })?;

        if document.json.get("asyncapi").is_some() {
            return Err(Error::UnsupportedSource(format!(
                "{} ({})",
                location,
                SourceKind::AsyncApi
            )));
        }
        if document.openapi_version().is_none() {
            log::warn!("{} does not declare an 'openapi' version", location);
        }

        Ok(LoadedDocument {
            document,
            format,
            origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    struct MockFetcher {
        bodies: HashMap<String, String>,
    }

    impl Fetcher for MockFetcher {
        fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String>> {
            Box::pin(async move {
                self.bodies.get(url).cloned().ok_or(Error::Fetch {
                    url: url.to_string(),
                    status: 404,
                })
            })
        }
    }

    struct PendingFetcher;

    impl Fetcher for PendingFetcher {
        fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<String>> {
            Box::pin(futures::future::pending())
        }
    }

    const YAML_DOC: &str = "openapi: 3.0.3\ninfo:\n  title: Widgets\n  version: '1'\npaths: {}\n";

    fn mock(url: &str, body: &str) -> DocumentLoader {
        let fetcher = MockFetcher {
            bodies: HashMap::from([(url.to_string(), body.to_string())]),
        };
        DocumentLoader::with_collaborators(Box::new(fetcher), Box::new(FsReader))
    }

    #[tokio::test]
    async fn test_loads_url_and_sniffs_yaml() -> Result<()> {
        let url = "https://api.example.com/spec";
        let loaded = mock(url, YAML_DOC).load(url).await?;
        assert_eq!(loaded.format, DocumentFormat::Yaml);
        assert_eq!(loaded.document.title(), Some("Widgets"));
        assert_eq!(loaded.origin.url.as_deref(), Some(url));
        assert_eq!(loaded.origin.file, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let loader = mock("https://api.example.com/a.json", "{}");
        let err = loader.load("https://api.example.com/missing.json").await.unwrap_err();
        assert!(matches!(err, Error::Fetch { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let loader = DocumentLoader::with_collaborators(Box::new(PendingFetcher), Box::new(FsReader))
            .with_timeout(Duration::from_millis(20));
        let err = loader.load("https://slow.example.com/openapi.json").await.unwrap_err();
        assert!(matches!(err, Error::FetchTimeout { timeout, .. } if timeout == Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_loads_file_by_extension() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("openapi.json");
        tokio::fs::write(
            &path,
            r#"{"openapi": "3.1.0", "info": {"title": "Files", "version": "2"}, "paths": {}}"#,
        )
        .await?;
        let location = path.to_string_lossy().to_string();
        let loaded = DocumentLoader::new().load(&location).await?;
        assert_eq!(loaded.format, DocumentFormat::Json);
        assert_eq!(loaded.document.version(), Some("2"));
        assert_eq!(loaded.origin.file.as_deref(), Some(location.as_str()));
        Ok(())
    }

    #[tokio::test]
    async fn test_unsupported_sources() {
        let loader = mock("https://api.example.com/events.yaml", "asyncapi: 2.6.0\n");
        let err = loader.load("https://api.example.com/events.yaml").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedSource(ref m) if m.contains("asyncapi")));

        let err = loader.load("schema.graphql").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedSource(_)));
        let err = loader.load("service.proto").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedSource(_)));
    }
}
