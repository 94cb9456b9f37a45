use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::config::ViewerConfig;
use crate::error::CatalogError;
use crate::model::{GeneratedFragment, PosterRecord, records_from_body};

/// Raw result of a GET: status code and body.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Read-only transport for the catalog endpoints.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &Url) -> Result<FetchResponse, CatalogError>;
}

/// HTTP transport that bypasses caches on every request.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("poster-catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get(&self, url: &Url) -> Result<FetchResponse, CatalogError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(FetchResponse { status, body })
    }
}

/// Where the list and fragment endpoints live.
#[derive(Debug, Clone)]
pub struct Endpoints {
    list: Url,
    generated: Url,
}

impl Endpoints {
    pub fn from_config(config: &ViewerConfig) -> Result<Self, CatalogError> {
        let origin = Url::parse(&config.origin)?;
        let list = origin.join(&config.list_url)?;
        let mut base = config.generated_base.trim_end_matches('/').to_string();
        base.push('/');
        let generated = origin.join(&base)?;
        Ok(Self { list, generated })
    }

    pub fn list(&self) -> &Url {
        &self.list
    }

    /// `<generated-base>/<id>.json` with the id percent-encoded.
    pub fn fragment(&self, id: &str) -> Result<Url, CatalogError> {
        Ok(self.generated.join(&format!("{}.json", urlencoding::encode(id)))?)
    }
}

async fn get_json<F: Fetch + ?Sized>(fetcher: &F, url: &Url) -> Result<Value, CatalogError> {
    let response = fetcher.get(url).await?;
    if !response.is_success() {
        return Err(CatalogError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }
    Ok(serde_json::from_slice(&response.body)?)
}

/// Read the poster list once. Unsupported body shapes give an empty list;
/// transport, status and parse failures are errors for the caller to log.
pub async fn fetch_list<F: Fetch + ?Sized>(
    fetcher: &F,
    endpoints: &Endpoints,
) -> Result<Vec<PosterRecord>, CatalogError> {
    let body = get_json(fetcher, endpoints.list()).await?;
    Ok(records_from_body(body))
}

/// Read the analysis fragment for one poster.
pub async fn fetch_fragment<F: Fetch + ?Sized>(
    fetcher: &F,
    endpoints: &Endpoints,
    id: &str,
) -> Result<Option<GeneratedFragment>, CatalogError> {
    let url = endpoints.fragment(id)?;
    let body = get_json(fetcher, &url).await?;
    Ok(GeneratedFragment::from_value(body))
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned responses keyed by URL path. Unknown paths answer 404. Every
    /// requested URL is recorded.
    #[derive(Default)]
    pub struct StaticFetcher {
        routes: HashMap<String, (u16, String)>,
        offline: bool,
        pub requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// A transport where every request fails before reaching a server.
        pub fn offline() -> Self {
            Self { offline: true, ..Self::default() }
        }

        pub fn route(mut self, path: &str, status: u16, body: &str) -> Self {
            self.routes.insert(path.to_string(), (status, body.to_string()));
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetch for StaticFetcher {
        async fn get(&self, url: &Url) -> Result<FetchResponse, CatalogError> {
            self.requests.lock().unwrap().push(url.path().to_string());
            if self.offline {
                return Err(CatalogError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "offline",
                )));
            }
            let (status, body) = self
                .routes
                .get(url.path())
                .cloned()
                .unwrap_or((404, "Not Found".to_string()));
            Ok(FetchResponse { status, body: body.into_bytes() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StaticFetcher;
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::from_config(&ViewerConfig::default()).unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let endpoints = endpoints();
        assert_eq!(endpoints.list().as_str(), "http://localhost:8000/data/posters.json");
        assert_eq!(
            endpoints.fragment("poster_001").unwrap().as_str(),
            "http://localhost:8000/data/generated/poster_001.json"
        );
        assert_eq!(
            endpoints.fragment("a/b c").unwrap().path(),
            "/data/generated/a%2Fb%20c.json"
        );
    }

    #[test]
    fn test_absolute_list_url() {
        let config = ViewerConfig {
            list_url: "https://cdn.example.org/api/posters.json".to_string(),
            ..ViewerConfig::default()
        };
        let endpoints = Endpoints::from_config(&config).unwrap();
        assert_eq!(endpoints.list().host_str(), Some("cdn.example.org"));
    }

    #[tokio::test]
    async fn test_fetch_list_shapes() {
        let fetcher = StaticFetcher::new()
            .route("/data/posters.json", 200, r#"{"items": [{"id": 1}, {"id": 2}]}"#);
        let records = fetch_list(&fetcher, &endpoints()).await.unwrap();
        assert_eq!(records.len(), 2);

        let fetcher = StaticFetcher::new().route("/data/posters.json", 200, r#"{"count": 2}"#);
        assert!(fetch_list(&fetcher, &endpoints()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_list_failures() {
        let fetcher = StaticFetcher::new().route("/data/posters.json", 500, "boom");
        let err = fetch_list(&fetcher, &endpoints()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 500, .. }));

        let fetcher = StaticFetcher::new().route("/data/posters.json", 200, "<html>");
        let err = fetch_list(&fetcher, &endpoints()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_fetch_fragment() {
        let fetcher = StaticFetcher::new().route(
            "/data/generated/7.json",
            200,
            r#"{"simple_description": "Prosty opis"}"#,
        );
        let fragment = fetch_fragment(&fetcher, &endpoints(), "7").await.unwrap().unwrap();
        assert_eq!(fragment.simple_text(), Some("Prosty opis"));

        let err = fetch_fragment(&fetcher, &endpoints(), "8").await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 404, .. }));
    }
}
