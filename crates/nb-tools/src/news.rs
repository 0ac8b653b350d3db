//! News search and the `latest_news` tool.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use nb_core::{Error, Tool, ToolOutput};

pub const DEFAULT_NEWS_BASE_URL: &str = "https://newsdata.io/api/1";

// =============================================================================
// NewsData.io client
// =============================================================================

/// Fixed constraints applied to every search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsQueryConfig {
    /// ISO country code (e.g., "in")
    pub country: String,
    /// ISO language code (e.g., "en")
    pub language: String,
}

impl Default for NewsQueryConfig {
    fn default() -> Self {
        Self {
            country: "in".to_string(),
            language: "en".to_string(),
        }
    }
}

/// One entry of a NewsData.io `results` array. Only `content` is used.
#[derive(Clone, Debug, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum NewsDataResponse {
    Success {
        /// The service sends `null` when nothing matches
        #[serde(default)]
        results: Option<Vec<Article>>,
    },
    Error {
        results: NewsDataError,
    },
}

#[derive(Deserialize)]
struct NewsDataError {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl NewsDataError {
    fn describe(&self) -> String {
        match &self.code {
            Some(code) => format!("{} ({})", self.message, code),
            None => self.message.clone(),
        }
    }
}

const USER_AGENT: &str = concat!("newsbrief/", env!("CARGO_PKG_VERSION"));

fn http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "HTTP client setup failed; using defaults without timeout");
            Client::new()
        })
}

pub struct NewsDataClient {
    client: Client,
    api_key: String,
    base_url: String,
    query_config: NewsQueryConfig,
}

impl NewsDataClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            api_key: api_key.into(),
            base_url: DEFAULT_NEWS_BASE_URL.to_string(),
            query_config: NewsQueryConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_query_config(mut self, query_config: NewsQueryConfig) -> Self {
        self.query_config = query_config;
        self
    }

    pub fn query_config(&self) -> &NewsQueryConfig {
        &self.query_config
    }

    /// Issue one search request. Without a query the service returns its
    /// latest headlines for the configured country and language.
    pub async fn search(&self, query: Option<&str>) -> Result<Vec<Article>, Error> {
        let mut params = vec![("apikey", self.api_key.as_str())];
        if let Some(q) = query {
            params.push(("q", q));
        }
        params.push(("country", self.query_config.country.as_str()));
        params.push(("language", self.query_config.language.as_str()));

        debug!(
            query = ?query,
            country = %self.query_config.country,
            language = %self.query_config.language,
            "NewsData search"
        );

        let response = self
            .client
            .get(format!("{}/news", self.base_url))
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<NewsDataResponse>(&body) {
                Ok(NewsDataResponse::Error { results }) => results.describe(),
                _ => body,
            };
            return Err(Error::from_status(status.as_u16(), message));
        }

        match serde_json::from_str::<NewsDataResponse>(&body)? {
            NewsDataResponse::Success { results } => {
                let results = results.unwrap_or_default();
                debug!(count = results.len(), "NewsData search returned articles");
                Ok(results)
            }
            NewsDataResponse::Error { results } => {
                Err(Error::api(status.as_u16(), results.describe()))
            }
        }
    }
}

// =============================================================================
// NewsFetcher
// =============================================================================

/// Pick one article uniformly at random. An empty set is an error.
pub fn select_article<R: Rng + ?Sized>(articles: &[String], rng: &mut R) -> Result<String, Error> {
    articles.choose(rng).cloned().ok_or(Error::NoArticles)
}

/// Returns a single random article body per call.
pub struct NewsFetcher {
    client: NewsDataClient,
    search_query: Option<String>,
}

impl NewsFetcher {
    pub fn new(client: NewsDataClient, search_query: Option<String>) -> Self {
        Self {
            client,
            search_query,
        }
    }

    /// The search term used by `fetch_latest`.
    pub fn search_query(&self) -> Option<&str> {
        self.search_query.as_deref()
    }

    /// Fetch one random article body for `query` (or the latest headlines).
    ///
    /// Articles without content are not candidates.
    pub async fn fetch(&self, query: Option<&str>) -> Result<String, Error> {
        let contents: Vec<String> = self
            .client
            .search(query)
            .await?
            .into_iter()
            .filter_map(|article| article.content)
            .collect();

        select_article(&contents, &mut rand::thread_rng())
    }

    /// Fetch one random article body for the configured search term.
    pub async fn fetch_latest(&self) -> Result<String, Error> {
        self.fetch(self.search_query.as_deref()).await
    }
}

// =============================================================================
// Latest News Tool
// =============================================================================

/// `NewsFetcher` exposed to the model. Takes no arguments; the search term
/// is the fetcher's configured one.
pub struct LatestNewsTool {
    fetcher: NewsFetcher,
}

impl LatestNewsTool {
    pub fn new(fetcher: NewsFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Tool for LatestNewsTool {
    fn name(&self) -> &str {
        "latest_news"
    }

    fn description(&self) -> &str {
        "Get the latest news article as plain text"
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolOutput, Error> {
        let article = self.fetcher.fetch_latest().await?;
        Ok(ToolOutput::success(article))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn success_body(contents: &[Option<&str>]) -> serde_json::Value {
        let results: Vec<_> = contents
            .iter()
            .enumerate()
            .map(|(i, content)| {
                serde_json::json!({
                    "title": format!("Headline {}", i),
                    "link": format!("https://example.com/{}", i),
                    "content": content,
                })
            })
            .collect();
        serde_json::json!({
            "status": "success",
            "totalResults": results.len(),
            "results": results,
        })
    }

    fn fetcher_for(server: &MockServer, query: Option<&str>) -> NewsFetcher {
        let client = NewsDataClient::new("pub_test").with_base_url(server.uri());
        NewsFetcher::new(client, query.map(String::from))
    }

    #[test]
    fn test_select_article_returns_member() {
        let articles: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let picked = select_article(&articles, &mut rng).unwrap();
            assert!(articles.contains(&picked));
        }
    }

    #[test]
    fn test_select_article_reaches_every_member() {
        let articles: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..300 {
            seen.insert(select_article(&articles, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_select_article_empty_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = select_article(&[], &mut rng).unwrap_err();
        assert!(matches!(err, Error::NoArticles));
    }

    #[test]
    fn test_default_query_config() {
        let config = NewsQueryConfig::default();
        assert_eq!(config.country, "in");
        assert_eq!(config.language, "en");
    }

    #[tokio::test]
    async fn test_fetch_without_query_omits_search_term() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .and(query_param("apikey", "pub_test"))
            .and(query_param("country", "in"))
            .and(query_param("language", "en"))
            .and(query_param_is_missing("q"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(&[Some("Monsoon arrives")])))
            .expect(1)
            .mount(&server)
            .await;

        let article = fetcher_for(&server, None).fetch(None).await.unwrap();
        assert_eq!(article, "Monsoon arrives");
    }

    #[tokio::test]
    async fn test_fetch_with_query_adds_search_term() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .and(query_param("q", "business"))
            .and(query_param("country", "in"))
            .and(query_param("language", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(&[
                Some("Sensex closes higher"),
                Some("Rupee steady against dollar"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let article = fetcher_for(&server, None).fetch(Some("business")).await.unwrap();
        assert!(article == "Sensex closes higher" || article == "Rupee steady against dollar");
    }

    #[tokio::test]
    async fn test_fetch_latest_uses_configured_query_and_country() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .and(query_param("q", "cricket"))
            .and(query_param("country", "gb"))
            .and(query_param("language", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(&[Some("Test match drawn")])))
            .expect(1)
            .mount(&server)
            .await;

        let client = NewsDataClient::new("pub_test")
            .with_base_url(server.uri())
            .with_query_config(NewsQueryConfig {
                country: "gb".to_string(),
                language: "en".to_string(),
            });
        let fetcher = NewsFetcher::new(client, Some("cricket".to_string()));

        assert_eq!(fetcher.search_query(), Some("cricket"));
        assert_eq!(fetcher.fetch_latest().await.unwrap(), "Test match drawn");
    }

    #[tokio::test]
    async fn test_fetch_skips_articles_without_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(&[None, Some("Only body"), None])))
            .mount(&server)
            .await;

        let article = fetcher_for(&server, None).fetch(None).await.unwrap();
        assert_eq!(article, "Only body");
    }

    #[tokio::test]
    async fn test_fetch_empty_results_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(&[])))
            .mount(&server)
            .await;

        let err = fetcher_for(&server, None).fetch(None).await.unwrap_err();
        assert!(matches!(err, Error::NoArticles));
    }

    #[tokio::test]
    async fn test_fetch_null_results_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "totalResults": 0,
                "results": null
            })))
            .mount(&server)
            .await;

        let err = fetcher_for(&server, None).fetch(None).await.unwrap_err();
        assert!(matches!(err, Error::NoArticles));
    }

    #[tokio::test]
    async fn test_search_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(&[Some("Body")])))
            .expect(1)
            .mount(&server)
            .await;

        let articles = NewsDataClient::new("pub_test")
            .with_base_url(server.uri())
            .search(None)
            .await
            .unwrap();
        assert_eq!(articles.len(), 1);
    }

    #[tokio::test]
    async fn test_error_status_in_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "results": {"message": "The provided country is not supported", "code": "UnsupportedFilter"}
            })))
            .mount(&server)
            .await;

        let err = fetcher_for(&server, None).fetch(None).await.unwrap_err();
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 200);
                assert!(message.contains("country is not supported"));
                assert!(message.contains("UnsupportedFilter"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "status": "error",
                "results": {"message": "API key is invalid", "code": "Unauthorized"}
            })))
            .mount(&server)
            .await;

        let err = fetcher_for(&server, None).fetch(None).await.unwrap_err();
        assert!(err.is_auth_error());
        assert!(err.to_string().contains("API key is invalid"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_serialization_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = fetcher_for(&server, None).fetch(None).await.unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[tokio::test]
    async fn test_latest_news_tool() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .and(query_param("q", "business"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(&[Some("Startup raises funding")])))
            .mount(&server)
            .await;

        let tool = LatestNewsTool::new(fetcher_for(&server, Some("business")));
        let def = tool.definition();
        assert_eq!(def.name, "latest_news");
        assert!(def.parameters.properties.is_empty());

        let output = tool.execute(serde_json::json!({"query": "ignored"})).await.unwrap();
        assert!(!output.is_error);
        assert_eq!(output.content, "Startup raises funding");
    }

    #[tokio::test]
    async fn test_latest_news_tool_propagates_empty_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(&[])))
            .mount(&server)
            .await;

        let tool = LatestNewsTool::new(fetcher_for(&server, None));
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, Error::NoArticles));
    }
}
