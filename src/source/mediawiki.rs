//! Reqwest-backed MediaWiki page source.
//!
//! Talks to the MediaWiki action API (`/w/api.php`). Scalar accessors issue
//! one request each; image and link listings are paginated through the API's
//! `continue` object and fetched one batch at a time as the stream is pulled.

use super::dto::{ApiResponse, Continuation};
use super::{Image, ItemStream, PageHandle, PageSource, Reference, SourceError};
use crate::{Error, Result};
use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use reqwest::{header, Client, StatusCode, Url};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_USER_AGENT: &str = concat!("wikigraph/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 30;

type Params = Vec<(String, String)>;

/// Connection settings for a MediaWiki endpoint
#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// Full URL of `api.php`
    pub api_url: Url,
    /// User-Agent header sent upstream
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Items per listing request; `None` asks for the API maximum
    pub batch_limit: Option<u32>,
}

impl SourceSettings {
    /// Settings for `https://{language}.wikipedia.org/w/api.php`
    pub fn for_language(language: &str) -> Result<Self> {
        let api_url = language_api_url(language)?;
        Ok(Self {
            api_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            batch_limit: None,
        })
    }

    /// Settings for an explicit API endpoint
    pub fn for_api_url(api_url: &str) -> Result<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", api_url, e)))?;
        Ok(Self {
            api_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            batch_limit: None,
        })
    }
}

/// Build the API URL of a language edition
pub fn language_api_url(language: &str) -> Result<Url> {
    let language = language.trim();
    let language = if language.is_empty() { DEFAULT_LANGUAGE } else { language };
    if !language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(Error::InvalidUrl(format!("invalid language code: {}", language)));
    }
    let raw = format!("https://{}.wikipedia.org/w/api.php", language);
    Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))
}

/// Shared HTTP plumbing for the source and its pages
struct ApiClient {
    client: Client,
    api_url: Url,
    user_agent: String,
    batch_limit: String,
}

impl ApiClient {
    async fn get(&self, params: &[(String, String)]) -> std::result::Result<ApiResponse, SourceError> {
        tracing::debug!(url = %self.api_url, ?params, "MediaWiki request");
        let response = self
            .client
            .get(self.api_url.clone())
            .header(header::USER_AGENT, self.user_agent.as_str())
            .header(header::ACCEPT, "application/json")
            .query(&[("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        ApiResponse::decode(body.as_ref())
    }

    /// Follow `continue` until the API stops returning one.
    ///
    /// Each batch is requested only when the previous one has been consumed.
    fn paginate<'a, T>(&'a self, base: Params, extract: fn(&ApiResponse) -> Vec<T>) -> ItemStream<'a, T>
    where
        T: Send + 'a,
    {
        let batches = stream::try_unfold(Some(Continuation::new()), move |cursor| {
            let base = base.clone();
            async move {
                let Some(cursor) = cursor else {
                    return Ok(None);
                };
                let mut request = base;
                request.extend(cursor);
                let response = self.get(&request).await?;
                let items = extract(&response);
                Ok::<_, SourceError>(Some((items, response.continuation)))
            }
        });

        batches
            .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, SourceError>)))
            .try_flatten()
            .boxed()
    }
}

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SourceError {
    SourceError::Status {
        status: status.as_u16(),
        body: body_preview(body),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

/// Page source over the MediaWiki action API
pub struct MediaWikiSource {
    api: Arc<ApiClient>,
}

impl MediaWikiSource {
    pub fn new(settings: SourceSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        let batch_limit = settings
            .batch_limit
            .map(|n| n.max(1).to_string())
            .unwrap_or_else(|| "max".to_string());
        Ok(Self {
            api: Arc::new(ApiClient {
                client,
                api_url: settings.api_url,
                user_agent: settings.user_agent,
                batch_limit,
            }),
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api.api_url
    }

    async fn lookup(&self, key: &str, value: &str) -> std::result::Result<Option<Arc<dyn PageHandle>>, SourceError> {
        let mut request = params(&[("action", "query"), ("prop", "info")]);
        request.push((key.to_string(), value.to_string()));
        if key == "titles" {
            request.push(("redirects".to_string(), "1".to_string()));
        }

        let found = self.api.get(&request).await?.first_page().filter(|p| p.exists());
        let Some((pageid, title)) = found.and_then(|p| p.pageid.map(|id| (id, p.title))) else {
            tracing::debug!(key, value, "page not found");
            return Ok(None);
        };

        let page: Arc<dyn PageHandle> = Arc::new(MediaWikiPage {
            api: self.api.clone(),
            pageid,
            title: title.unwrap_or_default(),
        });
        Ok(Some(page))
    }
}

#[async_trait]
impl PageSource for MediaWikiSource {
    async fn page_by_id(&self, id: &str) -> std::result::Result<Option<Arc<dyn PageHandle>>, SourceError> {
        // Page ids are numeric; anything else cannot exist upstream.
        let Ok(pageid) = id.trim().parse::<u64>() else {
            tracing::debug!(id, "non-numeric page id");
            return Ok(None);
        };
        self.lookup("pageids", &pageid.to_string()).await
    }

    async fn page_by_title(&self, title: &str) -> std::result::Result<Option<Arc<dyn PageHandle>>, SourceError> {
        if title.trim().is_empty() {
            return Ok(None);
        }
        self.lookup("titles", title).await
    }
}

/// A page resolved against the MediaWiki API
pub struct MediaWikiPage {
    api: Arc<ApiClient>,
    pageid: u64,
    title: String,
}

impl MediaWikiPage {
    fn page_params(&self, pairs: &[(&str, &str)]) -> Params {
        let mut request = params(pairs);
        request.push(("pageids".to_string(), self.pageid.to_string()));
        request
    }

    async fn extract(&self, intro_only: bool) -> std::result::Result<String, SourceError> {
        let mut request = self.page_params(&[
            ("action", "query"),
            ("prop", "extracts"),
            ("explaintext", "1"),
        ]);
        if intro_only {
            request.push(("exintro".to_string(), "1".to_string()));
        }

        let page = self
            .api
            .get(&request)
            .await?
            .first_page()
            .filter(|p| p.exists())
            .ok_or_else(|| SourceError::Decode(format!("page {} vanished", self.pageid)))?;
        Ok(page.extract.unwrap_or_default())
    }
}

#[async_trait]
impl PageHandle for MediaWikiPage {
    async fn id(&self) -> std::result::Result<String, SourceError> {
        Ok(self.pageid.to_string())
    }

    async fn title(&self) -> std::result::Result<String, SourceError> {
        Ok(self.title.clone())
    }

    async fn content(&self) -> std::result::Result<String, SourceError> {
        self.extract(false).await
    }

    async fn html_content(&self) -> std::result::Result<String, SourceError> {
        let pageid = self.pageid.to_string();
        let request = params(&[("action", "parse"), ("prop", "text"), ("pageid", pageid.as_str())]);
        self.api
            .get(&request)
            .await?
            .parse
            .map(|parsed| parsed.text)
            .ok_or_else(|| SourceError::Decode(format!("no parse output for page {}", self.pageid)))
    }

    async fn summary(&self) -> std::result::Result<String, SourceError> {
        self.extract(true).await
    }

    fn images(&self) -> ItemStream<'_, Image> {
        let request = self.page_params(&[
            ("action", "query"),
            ("generator", "images"),
            ("gimlimit", self.api.batch_limit.as_str()),
            ("prop", "imageinfo"),
            ("iiprop", "url"),
        ]);
        self.api.paginate(request, ApiResponse::images)
    }

    fn references(&self) -> ItemStream<'_, Reference> {
        let request = self.page_params(&[
            ("action", "query"),
            ("prop", "extlinks"),
            ("ellimit", self.api.batch_limit.as_str()),
        ]);
        self.api.paginate(request, ApiResponse::references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::{Query, State}, http::StatusCode as HttpStatus, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned MediaWiki responses keyed off the request parameters
    async fn stub_api(
        State(hits): State<Arc<AtomicUsize>>,
        Query(q): Query<HashMap<String, String>>,
    ) -> std::result::Result<Json<Value>, HttpStatus> {
        hits.fetch_add(1, Ordering::SeqCst);
        assert_eq!(q.get("format").map(String::as_str), Some("json"));

        let body = match (q.get("action").map(String::as_str), q.get("prop").map(String::as_str)) {
            (Some("query"), Some("info")) => match (q.get("titles"), q.get("pageids")) {
                (Some(t), _) if t == "Argentina" => json!({"query": {"pages": [{"pageid": 1234, "ns": 0, "title": "Argentina"}]}}),
                (Some(t), _) if t == "Chile" => json!({"query": {"pages": [{"pageid": 5678, "ns": 0, "title": "Chile"}]}}),
                (_, Some(id)) if id == "1234" => json!({"query": {"pages": [{"pageid": 1234, "ns": 0, "title": "Argentina"}]}}),
                (_, Some(id)) if id == "503" => return Err(HttpStatus::SERVICE_UNAVAILABLE),
                (Some(t), _) => json!({"query": {"pages": [{"ns": 0, "title": t, "missing": true}]}}),
                (_, Some(id)) => json!({"query": {"pages": [{"pageid": id.parse::<u64>().unwrap_or(0), "missing": true}]}}),
                _ => json!({"error": {"code": "missingparam", "info": "titles or pageids required"}}),
            },
            (Some("query"), Some("extracts")) => {
                let text = if q.contains_key("exintro") { "The country" } else { "Argentina is a country" };
                json!({"query": {"pages": [{"pageid": 1234, "ns": 0, "title": "Argentina", "extract": text}]}})
            }
            (Some("parse"), _) => json!({"parse": {"title": "Argentina", "pageid": 1234, "text": "<b>Argentina</b> is a country"}}),
            (Some("query"), Some("imageinfo")) => match q.get("gimcontinue") {
                // Chile's second batch is unavailable
                Some(_) if q.get("pageids").map(String::as_str) == Some("5678") => {
                    return Err(HttpStatus::SERVICE_UNAVAILABLE);
                }
                None => json!({
                    "continue": {"gimcontinue": "1234|B.png", "continue": "gimcontinue||"},
                    "query": {"pages": [{"ns": 6, "title": "File:A.png", "imageinfo": [{"url": "url", "descriptionurl": "description"}]}]}
                }),
                Some(_) => json!({
                    "query": {"pages": [{"ns": 6, "title": "File:B.png", "imageinfo": [{"url": "url2", "descriptionurl": "description2"}]}]}
                }),
            },
            (Some("query"), Some("extlinks")) => json!({
                "query": {"pages": [{"pageid": 1234, "title": "Argentina", "extlinks": [{"url": "https://gob.ar"}]}]}
            }),
            _ => json!({"error": {"code": "badvalue", "info": "unexpected request"}}),
        };
        Ok(Json(body))
    }

    async fn spawn_stub() -> (MediaWikiSource, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new().route("/w/api.php", get(stub_api)).with_state(hits.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let settings = SourceSettings::for_api_url(&format!("http://{}/w/api.php", addr)).unwrap();
        (MediaWikiSource::new(settings).unwrap(), hits)
    }

    #[test]
    fn test_language_api_url() {
        let url = language_api_url("es").unwrap();
        assert_eq!(url.as_str(), "https://es.wikipedia.org/w/api.php");
        assert_eq!(language_api_url("").unwrap().host_str(), Some("en.wikipedia.org"));
        assert!(language_api_url("en/../evil").is_err());
    }

    #[test]
    fn test_body_preview_truncates() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 163);
        assert_eq!(body_preview(b"  slow \n down "), "slow down");
    }

    #[tokio::test]
    async fn test_lookup_and_scalars() {
        let (source, _) = spawn_stub().await;

        let page = source.page_by_title("Argentina").await.unwrap().unwrap();
        assert_eq!(page.id().await.unwrap(), "1234");
        assert_eq!(page.title().await.unwrap(), "Argentina");
        assert_eq!(page.content().await.unwrap(), "Argentina is a country");
        assert_eq!(page.summary().await.unwrap(), "The country");
        assert_eq!(page.html_content().await.unwrap(), "<b>Argentina</b> is a country");

        let by_id = source.page_by_id("1234").await.unwrap().unwrap();
        assert_eq!(by_id.title().await.unwrap(), "Argentina");
    }

    #[tokio::test]
    async fn test_not_found_is_none() {
        let (source, hits) = spawn_stub().await;

        assert!(source.page_by_title("Atlantis").await.unwrap().is_none());
        assert!(source.page_by_id("999").await.unwrap().is_none());

        let before = hits.load(Ordering::SeqCst);
        assert!(source.page_by_id("not-a-number").await.unwrap().is_none());
        assert_eq!(hits.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn test_http_failure_is_status_error() {
        let (source, _) = spawn_stub().await;
        match source.page_by_id("503").await {
            Err(SourceError::Status { status, .. }) => assert_eq!(status, 503),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[tokio::test]
    async fn test_images_follow_continuation_lazily() {
        let (source, hits) = spawn_stub().await;
        let page = source.page_by_title("Argentina").await.unwrap().unwrap();
        let after_lookup = hits.load(Ordering::SeqCst);

        let mut images = page.images();
        let first = images.try_next().await.unwrap().unwrap();
        assert_eq!(first, Image::new("url", "File:A.png", "description"));
        assert_eq!(hits.load(Ordering::SeqCst), after_lookup + 1);

        let rest: Vec<_> = images.try_collect().await.unwrap();
        assert_eq!(rest, vec![Image::new("url2", "File:B.png", "description2")]);
        assert_eq!(hits.load(Ordering::SeqCst), after_lookup + 2);
    }

    #[tokio::test]
    async fn test_failed_continuation_drops_listing() {
        let (source, hits) = spawn_stub().await;
        let page = source.page_by_title("Chile").await.unwrap().unwrap();
        let after_lookup = hits.load(Ordering::SeqCst);

        let images: std::result::Result<Vec<Image>, _> = page.images().try_collect().await;
        match images {
            Err(SourceError::Status { status, .. }) => assert_eq!(status, 503),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(images) => panic!("expected an error, got {} images", images.len()),
        }
        assert_eq!(hits.load(Ordering::SeqCst), after_lookup + 2);
    }

    #[tokio::test]
    async fn test_references() {
        let (source, _) = spawn_stub().await;
        let page = source.page_by_id("1234").await.unwrap().unwrap();
        let refs: Vec<_> = page.references().try_collect().await.unwrap();
        assert_eq!(refs, vec![Reference::new("https://gob.ar")]);
    }
}
