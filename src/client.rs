// Hotel data client: paginated fetches over the TravelHunt REST API
//
// `HotelSource` is the transport seam (HTTP in production, an in-memory
// source in tests). `HotelClient` owns everything above it: envelope
// validation, flattening, deal selection and search.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ClientConfig, ConfigError};
use crate::deals::{rank_recommended, select_from_entries, wants_next_page, MAX_DEALS};
use crate::filter::search_listings;
use crate::listing::{flatten_entries, flatten_entry, Listings, NormalizedListing, SkippedRoom};
use crate::suggest::{suggest, Suggestion, MIN_QUERY_CHARS};
use crate::supplier::HotelsPage;

const HOTELS_PATH: &str = "hotel/hotels/";

/// Pages are 1-based; deals, search and suggestions read the first one.
pub const FIRST_PAGE: u32 = 1;

// Error types for the hotel data client
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: {status_code} - {message}")]
    Status { status_code: u16, message: String },

    #[error("Invalid API response structure: {0}")]
    Contract(String),

    #[error("Invalid page number: {0}")]
    InvalidPage(u32),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Which side of the contract an [`ApiError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service could not be reached or answered with a non-2xx status.
    Transport,
    /// The service answered, but not with the agreed response shape.
    Contract,
    /// The caller asked for something that cannot be requested.
    Request,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) | ApiError::Status { .. } => ErrorKind::Transport,
            ApiError::Contract(_) => ErrorKind::Contract,
            ApiError::InvalidPage(_) | ApiError::InvalidUrl(_) => ErrorKind::Request,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn is_contract(&self) -> bool {
        self.kind() == ErrorKind::Contract
    }
}

/// A page to request: by number, or by following a `next` link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageRequest {
    Number(u32),
    Link(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotelPage {
    pub listings: Vec<NormalizedListing>,
    pub pagination: Pagination,
    pub skipped: Vec<SkippedRoom>,
}

// Transport seam for the hotel endpoints
#[async_trait]
pub trait HotelSource: Send + Sync + 'static {
    // Raw JSON body of a hotels list page
    async fn get_page(&self, request: &PageRequest) -> Result<Value, ApiError>;

    // Raw JSON body of a single hotel-with-rooms entry
    async fn get_hotel(&self, hotel_id: &str) -> Result<Value, ApiError>;
}

/// `reqwest`-backed source for `GET {base}/hotel/hotels/`.
pub struct HttpSource {
    http: reqwest::Client,
    base_url: Url,
    hotels_url: Url,
}

impl HttpSource {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Self::with_client(http, &config.base_url)
    }

    /// Use a pre-built `reqwest::Client`, e.g. one shared with other services.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ConfigError> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::UnsupportedBaseUrl(base_url.to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let hotels_url = base_url.join(HOTELS_PATH)?;

        Ok(Self {
            http,
            base_url,
            hotels_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/hotel/hotels/?format=json&page={n}`
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.hotels_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("page", &page.to_string());
        url
    }

    /// Resolve a `next`/`previous` link and force `format=json`; the API
    /// hands out `format=api` links for its browsable renderer.
    pub fn link_url(&self, link: &str) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(link)
            .map_err(|e| ApiError::Contract(format!("invalid page link {link:?}: {e}")))?;

        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "format")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        pairs.insert(0, ("format".to_string(), "json".to_string()));
        url.query_pairs_mut().clear().extend_pairs(pairs);
        Ok(url)
    }

    /// `{base}/hotel/hotels/{id}/?format=json`, with `id` encoded as a
    /// single path segment.
    pub fn hotel_url(&self, hotel_id: &str) -> Result<Url, ApiError> {
        let mut url = self.hotels_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(hotel_id)
            .push("");
        url.query_pairs_mut().append_pair("format", "json");
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, ApiError> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;

        let status = resp.status();
        debug!(status = status.as_u16(), "response received");
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown status").to_string()
            } else {
                body
            };
            return Err(ApiError::Status {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ApiError::Contract(format!("response body is not JSON: {e}")))
    }
}

#[async_trait]
impl HotelSource for HttpSource {
    async fn get_page(&self, request: &PageRequest) -> Result<Value, ApiError> {
        let url = match request {
            PageRequest::Number(page) => self.page_url(*page),
            PageRequest::Link(link) => self.link_url(link)?,
        };
        self.get_json(url).await
    }

    async fn get_hotel(&self, hotel_id: &str) -> Result<Value, ApiError> {
        let url = self.hotel_url(hotel_id)?;
        self.get_json(url).await
    }
}

/// Check the `{count, next, previous, results}` envelope. A missing or
/// non-array `results` is a contract error, not a transport one.
pub fn parse_page(body: Value) -> Result<HotelsPage, ApiError> {
    let mut envelope = match body {
        Value::Object(envelope) => envelope,
        other => {
            return Err(ApiError::Contract(format!(
                "expected an object, got {}",
                json_type(&other)
            )))
        }
    };

    let results = match envelope.remove("results") {
        Some(Value::Array(results)) => results,
        Some(other) => {
            return Err(ApiError::Contract(format!(
                "expected results array, got {}",
                json_type(&other)
            )))
        }
        None => return Err(ApiError::Contract("missing results array".to_string())),
    };

    let link = |value: Option<&Value>| value.and_then(Value::as_str).map(str::to_string);
    Ok(HotelsPage {
        count: envelope.get("count").and_then(Value::as_u64).unwrap_or(0),
        next: link(envelope.get("next")),
        previous: link(envelope.get("previous")),
        results,
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Hotel listings client.
pub struct HotelClient<S = HttpSource> {
    source: S,
}

impl HotelClient<HttpSource> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(HttpSource::new(config)?))
    }
}

impl<S: HotelSource> HotelClient<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    async fn load(&self, request: &PageRequest) -> Result<HotelsPage, ApiError> {
        let page = parse_page(self.source.get_page(request).await?)?;
        debug!(
            entries = page.results.len(),
            count = page.count,
            has_next = page.next.is_some(),
            "hotels page loaded"
        );
        Ok(page)
    }

    /// Fetch one page and flatten every hotel/room pair on it.
    pub async fn fetch_page(&self, page: u32) -> Result<HotelPage, ApiError> {
        if page == 0 {
            return Err(ApiError::InvalidPage(page));
        }

        let raw = self.load(&PageRequest::Number(page)).await?;
        let flattened = flatten_entries(&raw.results).from_page(page);
        Ok(HotelPage {
            listings: flattened.listings,
            pagination: Pagination {
                count: raw.count,
                next: raw.next,
                previous: raw.previous,
            },
            skipped: flattened.skipped,
        })
    }

    /// Tonight's deals: discounted rooms per hotel, topped up from at most
    /// one extra page, capped at twelve.
    pub async fn fetch_deals(&self) -> Result<Listings, ApiError> {
        let first = self.load(&PageRequest::Number(FIRST_PAGE)).await?;
        let mut deals = select_from_entries(&first.results).from_page(FIRST_PAGE);
        debug!(selected = deals.len(), "deals selected from page 1");

        let wants_more = wants_next_page(deals.len(), first.next.is_some());
        match first.next {
            Some(next) if wants_more => {
                match self.load(&PageRequest::Link(next)).await {
                    Ok(second) => deals
                        .absorb(select_from_entries(&second.results).from_page(FIRST_PAGE + 1)),
                    // page 1 is still worth showing
                    Err(e) => warn!(error = %e, "could not fetch next page for deals"),
                }
            }
            _ => debug!(wants_more, "no extra page for deals"),
        }

        deals.listings.truncate(MAX_DEALS);
        Ok(deals)
    }

    /// Deals re-ranked by rating.
    pub async fn fetch_recommended(&self) -> Result<Listings, ApiError> {
        let deals = self.fetch_deals().await?;
        Ok(Listings {
            listings: rank_recommended(deals.listings),
            skipped: deals.skipped,
        })
    }

    /// Substring search over the first page of hotels.
    pub async fn search(&self, query: &str) -> Result<Listings, ApiError> {
        let page = self.fetch_page(FIRST_PAGE).await?;
        Ok(Listings {
            listings: search_listings(page.listings, query),
            skipped: page.skipped,
        })
    }

    /// First listing of a single hotel, `None` when it has no usable rooms.
    pub async fn fetch_hotel_details(
        &self,
        hotel_id: &str,
    ) -> Result<Option<NormalizedListing>, ApiError> {
        let entry = self.source.get_hotel(hotel_id).await?;
        Ok(flatten_entry(0, &entry).listings.into_iter().next())
    }

    pub async fn suggest_destinations(&self, query: &str) -> Result<Vec<Suggestion>, ApiError> {
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }
        let page = self.fetch_page(FIRST_PAGE).await?;
        Ok(suggest(&page.listings, query))
    }
}
