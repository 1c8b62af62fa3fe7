//! Unsplash photo source.
//!
//! Fetches a random photo matching a search term and orientation from the
//! Unsplash API and downloads image bytes.

use std::future::Future;
use std::time::Duration;

use rand::seq::IndexedRandom;
use reqwest::header::AUTHORIZATION;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::wallpaper::geometry::AspectClass;

/// Base URL of the Unsplash API.
pub const API_BASE_URL: &str = "https://api.unsplash.com";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Longest error body kept in [`PhotoSourceError::HttpStatus`].
const MAX_ERROR_BODY: usize = 512;

/// Errors returned by a photo source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoSourceError {
    #[error("No search term configured")]
    NoQuery,

    #[error("No Unsplash access key configured")]
    NoAuth,

    #[error("Unsplash returned HTTP {code}: {body}")]
    HttpStatus { code: u16, body: String },

    #[error("Failed to parse Unsplash response: {0}")]
    ParseFailure(String),

    #[error("Unsplash returned no data")]
    NoData,

    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for PhotoSourceError {
    fn from(err: reqwest::Error) -> Self { Self::Network(err.to_string()) }
}

/// Metadata of one photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    /// Original image URL, parameterized by [`Photo::full_image_url`].
    pub raw_url: String,
    pub thumb_url: String,
    pub photographer: String,
    pub photographer_url: String,
}

impl Photo {
    /// Builds the download URL for a `width`-pixel JPEG at `quality`.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoSourceError::ParseFailure`] if the raw URL is invalid.
    pub fn full_image_url(&self, width: u32, quality: u8) -> Result<String, PhotoSourceError> {
        let mut url = Url::parse(&self.raw_url)
            .map_err(|e| PhotoSourceError::ParseFailure(format!("invalid raw url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("w", &width.to_string())
            .append_pair("q", &quality.min(100).to_string())
            .append_pair("fm", "jpg");
        Ok(url.into())
    }

    /// Attribution line shown to the user.
    #[must_use]
    pub fn credit(&self) -> String { format!("📷 {} on Unsplash", self.photographer) }
}

/// Something that can supply photos and their bytes.
///
/// Implementations must be cheap to share across tasks.
pub trait PhotoSource: Send + Sync + 'static {
    /// Fetches metadata of one photo matching `query` and `aspect`.
    fn fetch_one(
        &self,
        query: &str,
        aspect: AspectClass,
    ) -> impl Future<Output = Result<Photo, PhotoSourceError>> + Send;

    /// Downloads the bytes behind `url`.
    fn download(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, PhotoSourceError>> + Send;
}

/// Picks a random non-empty search term.
#[must_use]
pub fn choose_search_term(terms: &[String]) -> Option<&str> {
    let candidates: Vec<&str> =
        terms.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
    candidates.choose(&mut rand::rng()).copied()
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiPhoto {
    id: String,
    urls: ApiUrls,
    user: ApiUser,
}

#[derive(Debug, Deserialize)]
struct ApiUrls {
    raw: String,
    thumb: Option<String>,
    small: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    name: String,
    links: ApiUserLinks,
}

#[derive(Debug, Deserialize)]
struct ApiUserLinks {
    html: String,
}

/// Parses a `/photos/random` response body.
///
/// # Errors
///
/// Returns [`PhotoSourceError::NoData`] for an empty body and
/// [`PhotoSourceError::ParseFailure`] when required fields are missing.
pub fn parse_photo(body: &[u8]) -> Result<Photo, PhotoSourceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(PhotoSourceError::NoData);
    }

    let api: ApiPhoto =
        serde_json::from_slice(body).map_err(|e| PhotoSourceError::ParseFailure(e.to_string()))?;

    let thumb_url = api
        .urls
        .thumb
        .or(api.urls.small)
        .ok_or_else(|| PhotoSourceError::ParseFailure("missing thumbnail url".to_string()))?;

    Ok(Photo {
        id: api.id,
        raw_url: api.urls.raw,
        thumb_url,
        photographer: api.user.name,
        photographer_url: api.user.links.html,
    })
}

/// Builds the `/photos/random` request URL.
///
/// # Errors
///
/// Returns [`PhotoSourceError::ParseFailure`] if `base` is not a valid URL.
pub fn random_photo_url(
    base: &str,
    query: &str,
    aspect: AspectClass,
) -> Result<Url, PhotoSourceError> {
    Url::parse_with_params(
        &format!("{}/photos/random", base.trim_end_matches('/')),
        &[
            ("query", query),
            ("orientation", aspect.orientation_param()),
            ("content_filter", "high"),
        ],
    )
    .map_err(|e| PhotoSourceError::ParseFailure(format!("invalid api url: {e}")))
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the Unsplash API.
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    http: reqwest::Client,
    access_key: String,
    base_url: String,
}

impl UnsplashClient {
    /// Creates a client authenticating with `access_key`.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoSourceError::Network`] if the HTTP client cannot be built.
    pub fn new(access_key: impl Into<String>) -> Result<Self, PhotoSourceError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("wallspan/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            access_key: access_key.into(),
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Points the client at a different API host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_bytes(&self, url: Url, authorize: bool) -> Result<Vec<u8>, PhotoSourceError> {
        let mut request = self.http.get(url);
        if authorize {
            request = request
                .header(AUTHORIZATION, format!("Client-ID {}", self.access_key.trim()))
                .header("Accept-Version", "v1");
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            let text = String::from_utf8_lossy(&body);
            return Err(PhotoSourceError::HttpStatus {
                code: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        Ok(body.to_vec())
    }
}

impl PhotoSource for UnsplashClient {
    async fn fetch_one(&self, query: &str, aspect: AspectClass) -> Result<Photo, PhotoSourceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PhotoSourceError::NoQuery);
        }
        if self.access_key.trim().is_empty() {
            return Err(PhotoSourceError::NoAuth);
        }

        let url = random_photo_url(&self.base_url, query, aspect)?;
        tracing::debug!(query, orientation = aspect.orientation_param(), "Requesting random photo");

        let body = self.get_bytes(url, true).await?;
        parse_photo(&body)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, PhotoSourceError> {
        let url = Url::parse(url)
            .map_err(|e| PhotoSourceError::ParseFailure(format!("invalid image url: {e}")))?;
        let bytes = self.get_bytes(url, false).await?;
        if bytes.is_empty() {
            return Err(PhotoSourceError::NoData);
        }
        Ok(bytes)
    }
}
