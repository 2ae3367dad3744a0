use futures::{FutureExt, future::LocalBoxFuture};

use crate::{ApiError, Photo, PhotoQuery, PhotoResponse};

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Performs `GET` requests.
///
/// Implementations report transport failures as [`ApiError::Transport`]
/// and hand back every response, whatever its status.
pub trait HttpClient {
    /// Fetches `url`.
    fn get(&self, url: &str) -> LocalBoxFuture<'static, Result<HttpResponse, ApiError>>;
}

/// Anything able to answer a [`PhotoQuery`].
pub trait PhotoSource {
    /// Fetches the photos matching `query`.
    fn fetch_photos(&self, query: &PhotoQuery) -> LocalBoxFuture<'static, Result<Vec<Photo>, ApiError>>;
}

/// The photos API, reached through an [`HttpClient`].
#[derive(Debug, Clone)]
pub struct MarsApi<H> {
    base_url: String,
    client: H,
}

impl<H: HttpClient> MarsApi<H> {
    /// Creates a client for the API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>, client: H) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Returns the API root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl<H: HttpClient> PhotoSource for MarsApi<H> {
    fn fetch_photos(&self, query: &PhotoQuery) -> LocalBoxFuture<'static, Result<Vec<Photo>, ApiError>> {
        let url = query.url(&self.base_url);
        tracing::debug!(url = url.as_str(), "fetching photos");
        let request = self.client.get(&url);
        async move {
            let response = request.await?;
            if !response.is_success() {
                tracing::warn!(status = response.status, url = url.as_str(), "photo request failed");
                return Err(ApiError::Status {
                    status: response.status,
                });
            }
            let body: PhotoResponse = serde_json::from_str(&response.body)?;
            Ok(body.photos)
        }
        .boxed_local()
    }
}
