//! `window.fetch` as an [`HttpClient`].

use futures::{FutureExt, future::LocalBoxFuture};
use marsview_api::{ApiError, HttpClient, HttpResponse};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, Window};

use crate::error::js_message;

/// HTTP client issuing `GET` requests through the Fetch API.
#[derive(Debug, Clone)]
pub struct FetchClient {
    window: Window,
}

impl FetchClient {
    /// Fetches through `window`.
    #[must_use]
    pub const fn new(window: Window) -> Self {
        Self { window }
    }
}

fn transport(error: &JsValue) -> ApiError {
    ApiError::transport(js_message(error))
}

impl HttpClient for FetchClient {
    fn get(&self, url: &str) -> LocalBoxFuture<'static, Result<HttpResponse, ApiError>> {
        let request = self.window.fetch_with_str(url);
        let url = url.to_owned();
        async move {
            let response: Response = JsFuture::from(request)
                .await
                .and_then(JsCast::dyn_into)
                .map_err(|error| transport(&error))?;
            let status = response.status();
            let text = response.text().map_err(|error| transport(&error))?;
            let body = JsFuture::from(text)
                .await
                .map_err(|error| transport(&error))?
                .as_string()
                .unwrap_or_default();
            tracing::debug!(url = url.as_str(), status, bytes = body.len(), "fetched");
            Ok(HttpResponse::new(status, body))
        }
        .boxed_local()
    }
}
