//! Application configuration.

use serde::{Deserialize, Serialize};

use crate::Error;

/// API root used when none is configured at build time.
pub const DEFAULT_API_BASE_URL: &str = "https://mars-photos.herokuapp.com/api/v1";

/// API root baked in from `MARSVIEW_API_BASE_URL` when the crate was built.
pub const API_BASE_URL: &str = match option_env!("MARSVIEW_API_BASE_URL") {
    Some(url) => url,
    None => DEFAULT_API_BASE_URL,
};

/// Runtime settings of the application.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use marsview::Config;
///
/// let config = Config::from_json(r#"{ "default_rover": "perseverance" }"#)?;
/// assert_eq!(config.default_rover, "perseverance");
/// assert_eq!(config.root_id, "app");
/// # Ok::<(), marsview::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Id of the element the router mounts pages into.
    pub root_id: String,
    /// Root of the photos API.
    pub api_base_url: String,
    /// Number of photos the API returns per page. A shorter page is the last one.
    pub page_size: usize,
    /// Rover searched when the search page opens.
    pub default_rover: String,
    /// Sol searched when the search page opens, and the fallback for an
    /// unparsable sol.
    pub default_sol: u32,
    /// `tracing` filter directive used when installing logging.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_id: "app".into(),
            api_base_url: API_BASE_URL.into(),
            page_size: 25,
            default_rover: "curiosity".into(),
            default_sol: 1000,
            log_filter: "info".into(),
        }
    }
}

impl Config {
    /// Parses a JSON document, filling missing fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `json` is not a valid configuration
    /// document.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(Config::from_json("{}").expect("valid"), Config::default());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let error = Config::from_json(r#"{ "page_size": "many" }"#).expect_err("invalid");
        assert!(matches!(error, Error::Config(_)));
    }
}
