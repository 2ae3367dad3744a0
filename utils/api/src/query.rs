use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// Parameters of one photos request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[must_use]
pub struct PhotoQuery {
    /// Rover name. Matched case-insensitively by the server.
    pub rover: String,
    /// Martian day.
    pub sol: u32,
    /// Camera short name; `None` for every camera.
    pub camera: Option<String>,
    /// One-based page number.
    pub page: u32,
}

impl PhotoQuery {
    /// Queries the first page of every camera of `rover` on `sol`.
    pub fn new(rover: impl Into<String>, sol: u32) -> Self {
        Self {
            rover: rover.into(),
            sol,
            camera: None,
            page: 1,
        }
    }

    /// Restricts the query to one camera. An empty name clears the filter.
    pub fn camera(mut self, camera: impl Into<String>) -> Self {
        let camera = camera.into();
        self.camera = (!camera.trim().is_empty()).then_some(camera);
        self
    }

    /// Selects the page. Page numbers start at 1; 0 is treated as 1.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Builds the request URL against `base`.
    ///
    /// ```
    /// use marsview_api::PhotoQuery;
    ///
    /// let url = PhotoQuery::new("Curiosity", 1000).camera("FHAZ").page(2).url("https://api.example/");
    /// assert_eq!(url, "https://api.example/rovers/curiosity/photos?sol=1000&page=2&camera=FHAZ");
    /// ```
    #[must_use]
    pub fn url(&self, base: &str) -> String {
        let mut url = format!(
            "{}/rovers/{}/photos?sol={}&page={}",
            base.trim_end_matches('/'),
            self.rover.trim().to_lowercase(),
            self.sol,
            self.page
        );
        if let Some(camera) = &self.camera {
            let _ = write!(url, "&camera={camera}");
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_without_camera() {
        assert_eq!(
            PhotoQuery::new("curiosity", 1000).url("/api"),
            "/api/rovers/curiosity/photos?sol=1000&page=1"
        );
    }

    #[test]
    fn blank_camera_means_all_cameras() {
        let query = PhotoQuery::new("spirit", 3).camera("  ");
        assert_eq!(query.camera, None);
        assert!(!query.url("").contains("camera"));
    }

    #[test]
    fn page_zero_is_clamped() {
        assert_eq!(PhotoQuery::new("opportunity", 1).page(0).page, 1);
    }
}
