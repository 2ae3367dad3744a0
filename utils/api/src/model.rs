//! Response types of the photos endpoint.

use serde::{Deserialize, Serialize};

/// Body of a photos response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoResponse {
    /// Photos of the requested page.
    #[serde(default)]
    pub photos: Vec<Photo>,
}

/// One rover photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Catalog identifier.
    pub id: u64,
    /// Martian day the photo was taken on.
    pub sol: u32,
    /// Camera that took the photo.
    pub camera: Camera,
    /// Image URL.
    pub img_src: String,
    /// Earth date as `YYYY-MM-DD`.
    pub earth_date: String,
    /// Rover that took the photo.
    pub rover: Rover,
}

/// A rover camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    /// Catalog identifier.
    #[serde(default)]
    pub id: u64,
    /// Short name, such as `FHAZ`.
    pub name: String,
    /// Rover the camera is mounted on.
    #[serde(default)]
    pub rover_id: u64,
    /// Human-readable name.
    pub full_name: String,
}

/// A rover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rover {
    /// Catalog identifier.
    #[serde(default)]
    pub id: u64,
    /// Name, such as `Curiosity`.
    pub name: String,
    /// Landing date as `YYYY-MM-DD`.
    #[serde(default)]
    pub landing_date: String,
    /// Launch date as `YYYY-MM-DD`.
    #[serde(default)]
    pub launch_date: String,
    /// Mission status, such as `active`.
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_api_payload() {
        let body = r#"{
            "photos": [{
                "id": 102693,
                "sol": 1000,
                "camera": {"id": 20, "name": "FHAZ", "rover_id": 5, "full_name": "Front Hazard Avoidance Camera"},
                "img_src": "http://mars.jpl.nasa.gov/msl-raw-images/proj/msl/redops/ods/surface/sol/01000/opgs/edr/fcam/FRB_486265257EDR_F0481570FHAZ00323M_.JPG",
                "earth_date": "2015-05-30",
                "rover": {"id": 5, "name": "Curiosity", "landing_date": "2012-08-06", "launch_date": "2011-11-26", "status": "active"}
            }]
        }"#;
        let response: PhotoResponse = serde_json::from_str(body).expect("valid payload");
        let photo = &response.photos[0];
        assert_eq!(photo.id, 102_693);
        assert_eq!(photo.camera.full_name, "Front Hazard Avoidance Camera");
        assert_eq!(photo.rover.name, "Curiosity");
    }

    #[test]
    fn missing_photos_key_is_empty() {
        let response: PhotoResponse = serde_json::from_str("{}").expect("valid payload");
        assert!(response.photos.is_empty());
    }
}
