use serde::{Deserialize, Serialize};

/// A postal address as supplied per request. Fields may be incomplete;
/// the resolver degrades through its fallback chain accordingly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub postal_code: String,
    pub city: String,
    /// State name if the user supplied one (free text, any common spelling).
    #[serde(default)]
    pub state: Option<String>,
}

impl Address {
    pub fn new(street: &str, postal_code: &str, city: &str) -> Self {
        Self {
            street: street.to_string(),
            postal_code: postal_code.to_string(),
            city: city.to_string(),
            state: None,
        }
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }
}

/// Geographic coordinates in WGS84.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Point in (lon, lat) axis order, matching boundary file geometry.
    #[inline]
    pub fn to_point(&self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}
