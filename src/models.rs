use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A point in decimal degrees.
///
/// Range is not enforced here, see [`Coordinate::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

// "lat,lng" with the shortest representation that round-trips, no rounding.
impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteQuery {
    pub origin: Coordinate,
    pub destination: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EncodedPolyline {
    pub points: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    #[serde(rename = "overview_polyline")]
    pub polyline: EncodedPolyline,
}

/// The part of a directions response the route decoding depends on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl DirectionsResponse {
    /// Returns the status when the service refused to process the request.
    /// `ZERO_RESULTS` and `NOT_FOUND` are answers, not refusals.
    pub fn rejection(&self) -> Option<&str> {
        match self.status.as_deref() {
            None | Some("OK") | Some("ZERO_RESULTS") | Some("NOT_FOUND") => None,
            Some(status) => Some(status),
        }
    }
}

/// Ordered points of a route, index 0 is the start.
pub type DecodedPath = Vec<Coordinate>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    #[default]
    Idle,
    Fetching,
    Succeeded,
    NoRoute,
    Failed,
    NoOrigin,
}
