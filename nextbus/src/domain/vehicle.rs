//! Live vehicle positions.

use serde::Serialize;

/// A vehicle's last reported position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleLocation {
    pub id: String,
    pub route_tag: String,
    /// Direction the vehicle is serving, if it is assigned to one.
    pub dir_tag: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// Age of the report when the response was generated.
    pub secs_since_report: i64,
    /// Whether the vehicle's position can be used for predictions.
    pub predictable: bool,
    /// Heading in degrees, negative when unknown.
    pub heading: i64,
    pub speed_km_hr: Option<f64>,
}

/// Result of a vehicle location query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleLocations {
    pub vehicles: Vec<VehicleLocation>,
    /// Epoch milliseconds to pass as the next reference time.
    pub last_time: Option<i64>,
}
