//! Routes operated by an agency.

use std::fmt;

use serde::Serialize;

use super::{Direction, Stop};

/// A single bus or train line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Tag of the operating agency.
    pub agency: String,
    pub tag: String,
    pub title: String,
    /// Falls back to `title` when the feed gives none.
    pub short_title: String,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Route: {}", self.title)
    }
}

/// Stops and directions of a route, built from one route configuration
/// response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteConfig {
    pub stops: Vec<Stop>,
    pub directions: Vec<Direction>,
}

impl RouteConfig {
    /// Find a stop by tag.
    pub fn stop(&self, tag: &str) -> Option<&Stop> {
        self.stops.iter().find(|s| s.tag == tag)
    }
}
