//! Stops and directions of travel.

use std::fmt;

use serde::Serialize;

/// A physical location served by a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    /// Tag of the route this stop was fetched for.
    pub route: String,
    pub tag: String,
    pub title: String,
    /// Falls back to `title` when the feed gives none.
    pub short_title: String,
    pub lat: f64,
    pub lon: f64,
    /// Public stop number, when the agency publishes one.
    pub stop_id: Option<String>,
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stop: {} on {}", self.title, self.tag)
    }
}

/// One ordered path of travel along a route, such as inbound or outbound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Direction {
    pub route: String,
    pub tag: String,
    pub title: String,
    pub name: String,
    /// Stops in travel order.
    pub stops: Vec<Stop>,
}

impl Direction {
    /// Tags of the stops in travel order.
    pub fn stop_tags(&self) -> impl Iterator<Item = &str> {
        self.stops.iter().map(|s| s.tag.as_str())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Direction: {} on {}", self.name, self.route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(tag: &str) -> Stop {
        Stop {
            route: "N".into(),
            tag: tag.into(),
            title: format!("Stop {tag}"),
            short_title: format!("Stop {tag}"),
            lat: 37.7,
            lon: -122.4,
            stop_id: None,
        }
    }

    #[test]
    fn display() {
        assert_eq!(stop("S1").to_string(), "Stop: Stop S1 on S1");

        let direction = Direction {
            route: "N".into(),
            tag: "N__I_F00".into(),
            title: "Inbound to Caltrain".into(),
            name: "Inbound".into(),
            stops: vec![stop("S1"), stop("S2")],
        };
        assert_eq!(direction.to_string(), "Direction: Inbound on N");
        assert_eq!(direction.stop_tags().collect::<Vec<_>>(), ["S1", "S2"]);
    }
}
