//! Feed commands and their query parameters.

use crate::domain::ReferenceTime;

/// A request to the feed. Each command is one HTTP GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// All agencies served by the feed.
    AgencyList,
    /// Routes of one agency.
    RouteList { agency: &'a str },
    /// Stops, directions and paths of one route.
    RouteConfig { agency: &'a str, route: &'a str },
    /// Timetable of one route.
    Schedule { agency: &'a str, route: &'a str },
    /// Vehicles on one route that reported since `time`.
    VehicleLocations {
        agency: &'a str,
        route: &'a str,
        time: ReferenceTime,
    },
}

impl Command<'_> {
    /// Value of the `command` query parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AgencyList => "agencyList",
            Command::RouteList { .. } => "routeList",
            Command::RouteConfig { .. } => "routeConfig",
            Command::Schedule { .. } => "schedule",
            Command::VehicleLocations { .. } => "vehicleLocations",
        }
    }

    /// Query parameters, `command` first.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("command", self.name().to_string())];

        match *self {
            Command::AgencyList => {}
            Command::RouteList { agency } => {
                params.push(("a", agency.to_string()));
            }
            Command::RouteConfig { agency, route } | Command::Schedule { agency, route } => {
                params.push(("a", agency.to_string()));
                params.push(("r", route.to_string()));
            }
            Command::VehicleLocations {
                agency,
                route,
                time,
            } => {
                params.push(("a", agency.to_string()));
                params.push(("r", route.to_string()));
                params.push(("t", time.epoch_millis().to_string()));
            }
        }

        params
    }
}
