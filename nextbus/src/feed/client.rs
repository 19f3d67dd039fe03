//! NextBus feed HTTP client.
//!
//! Every method performs its request synchronously and blocks until the
//! response has been parsed. Nothing is cached and nothing is retried.

use std::time::Duration;

use tracing::{debug, trace};

use crate::domain::{
    Agency, Direction, ReferenceTime, Route, RouteConfig, Run, Stop, VehicleLocations,
};
use crate::xml::{Node, normalize, parse_document};

use super::command::Command;
use super::convert::{
    convert_agencies, convert_route_config, convert_routes, convert_schedule, convert_stops,
    convert_vehicle_locations,
};
use super::error::FeedError;

/// Default base URL for the public XML feed.
pub const DEFAULT_BASE_URL: &str = "http://webservices.nextbus.com/service/publicXMLFeed";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Feed endpoint (defaults to the public NextBus feed)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeedConfig {
    /// Create a config pointing at the public feed.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Performs one GET against the feed endpoint and returns the body.
pub trait Transport {
    /// Send a request with the given query parameters.
    fn get(&self, params: &[(&str, String)]) -> Result<String, FeedError>;
}

/// Blocking HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport with the given configuration.
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// The endpoint requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn get(&self, params: &[(&str, String)]) -> Result<String, FeedError> {
        let response = self.http.get(&self.base_url).query(params).send()?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text()?)
    }
}

/// NextBus feed client.
///
/// Raw methods return the normalized children of the response body; the
/// others map them to domain records.
#[derive(Debug, Clone)]
pub struct Feed<T = HttpTransport> {
    transport: T,
}

impl Feed<HttpTransport> {
    /// Create a client that talks to the configured endpoint over HTTP.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        Ok(Self {
            transport: HttpTransport::new(&config)?,
        })
    }
}

impl<T: Transport> Feed<T> {
    /// Create a client on top of any transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one command and return the normalized children of `<body>`.
    ///
    /// An error document from the feed is turned into [`FeedError::Feed`].
    pub fn fetch(&self, command: Command<'_>) -> Result<Vec<Node>, FeedError> {
        debug!(command = command.name(), "fetching feed");
        self.fetch_params(&command.params())
    }

    /// Send arbitrary query parameters and return the normalized children
    /// of `<body>`.
    pub fn fetch_params(&self, params: &[(&str, String)]) -> Result<Vec<Node>, FeedError> {
        let body = self.transport.get(params)?;
        let root = normalize(&parse_document(&body)?);

        check_feed_error(&root)?;

        trace!(
            elements = root.node_count(),
            children = root.children.len(),
            "normalized feed response"
        );

        Ok(root.children)
    }

    /// Raw `agencyList` response.
    pub fn agency_list(&self) -> Result<Vec<Node>, FeedError> {
        self.fetch(Command::AgencyList)
    }

    /// Raw `routeList` response.
    pub fn route_list(&self, agency: &str) -> Result<Vec<Node>, FeedError> {
        self.fetch(Command::RouteList { agency })
    }

    /// Raw `routeConfig` response.
    pub fn route_config_raw(&self, agency: &str, route: &str) -> Result<Vec<Node>, FeedError> {
        self.fetch(Command::RouteConfig { agency, route })
    }

    /// Raw `schedule` response.
    pub fn schedule_raw(&self, agency: &str, route: &str) -> Result<Vec<Node>, FeedError> {
        self.fetch(Command::Schedule { agency, route })
    }

    /// Raw `vehicleLocations` response.
    pub fn vehicle_locations_raw(
        &self,
        agency: &str,
        route: &str,
        time: impl Into<ReferenceTime>,
    ) -> Result<Vec<Node>, FeedError> {
        self.fetch(Command::VehicleLocations {
            agency,
            route,
            time: time.into(),
        })
    }

    /// All agencies, in feed order.
    pub fn agencies(&self) -> Result<Vec<Agency>, FeedError> {
        let agencies = convert_agencies(&self.agency_list()?)?;
        debug!(count = agencies.len(), "loaded agencies");
        Ok(agencies)
    }

    /// Routes operated by an agency.
    pub fn routes(&self, agency: &Agency) -> Result<Vec<Route>, FeedError> {
        let routes = convert_routes(&self.route_list(&agency.tag)?, &agency.tag)?;
        debug!(agency = %agency.tag, count = routes.len(), "loaded routes");
        Ok(routes)
    }

    /// Stops of a route.
    pub fn stops(&self, route: &Route) -> Result<Vec<Stop>, FeedError> {
        let nodes = self.route_config_raw(&route.agency, &route.tag)?;
        Ok(convert_stops(&nodes, &route.tag)?)
    }

    /// Directions of a route, each with its stops in travel order.
    pub fn directions(&self, route: &Route) -> Result<Vec<Direction>, FeedError> {
        Ok(self.route_config(route)?.directions)
    }

    /// Stops and directions of a route from a single request.
    pub fn route_config(&self, route: &Route) -> Result<RouteConfig, FeedError> {
        let nodes = self.route_config_raw(&route.agency, &route.tag)?;
        let config = convert_route_config(&nodes, &route.tag)?;
        debug!(
            route = %route.tag,
            stops = config.stops.len(),
            directions = config.directions.len(),
            "loaded route config"
        );
        Ok(config)
    }

    /// Scheduled runs of a route.
    ///
    /// Fetches the route's stops first, then the schedule. Use
    /// [`Feed::schedule_with_stops`] to reuse stops already fetched.
    pub fn schedule(&self, route: &Route) -> Result<Vec<Run>, FeedError> {
        let stops = self.stops(route)?;
        self.schedule_with_stops(route, &stops)
    }

    /// Scheduled runs of a route, resolving stop references against `stops`.
    pub fn schedule_with_stops(&self, route: &Route, stops: &[Stop]) -> Result<Vec<Run>, FeedError> {
        let nodes = self.schedule_raw(&route.agency, &route.tag)?;
        let runs = convert_schedule(&nodes, &route.tag, stops)?;
        debug!(route = %route.tag, runs = runs.len(), "loaded schedule");
        Ok(runs)
    }

    /// Vehicles on a route that reported since `time`.
    pub fn vehicle_locations(
        &self,
        route: &Route,
        time: impl Into<ReferenceTime>,
    ) -> Result<VehicleLocations, FeedError> {
        let nodes = self.vehicle_locations_raw(&route.agency, &route.tag, time)?;
        Ok(convert_vehicle_locations(&nodes)?)
    }
}

/// The feed reports bad requests as `<body><Error shouldRetry="...">`.
fn check_feed_error(root: &Node) -> Result<(), FeedError> {
    match root.children_tagged("Error").next() {
        Some(error) => Err(FeedError::Feed {
            message: error.text.as_deref().unwrap_or_default().trim().to_string(),
            should_retry: error
                .attr("shouldRetry")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        }),
        None => Ok(()),
    }
}
