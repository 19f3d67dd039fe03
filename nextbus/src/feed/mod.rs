//! NextBus public XML feed client.
//!
//! This module issues commands against the feed endpoint, normalizes the
//! XML responses and maps them into domain records.
//!
//! Key characteristics of the feed:
//! - One fixed endpoint; the `command` query parameter selects the request
//! - Errors in request parameters come back as HTTP 200 with an `<Error>`
//!   element in the body
//! - Schedule times are "HH:MM:SS" wall-clock strings, "--" when a run
//!   does not serve a stop

mod client;
mod command;
mod convert;
mod error;
mod mock;



pub use client::{DEFAULT_BASE_URL, Feed, FeedConfig, HttpTransport, Transport};
pub use command::Command;
pub use convert::{
    ConversionError, convert_agencies, convert_route_config, convert_routes, convert_schedule,
    convert_stops, convert_vehicle_locations,
};
pub use error::FeedError;
pub use mock::{MockTransport, Request};
