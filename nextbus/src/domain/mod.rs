//! Domain types for the NextBus feed.
//!
//! Records are immutable snapshots built once from a fetched response. They
//! hold no reference to the response or the client, so expanding a record
//! (a route's stops, say) means fetching again.

mod agency;
mod route;
mod run;
mod stop;
mod time;
mod vehicle;

pub use agency::Agency;
pub use route::{Route, RouteConfig};
pub use run::{Run, ScheduledStop};
pub use stop::{Direction, Stop};
pub use time::{NO_TIME, ReferenceTime, TimeError, parse_schedule_time};
pub use vehicle::{VehicleLocation, VehicleLocations};
