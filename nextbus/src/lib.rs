//! Client for the NextBus public transit XML feed.
//!
//! Responses are parsed into a typed attribute tree ([`xml::Node`]) and
//! mapped into agencies, routes, stops, directions, scheduled runs and
//! vehicle locations.
//!
//! ```no_run
//! use nextbus::feed::{Feed, FeedConfig};
//!
//! let feed = Feed::new(FeedConfig::new())?;
//! for agency in feed.agencies()? {
//!     println!("{agency}");
//! }
//! # Ok::<(), nextbus::feed::FeedError>(())
//! ```

pub mod domain;
pub mod feed;
pub mod xml;
