//! Scheduled runs.

use std::fmt;

use chrono::NaiveTime;
use serde::Serialize;

use super::Stop;

/// A stop on a run, with its scheduled time if the run serves it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledStop {
    pub stop: Stop,
    /// Wall-clock time with no date or timezone. `None` when the schedule
    /// shows no time for this stop.
    pub time: Option<NaiveTime>,
}

/// One scheduled trip along a route in a given direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub route: String,
    /// Stops in schedule column order.
    pub stops: Vec<ScheduledStop>,
    /// Schedule version, e.g. "2013T_FALL".
    pub schedule_class: String,
    /// Service day class, e.g. "wkd", "sat" or "sun".
    pub service_class: String,
    /// Direction name as given by the schedule, e.g. "Inbound".
    pub direction: String,
    pub block_id: String,
}

impl Run {
    /// The first scheduled time on this run.
    pub fn first_time(&self) -> Option<NaiveTime> {
        self.stops.iter().find_map(|s| s.time)
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Run: {} heading {} at ", self.route, self.direction)?;
        match self.stops.first().and_then(|s| s.time) {
            Some(time) => write!(f, "{time}"),
            None => f.write_str("--"),
        }
    }
}
