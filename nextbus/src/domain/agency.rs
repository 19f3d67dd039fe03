//! Transit agencies.

use std::fmt;

use serde::Serialize;

/// A transit operator publishing one or more routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agency {
    /// Feed identifier, e.g. "sf-muni".
    pub tag: String,
    pub title: String,
    /// Falls back to `title` when the feed gives none.
    pub short_title: String,
    pub region_title: String,
}

impl fmt::Display for Agency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Agency: {}", self.title)
    }
}
