//! Conversion from normalized feed nodes to domain types.
//!
//! Each function takes the children of the response's `<body>` element.
//! Unknown attributes are ignored; missing required attributes and
//! references to stops that are not in the response are errors.

use std::collections::HashMap;

use crate::domain::{
    Agency, Direction, Route, RouteConfig, Run, ScheduledStop, Stop, TimeError, VehicleLocation,
    VehicleLocations, parse_schedule_time,
};
use crate::xml::{Node, Value};

/// Error during node to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Expected element is absent from the response
    #[error("missing <{0}> element")]
    MissingElement(&'static str),

    /// Required attribute is absent
    #[error("<{element}> is missing required attribute {field}")]
    MissingField {
        element: String,
        field: &'static str,
    },

    /// Attribute is present but has the wrong type
    #[error("<{element}> attribute {field} has invalid value {value:?}")]
    InvalidField {
        element: String,
        field: &'static str,
        value: String,
    },

    /// A direction or schedule row references a stop not in the stop set
    #[error("route {route} references unknown stop {stop}")]
    UnknownStop { route: String, stop: String },

    /// Schedule cell is neither "--" nor HH:MM:SS
    #[error(transparent)]
    InvalidTime(#[from] TimeError),
}

/// Convert an `agencyList` response.
pub fn convert_agencies(nodes: &[Node]) -> Result<Vec<Agency>, ConversionError> {
    nodes
        .iter()
        .filter(|n| n.tag == "agency")
        .map(convert_agency)
        .collect()
}

fn convert_agency(node: &Node) -> Result<Agency, ConversionError> {
    let title = required_string(node, "title")?;

    Ok(Agency {
        tag: required_string(node, "tag")?,
        short_title: short_title(node, &title),
        region_title: required_string(node, "regionTitle")?,
        title,
    })
}

/// Convert a `routeList` response for the given agency.
pub fn convert_routes(nodes: &[Node], agency: &str) -> Result<Vec<Route>, ConversionError> {
    nodes
        .iter()
        .filter(|n| n.tag == "route")
        .map(|node| -> Result<Route, ConversionError> {
            let title = required_string(node, "title")?;
            Ok(Route {
                agency: agency.to_string(),
                tag: required_string(node, "tag")?,
                short_title: short_title(node, &title),
                title,
            })
        })
        .collect()
}

/// Convert the stops of a `routeConfig` response.
pub fn convert_stops(nodes: &[Node], route: &str) -> Result<Vec<Stop>, ConversionError> {
    config_node(nodes)?
        .children_tagged("stop")
        .map(|node| convert_stop(node, route))
        .collect()
}

/// Convert a `routeConfig` response into stops and directions.
///
/// Every stop a direction references must be among the response's stops.
pub fn convert_route_config(nodes: &[Node], route: &str) -> Result<RouteConfig, ConversionError> {
    let config = config_node(nodes)?;

    let stops = config
        .children_tagged("stop")
        .map(|node| convert_stop(node, route))
        .collect::<Result<Vec<_>, _>>()?;

    let by_tag = index_stops(&stops);

    let directions = config
        .children_tagged("direction")
        .map(|node| convert_direction(node, route, &by_tag))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RouteConfig { stops, directions })
}

/// `shortTitle`, falling back to the title when absent, empty or zero.
fn short_title(node: &Node, title: &str) -> String {
    match node.attr("shortTitle") {
        None | Some(Value::Int(0)) | Some(Value::Bool(false)) => title.to_string(),
        Some(Value::Float(f)) if *f == 0.0 => title.to_string(),
        Some(Value::Str(s)) if s.is_empty() => title.to_string(),
        Some(value) => value.to_string(),
    }
}

/// The route configuration is the first element of the body.
fn config_node(nodes: &[Node]) -> Result<&Node, ConversionError> {
    nodes.first().ok_or(ConversionError::MissingElement("route"))
}

fn convert_stop(node: &Node, route: &str) -> Result<Stop, ConversionError> {
    let title = required_string(node, "title")?;

    Ok(Stop {
        route: route.to_string(),
        tag: required_string(node, "tag")?,
        short_title: short_title(node, &title),
        lat: required_f64(node, "lat")?,
        lon: required_f64(node, "lon")?,
        stop_id: node.attr_string("stopId"),
        title,
    })
}

fn convert_direction(
    node: &Node,
    route: &str,
    stops: &HashMap<String, &Stop>,
) -> Result<Direction, ConversionError> {
    let stops = node
        .children
        .iter()
        .map(|reference| resolve_stop(reference, route, stops))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Direction {
        route: route.to_string(),
        tag: required_string(node, "tag")?,
        title: required_string(node, "title")?,
        name: required_string(node, "name")?,
        stops,
    })
}

/// Convert a `schedule` response, resolving stops against `stops`.
///
/// The body holds one `route` element per schedule block (usually one per
/// direction and service class). Every `tr` row of every block becomes a
/// [`Run`].
pub fn convert_schedule(
    nodes: &[Node],
    route: &str,
    stops: &[Stop],
) -> Result<Vec<Run>, ConversionError> {
    let by_tag = index_stops(stops);
    let mut runs = Vec::new();

    for block in nodes.iter().filter(|n| n.tag == "route") {
        let schedule_class = required_string(block, "scheduleClass")?;
        let service_class = required_string(block, "serviceClass")?;
        let direction = required_string(block, "direction")?;

        for row in block.children_tagged("tr") {
            let scheduled = row
                .children
                .iter()
                .map(|cell| -> Result<ScheduledStop, ConversionError> {
                    let stop = resolve_stop(cell, route, &by_tag)?;
                    let time = parse_schedule_time(cell.text.as_deref().unwrap_or_default())?;
                    Ok(ScheduledStop { stop, time })
                })
                .collect::<Result<Vec<_>, _>>()?;

            runs.push(Run {
                route: route.to_string(),
                stops: scheduled,
                schedule_class: schedule_class.clone(),
                service_class: service_class.clone(),
                direction: direction.clone(),
                block_id: required_string(row, "blockID")?,
            });
        }
    }

    Ok(runs)
}

/// Convert a `vehicleLocations` response.
pub fn convert_vehicle_locations(nodes: &[Node]) -> Result<VehicleLocations, ConversionError> {
    let vehicles = nodes
        .iter()
        .filter(|n| n.tag == "vehicle")
        .map(convert_vehicle)
        .collect::<Result<Vec<_>, _>>()?;

    let last_time = nodes
        .iter()
        .find(|n| n.tag == "lastTime")
        .and_then(|n| n.attr("time"))
        .and_then(|t| t.as_i64());

    Ok(VehicleLocations {
        vehicles,
        last_time,
    })
}

fn convert_vehicle(node: &Node) -> Result<VehicleLocation, ConversionError> {
    Ok(VehicleLocation {
        id: required_string(node, "id")?,
        route_tag: required_string(node, "routeTag")?,
        dir_tag: node.attr_string("dirTag"),
        lat: required_f64(node, "lat")?,
        lon: required_f64(node, "lon")?,
        secs_since_report: required_i64(node, "secsSinceReport")?,
        predictable: node
            .attr("predictable")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        heading: node.attr("heading").and_then(|v| v.as_i64()).unwrap_or(-1),
        speed_km_hr: node.attr_f64("speedKmHr"),
    })
}

/// Index stops by tag, keeping the first stop for a repeated tag.
fn index_stops(stops: &[Stop]) -> HashMap<String, &Stop> {
    let mut by_tag = HashMap::with_capacity(stops.len());
    for stop in stops {
        by_tag.entry(stop.tag.clone()).or_insert(stop);
    }
    by_tag
}

/// Look up the stop a `<stop tag="...">` reference points at.
fn resolve_stop(
    reference: &Node,
    route: &str,
    stops: &HashMap<String, &Stop>,
) -> Result<Stop, ConversionError> {
    let tag = required_string(reference, "tag")?;
    stops
        .get(&tag)
        .map(|stop| (*stop).clone())
        .ok_or_else(|| ConversionError::UnknownStop {
            route: route.to_string(),
            stop: tag,
        })
}

fn required_string(node: &Node, field: &'static str) -> Result<String, ConversionError> {
    node.attr_string(field)
        .ok_or_else(|| ConversionError::MissingField {
            element: node.tag.clone(),
            field,
        })
}

fn required_f64(node: &Node, field: &'static str) -> Result<f64, ConversionError> {
    let value = node.attr(field).ok_or_else(|| ConversionError::MissingField {
        element: node.tag.clone(),
        field,
    })?;
    value.as_f64().ok_or_else(|| ConversionError::InvalidField {
        element: node.tag.clone(),
        field,
        value: value.to_string(),
    })
}

fn required_i64(node: &Node, field: &'static str) -> Result<i64, ConversionError> {
    let value = node.attr(field).ok_or_else(|| ConversionError::MissingField {
        element: node.tag.clone(),
        field,
    })?;
    value.as_i64().ok_or_else(|| ConversionError::InvalidField {
        element: node.tag.clone(),
        field,
        value: value.to_string(),
    })
}
