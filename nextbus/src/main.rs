use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use nextbus::domain::{Agency, ReferenceTime, Route};
use nextbus::feed::{Feed, FeedConfig, FeedError, Transport};

const USAGE: &str = "\
Usage:
  nextbus                                   list agencies
  nextbus <agency>                          list routes
  nextbus <agency> <route>                  list directions and their stops
  nextbus <agency> <route> schedule         list scheduled runs
  nextbus <agency> <route> vehicles [ms]    list vehicle locations
  nextbus raw <command> [key=value ...]     dump a normalized response as JSON

Environment:
  NEXTBUS_BASE_URL   feed endpoint (defaults to the public NextBus feed)
  RUST_LOG           log filter, e.g. nextbus=debug";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let mut config = FeedConfig::new();
    if let Ok(url) = std::env::var("NEXTBUS_BASE_URL") {
        config = config.with_base_url(url);
    }

    let feed = match Feed::new(config) {
        Ok(feed) => feed,
        Err(e) => {
            eprintln!("Failed to create feed client: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&feed, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(message)) => {
            eprintln!("{message}\n\n{USAGE}");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Errors reported by the command line front end.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// Arguments do not match any command
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn run<T: Transport>(feed: &Feed<T>, args: &[String]) -> Result<(), CliError> {
    match args {
        [] => {
            for agency in feed.agencies()? {
                println!("{:<24} {}", agency.tag, agency);
            }
        }
        [raw, command, rest @ ..] if raw == "raw" => {
            let params = raw_params(command, rest)?;
            let nodes = feed.fetch_params(&params)?;
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        }
        [agency] => {
            for route in feed.routes(&agency_ref(agency))? {
                println!("{:<8} {}", route.tag, route);
            }
        }
        [agency, route] => {
            for direction in feed.directions(&route_ref(agency, route))? {
                println!("{direction} ({})", direction.title);
                for stop in &direction.stops {
                    println!("  {:<8} {}", stop.tag, stop.title);
                }
            }
        }
        [agency, route, action] if action == "schedule" => {
            for run in feed.schedule(&route_ref(agency, route))? {
                println!(
                    "{run} (block {}, {} {})",
                    run.block_id, run.service_class, run.schedule_class
                );
            }
        }
        [agency, route, action, rest @ ..] if action == "vehicles" && rest.len() <= 1 => {
            let time = reference_time(rest.first().map(String::as_str))?;
            let locations = feed.vehicle_locations(&route_ref(agency, route), time)?;
            for v in &locations.vehicles {
                println!(
                    "{:<8} {:>10.5} {:>11.5} {:<16} {}s ago",
                    v.id,
                    v.lat,
                    v.lon,
                    v.dir_tag.as_deref().unwrap_or("-"),
                    v.secs_since_report
                );
            }
            if let Some(last) = locations.last_time {
                println!("last time: {last}");
            }
        }
        _ => return Err(CliError::Usage("unrecognised arguments".to_string())),
    }

    Ok(())
}

/// Query parameters for `raw`: the command followed by `key=value` pairs.
fn raw_params<'a>(
    command: &str,
    pairs: &'a [String],
) -> Result<Vec<(&'a str, String)>, CliError> {
    let mut params = vec![("command", command.to_string())];
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| CliError::Usage(format!("expected key=value, got {pair:?}")))?;
        params.push((key, value.to_string()));
    }
    Ok(params)
}

/// Optional epoch-millisecond argument of `vehicles`.
fn reference_time(arg: Option<&str>) -> Result<ReferenceTime, CliError> {
    match arg {
        Some(ms) => ms
            .parse::<i64>()
            .map(ReferenceTime::from)
            .map_err(|_| CliError::Usage(format!("invalid reference time {ms:?}"))),
        None => Ok(ReferenceTime::Default),
    }
}

/// An agency known only by its tag.
fn agency_ref(tag: &str) -> Agency {
    Agency {
        tag: tag.to_string(),
        title: tag.to_string(),
        short_title: tag.to_string(),
        region_title: String::new(),
    }
}

/// A route known only by its agency and tag.
fn route_ref(agency: &str, tag: &str) -> Route {
    Route {
        agency: agency.to_string(),
        tag: tag.to_string(),
        title: tag.to_string(),
        short_title: tag.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nextbus::feed::MockTransport;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn raw_params_split_pairs() {
        let pairs = args(&["a=sf-muni", "r=N", "t=0"]);
        let params = raw_params("vehicleLocations", &pairs).unwrap();
        assert_eq!(
            params,
            [
                ("command", "vehicleLocations".to_string()),
                ("a", "sf-muni".to_string()),
                ("r", "N".to_string()),
                ("t", "0".to_string()),
            ]
        );
    }

    #[test]
    fn raw_pair_without_equals_is_a_usage_error() {
        let pairs = args(&["a"]);
        assert!(matches!(
            raw_params("routeList", &pairs),
            Err(CliError::Usage(message)) if message == "expected key=value, got \"a\""
        ));
    }

    #[test]
    fn reference_time_argument() {
        assert_eq!(reference_time(None).unwrap(), ReferenceTime::Default);
        assert_eq!(
            reference_time(Some("1393675200000")).unwrap(),
            ReferenceTime::EpochMillis(1_393_675_200_000)
        );
        assert!(matches!(
            reference_time(Some("soon")),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn unknown_arguments_are_a_usage_error() {
        let feed = Feed::with_transport(MockTransport::new());
        let err = run(&feed, &args(&["sf-muni", "N", "fares"])).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
        assert_eq!(err.to_string(), "unrecognised arguments");
    }

    #[test]
    fn feed_errors_pass_through() {
        let feed = Feed::with_transport(MockTransport::new());
        assert!(matches!(run(&feed, &[]), Err(CliError::Feed(_))));
    }
}
