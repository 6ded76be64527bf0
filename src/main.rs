#![deny(clippy::all)]
#![forbid(unsafe_code)]

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use structopt::StructOpt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use nav_query::magvar::FixedVariation;
use nav_query::time::FixedClock;
use nav_query::{nasr, Catalog, Dispatcher, Geod, Route, Value, Waypoint};

/// Observer position given as `LAT,LON[,ELEV_M]`.
struct Position(Geod);

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>().map_err(|e| format!("{}: {}", p, e)))
            .collect::<Result<Vec<_>, _>>()?;
        let geod = match parts.as_slice() {
            [lat, lon] => Geod::from_deg(*lat, *lon),
            [lat, lon, elev] => Geod::from_deg_m(*lat, *lon, *elev),
            _ => return Err("expected LAT,LON[,ELEV_M]".to_string()),
        };
        geod.map(Position).map_err(|e| e.to_string())
    }
}

#[derive(StructOpt)]
#[structopt(
    name = "nav_query",
    raw(setting = "structopt::clap::AppSettings::AllowNegativeNumbers")
)]
struct Args {
    /// NASR subscription archive
    #[structopt(name = "archive", parse(from_os_str))]
    archive: PathBuf,
    /// Only load data belonging to these ARTCCs, comma separated
    #[structopt(short = "f", long = "filter", raw(use_delimiter = "true", require_delimiter = "true"))]
    artcc_ids: Vec<String>,
    /// Observer position, LAT,LON[,ELEV_M]
    #[structopt(short = "p", long = "position", default_value = "0,0")]
    position: Position,
    /// Fixed Julian date instead of the system clock
    #[structopt(long = "jd")]
    jd: Option<f64>,
    /// Fixed magnetic variation instead of the dipole model
    #[structopt(long = "magvar")]
    magvar: Option<f64>,
    /// Flight plan as comma separated identifiers
    #[structopt(long = "route", raw(use_delimiter = "true", require_delimiter = "true"))]
    route: Vec<String>,
    /// Method to call on the result, e.g. `tower` or `getPlanSize`
    #[structopt(long = "then")]
    then: Option<String>,
    /// Function to call
    #[structopt(name = "function")]
    function: String,
    /// Function arguments; numbers and `nil` are converted
    #[structopt(name = "args")]
    args: Vec<String>,
}

fn to_value(arg: &str) -> Value {
    match arg {
        "nil" => Value::Nil,
        _ => arg.parse::<f64>().map(Value::Num).unwrap_or_else(|_| arg.into()),
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    tracing_subscriber::registry().with(env_filter).with(stderr_layer).init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let args = Args::from_args();

    let catalog = nasr::load_archive(&args.archive, &args.artcc_ids)?;

    let mut waypoints = Vec::new();
    for ident in &args.route {
        match catalog.find_by_ident(ident) {
            Some(entity) => waypoints.push(Waypoint::from_positioned(entity)),
            None => tracing::warn!(%ident, "unknown route waypoint, skipping"),
        }
    }
    let route = Route::new(waypoints);

    let observer = args.position.0;
    let mut dispatcher = Dispatcher::new(&catalog, &observer).with_route(&route);
    if let Some(jd) = args.jd {
        dispatcher = dispatcher.with_clock(FixedClock(jd));
    }
    if let Some(magvar) = args.magvar {
        dispatcher = dispatcher.with_magnetic_model(FixedVariation(magvar));
    }

    let call_args: Vec<Value> = args.args.iter().map(String::as_str).map(to_value).collect();
    let mut result = dispatcher.call(&args.function, &call_args)?;
    if let Some(method) = &args.then {
        result = dispatcher.call_method(&result, method, &[])?;
    }

    println!("{}", result);
    Ok(())
}
