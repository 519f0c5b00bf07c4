use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use pedalroute;

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct NetworkLoadError(PathBuf, #[source] pedalroute::StorageError);

#[derive(Parser)]
struct Cli {
    /// The path to the street network file (.xml, .xml.gz or .xml.bz2)
    network: PathBuf,

    /// Waypoints of the trip: "x,y" coordinates, "#id" intersections
    /// or "Street & Street" cross streets
    #[arg(required = true, num_args = 2..)]
    waypoints: Vec<String>,

    /// Cost function: "base", "bicycle" or "safe-bicycle"
    #[arg(long, default_value = "bicycle")]
    cost: pedalroute::CostFunctionId,

    /// Reference system of coordinate waypoints, defaults to the one of the network
    #[arg(long)]
    input_srid: Option<u32>,

    /// Streets shorter than this are folded into the surrounding directions
    #[arg(long, default_value_t = pedalroute::DEFAULT_JOG_LENGTH)]
    jog_length: f64,

    /// Waypoints closer than this to an intersection start or end at the intersection
    #[arg(long, default_value_t = pedalroute::store::DEFAULT_SNAP_TOLERANCE)]
    snap_tolerance: f64,

    /// Print the route as GeoJSON instead of directions
    #[arg(long)]
    geojson: bool,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let store = pedalroute::store::load_from_file(&cli.network, pedalroute::store::FileFormat::Unknown)
        .map_err(|e| NetworkLoadError(cli.network.clone(), e))?;

    let config = pedalroute::RouterConfig {
        region: pedalroute::RegionConfig {
            jog_length: cli.jog_length,
            snap_tolerance: cli.snap_tolerance,
            ..Default::default()
        },
        cost_function: cli.cost,
        ..Default::default()
    };
    let router = pedalroute::Router::new(store, config)?;

    let geocoder = match cli.input_srid {
        Some(code) => {
            let srid = pedalroute::Srid::from_code(code).ok_or_else(|| format!("unknown srid: {}", code))?;
            pedalroute::StoreGeocoder::with_input_srid(router.store(), srid)?
        }
        None => pedalroute::StoreGeocoder::new(router.store()),
    };

    let waypoints: Vec<&str> = cli.waypoints.iter().map(String::as_str).collect();
    let routes = router.plan(&geocoder, &waypoints)?;

    if cli.geojson {
        print_geojson(&routes);
    } else {
        print_directions(&routes);
    }

    Ok(())
}

fn print_directions(routes: &[pedalroute::Route]) {
    let mut total = pedalroute::Distance::default();
    for (leg, route) in routes.iter().enumerate() {
        println!("{}. {} -> {}", leg + 1, route.start.name, route.end.name);
        for (i, direction) in route.directions.iter().enumerate() {
            println!("  {}. {}", i + 1, direction);
            for jog in &direction.jogs {
                let name = jog.street.as_ref().map(|n| n.to_string()).unwrap_or_default();
                println!("     jog {} via {} ({:.0} m)", jog.turn, name, jog.distance);
            }
        }
        println!("  total: {}", route.distance);
        total = total + route.distance;
    }

    if routes.len() > 1 {
        println!(
            "trip: {:.2} km, {:.2} mi",
            total.kilometers, total.miles
        );
    }
}

fn print_geojson(routes: &[pedalroute::Route]) {
    println!("{:#}", geojson(routes));
}

fn geojson(routes: &[pedalroute::Route]) -> serde_json::Value {
    let features: Vec<serde_json::Value> = routes
        .iter()
        .map(|route| {
            let coordinates: Vec<[f64; 2]> = route.geometry.points().iter().map(|p| [p.x, p.y]).collect();
            serde_json::json!({
                "type": "Feature",
                "properties": {
                    "start": route.start.name,
                    "end": route.end.name,
                    "meters": route.distance.meters
                },
                "geometry": {
                    "type": "LineString",
                    "coordinates": coordinates
                }
            })
        })
        .collect();

    serde_json::json!({
        "type": "FeatureCollection",
        "features": features
    })
}
