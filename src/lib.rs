// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Bicycle trip planning over a street network.
//!
//! Pedalroute loads streets and intersections of a region into a [Storage],
//! builds a weighted directed [Graph] out of them and runs A* to find paths
//! between waypoints. Waypoints may lie in the middle of a street, in which case
//! the street is split for the duration of a single query only. The found path
//! is then turned into human-readable [directions](Direction): stretches along
//! named streets, with turns, headings and short jogs folded in.
//!
//! # Example
//!
//! ```no_run
//! use pedalroute::{Router, RouterConfig, StoreGeocoder};
//!
//! let store = pedalroute::store::load_from_file(
//!     "path/to/streets.xml.gz",
//!     pedalroute::store::FileFormat::Unknown,
//! ).expect("failed to load the street network");
//!
//! let router = Router::new(store, RouterConfig::default()).expect("no streets to route over");
//! let geocoder = StoreGeocoder::new(router.store());
//!
//! let routes = router
//!     .plan(&geocoder, &["Main St & Oak Ave", "#42"])
//!     .expect("failed to find route");
//!
//! for direction in &routes[0].directions {
//!     println!("{}", direction);
//! }
//! ```

mod astar;
pub mod cost;
pub mod directions;
mod distance;
pub mod geometry;
mod graph;
mod kd;
mod lookup;
mod model;
mod route;
mod router;
mod session;
mod splitter;
pub mod store;

#[cfg(test)]
mod testing;

pub use astar::{
    find_path, CancelToken, Limits, LocalService, Path, PathService, SearchError, SearchRequest,
    DEFAULT_STEP_LIMIT,
};
pub use cost::{CostFunction, CostFunctionId, Heuristic, HeuristicId};
pub use directions::{synthesize, Direction, Heading, Itinerary, Jog, Turn};
pub use distance::earth_distance;
pub use geometry::{Point, Polyline, Srid};
pub use graph::{Edge, EdgeAttrs, Graph, Node};
pub use kd::KDTree;
pub use lookup::{Geocoder, Resolution, StoreGeocoder};
pub use model::{
    Intersection, LocatedObject, LocatedResult, NodeId, Oneway, RoadClass, Street, StreetId, StreetName,
};
pub use route::{Distance, Route};
pub use router::{
    InputError, RegionConfig, RouteError, Router, RouterConfig, DEFAULT_JOG_LENGTH,
};
pub use session::{Annex, Session};
pub use splitter::{attach, split_street, trim_street, Split};
pub use store::{MemoryStore, Storage, StorageError};
