// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::astar::{CancelToken, LocalService, PathService, SearchError, SearchRequest, DEFAULT_STEP_LIMIT};
use crate::cost::{CostFunctionId, HeuristicId};
use crate::directions::synthesize;
use crate::geometry::{distance_along, Polyline, Srid};
use crate::graph::Graph;
use crate::lookup::{Geocoder, Resolution};
use crate::model::{LocatedObject, LocatedResult};
use crate::route::{Distance, Route};
use crate::session::Session;
use crate::splitter::{attach, trim_street};
use crate::store::{Storage, StorageError};

/// Default length below which a differently named street is folded into
/// the surrounding direction as a jog.
pub const DEFAULT_JOG_LENGTH: f64 = 30.0;

/// Settings describing the street data of a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionConfig {
    /// Expected working projection of the street data.
    /// `None` accepts whatever the storage uses.
    pub srid: Option<Srid>,

    /// Streets shorter than this (in meters) may become jogs.
    pub jog_length: f64,

    /// Distance under which waypoints resolve to an intersection
    /// rather than a point in the middle of a street. Applied to the storage
    /// by [Router::new] and [Router::with_service].
    pub snap_tolerance: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            srid: None,
            jog_length: DEFAULT_JOG_LENGTH,
            snap_tolerance: crate::store::DEFAULT_SNAP_TOLERANCE,
        }
    }
}

/// Settings of a [Router].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterConfig {
    pub region: RegionConfig,
    pub cost_function: CostFunctionId,
    pub heuristic: HeuristicId,

    /// Time limit for a single path search.
    pub search_timeout: Option<Duration>,

    /// Maximum number of nodes expanded by a single path search.
    pub step_limit: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            region: RegionConfig::default(),
            cost_function: CostFunctionId::default(),
            heuristic: HeuristicId::default(),
            search_timeout: None,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

/// Malformed list of waypoints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("at least two waypoints are required, got {0}")]
    TooFewWaypoints(usize),

    #[error("waypoint {0} is blank")]
    BlankWaypoint(usize),
}

/// Error returned when a route can't be planned.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("{waypoint:?} not found")]
    NotFound { waypoint: String },

    #[error("{waypoint:?} matches {} places", .candidates.len())]
    MultipleMatches {
        waypoint: String,
        candidates: Vec<LocatedResult>,
    },

    #[error("no route from {from} to {to}")]
    NoRoute { from: String, to: String },

    /// The street graph has no edges. This is a configuration problem,
    /// retrying won't help.
    #[error("street graph is empty")]
    EmptyGraph,

    /// The storage uses a different projection than [RegionConfig::srid].
    #[error("storage uses srid {storage}, but the region expects srid {region}")]
    SridMismatch { storage: Srid, region: Srid },

    #[error("path search: {0}")]
    Search(SearchError),

    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("cancelled")]
    Cancelled,
}

impl RouteError {
    /// Checks if the failure was caused by the infrastructure,
    /// and trying again later might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Search(e) => e.is_retryable(),
            Self::Storage(e) => e.is_retryable(),
            _ => false,
        }
    }
}

fn build_graph<S: Storage + ?Sized>(store: &S) -> Result<Graph, RouteError> {
    let g = Graph::from_network(store.intersections()?, store.streets()?);
    if g.edge_count() == 0 {
        return Err(RouteError::EmptyGraph);
    }
    Ok(g)
}

/// Plans bicycle trips over a street network.
///
/// The router keeps a read-only [Graph] snapshot built from the storage, shared
/// by all queries. Every query works on its own [Session], so a router can be used
/// from many threads at once. [Router::refresh] replaces the snapshot without
/// disturbing queries already running against the previous one.
pub struct Router<S: Storage, P: PathService = LocalService> {
    store: S,
    service: P,
    config: RouterConfig,
    graph: RwLock<Arc<Graph>>,
}

impl<S: Storage> Router<S, LocalService> {
    /// Creates a router searching for paths in the calling thread.
    pub fn new(store: S, config: RouterConfig) -> Result<Self, RouteError> {
        let service = LocalService {
            step_limit: config.step_limit,
        };
        Self::with_service(store, service, config)
    }
}

impl<S: Storage, P: PathService> Router<S, P> {
    /// Creates a router delegating path searches to the provided [PathService].
    ///
    /// Fails with [RouteError::EmptyGraph] if the storage has no traversable streets,
    /// or with [RouteError::SridMismatch] if the storage doesn't use the projection
    /// expected by the region. The region's snap tolerance is applied to the storage.
    pub fn with_service(mut store: S, service: P, mut config: RouterConfig) -> Result<Self, RouteError> {
        match config.region.srid {
            Some(region) if region != store.srid() => {
                return Err(RouteError::SridMismatch {
                    storage: store.srid(),
                    region,
                })
            }
            _ => config.region.srid = Some(store.srid()),
        }
        store.set_snap_tolerance(config.region.snap_tolerance);

        let graph = build_graph(&store)?;
        log::info!(
            "street graph ready: {} nodes, {} edges",
            graph.len(),
            graph.edge_count()
        );

        Ok(Self {
            store,
            service,
            config,
            graph: RwLock::new(Arc::new(graph)),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Returns the current graph snapshot.
    pub fn snapshot(&self) -> Arc<Graph> {
        // The snapshot is never mutated in place, so a poisoned lock still holds a valid graph
        let guard = self.graph.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Rebuilds the graph snapshot from the storage.
    pub fn refresh(&self) -> Result<(), RouteError> {
        let g = Arc::new(build_graph(&self.store)?);
        log::info!("street graph refreshed: {} nodes, {} edges", g.len(), g.edge_count());

        let mut guard = self.graph.write().unwrap_or_else(|e| e.into_inner());
        *guard = g;
        Ok(())
    }

    /// Plans a trip through all `waypoints`, returning one [Route] for every
    /// consecutive pair.
    pub fn plan<G: Geocoder + ?Sized>(&self, geocoder: &G, waypoints: &[&str]) -> Result<Vec<Route>, RouteError> {
        if waypoints.len() < 2 {
            return Err(InputError::TooFewWaypoints(waypoints.len()).into());
        }
        if let Some(idx) = waypoints.iter().position(|w| w.trim().is_empty()) {
            return Err(InputError::BlankWaypoint(idx).into());
        }

        let located = waypoints
            .iter()
            .map(|&waypoint| match geocoder.resolve(waypoint)? {
                Resolution::Found(r) => Ok(r),
                Resolution::NotFound => Err(RouteError::NotFound {
                    waypoint: waypoint.to_string(),
                }),
                Resolution::Ambiguous(candidates) => Err(RouteError::MultipleMatches {
                    waypoint: waypoint.to_string(),
                    candidates,
                }),
            })
            .collect::<Result<Vec<_>, RouteError>>()?;

        located
            .windows(2)
            .map(|pair| self.route(&pair[0], &pair[1]))
            .collect()
    }

    /// Finds a route between two resolved waypoints.
    pub fn route(&self, start: &LocatedResult, end: &LocatedResult) -> Result<Route, RouteError> {
        self.route_with_cancel(start, end, &CancelToken::new())
    }

    /// Finds a route between two resolved waypoints, giving up as soon as
    /// `cancel` is triggered.
    pub fn route_with_cancel(
        &self,
        start: &LocatedResult,
        end: &LocatedResult,
        cancel: &CancelToken,
    ) -> Result<Route, RouteError> {
        cancel.check().map_err(|_| RouteError::Cancelled)?;

        if start.point.almost_eq(&end.point) {
            log::debug!("{:?} and {:?} are at the same point", start.name, end.name);
            return Ok(self.empty_route(start, end));
        }

        let graph = self.snapshot();
        let mut session = Session::new(&graph);

        let shortcut = match (&start.object, &end.object) {
            (LocatedObject::Street(a), LocatedObject::Street(b)) if a.id == b.id => {
                trim_street(&mut session, a, start.point, end.point)
            }
            _ => None,
        };

        let path = match shortcut {
            Some(path) => path,
            None => {
                let from = attach(&mut session, start);
                let to = attach(&mut session, end);
                if from == to {
                    return Ok(self.empty_route(start, end));
                }

                let request = SearchRequest {
                    start: from,
                    end: to,
                    cost_function: self.config.cost_function,
                    heuristic: self.config.heuristic,
                    timeout: self.config.search_timeout,
                };
                self.service
                    .find(&session, &request, cancel)
                    .map_err(|e| search_error(e, start, end))?
            }
        };

        cancel.check().map_err(|_| RouteError::Cancelled)?;
        let itinerary = synthesize(&self.store, session.annex().streets(), &path, &self.config.region)?;

        log::debug!(
            "route {:?} -> {:?}: {} directions, {}",
            start.name,
            end.name,
            itinerary.directions.len(),
            itinerary.distance,
        );

        Ok(Route {
            start: start.clone(),
            end: end.clone(),
            directions: itinerary.directions,
            geometry: itinerary.geometry,
            distance: itinerary.distance,
        })
    }

    /// Creates a route without any directions, for waypoints which are
    /// at the same place of the network.
    fn empty_route(&self, start: &LocatedResult, end: &LocatedResult) -> Route {
        let geometry = Polyline::segment(start.point, end.point);
        let distance = Distance::from_meters(distance_along(&geometry, self.store.srid()));
        Route {
            start: start.clone(),
            end: end.clone(),
            directions: Vec::new(),
            geometry,
            distance,
        }
    }
}

fn search_error(e: SearchError, start: &LocatedResult, end: &LocatedResult) -> RouteError {
    match e {
        SearchError::NoPath { .. } => RouteError::NoRoute {
            from: start.name.clone(),
            to: end.name.clone(),
        },
        SearchError::Cancelled => RouteError::Cancelled,
        e => RouteError::Search(e),
    }
}
