//! Lane routing trait and default Dijkstra implementation.
//!
//! A route is a sequence of lane-graph edges.  Walking it in canonical travel
//! direction (right lanes toward increasing `s`, left lanes toward decreasing
//! `s`) visits the lanes of [`LanePath::lanes`] in order.  The junction
//! choices along the way can be handed to the path queries as
//! [`PreferredConnections`] so they follow the same branch.
//!
//! # Cost units
//!
//! Costs are integer millimetres internally; [`LanePath::total_length_m`]
//! is the sum of every lane left behind, i.e. the length of all lanes on the
//! path except the destination.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use od_core::{EdgeId, LaneId, NodeId};

use crate::graph::RoadGraph;
use crate::model::{ContactPoint, LaneSide};
use crate::network::RoadNetwork;
use crate::prefs::PreferredConnections;
use crate::{RouteError, RouteResult};

// ── LanePath ──────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
pub struct LanePath {
    /// Lane the route starts on.
    pub origin: LaneId,
    /// Edges to traverse in order.
    pub edges: Vec<EdgeId>,
    /// Metres driven before entering the destination lane.
    pub total_length_m: f64,
}

impl LanePath {
    /// `true` if origin and destination are the same lane.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// Every lane on the path, origin first.
    pub fn lanes(&self, graph: &RoadGraph) -> Vec<LaneId> {
        std::iter::once(self.origin)
            .chain(self.edges.iter().map(|&e| graph.edge_target_lane(e)))
            .collect()
    }

    /// Junction connections the path passes through, as query preferences.
    pub fn to_preferred_connections(&self, graph: &RoadGraph) -> PreferredConnections {
        let mut prefs = PreferredConnections::new();
        for &e in &self.edges {
            if let Some(connection) = graph.edge_connection[e.index()] {
                prefs.push_connection(connection);
            }
        }
        prefs
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable lane router.
///
/// Implementations must be `Send + Sync` so one router can be shared by
/// worker threads.
pub trait Router: Send + Sync {
    /// Compute a route from lane `from` to lane `to`, travelling each lane in
    /// its canonical direction.  `from == to` is an empty route.
    fn route(&self, network: &RoadNetwork, from: LaneId, to: LaneId) -> RouteResult<LanePath>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Dijkstra over the CSR lane graph, weighted by lane length.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, network: &RoadNetwork, from: LaneId, to: LaneId) -> RouteResult<LanePath> {
        for lane in [from, to] {
            if network.get_lane(lane).is_none() {
                return Err(RouteError::LaneNotFound(lane));
            }
        }
        dijkstra(network, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Node through which canonical travel leaves `lane`.
fn canonical_exit(network: &RoadNetwork, lane: LaneId) -> NodeId {
    let exit = match network.lane(lane).side() {
        LaneSide::Right => ContactPoint::End,
        LaneSide::Left => ContactPoint::Start,
    };
    RoadGraph::node(lane, exit)
}

#[inline]
fn edge_cost_mm(graph: &RoadGraph, edge: EdgeId) -> u64 {
    (graph.edge_length_m[edge.index()] * 1000.0).round() as u64
}

fn dijkstra(network: &RoadNetwork, from: LaneId, to: LaneId) -> RouteResult<LanePath> {
    if from == to {
        return Ok(LanePath { origin: from, edges: vec![], total_length_m: 0.0 });
    }

    let graph = &network.graph;
    let n = graph.node_count();
    let mut dist = vec![u64::MAX; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];

    let start = canonical_exit(network, from);
    dist[start.index()] = 0;

    // Secondary key NodeId keeps tie-breaking deterministic.
    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, start)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if RoadGraph::node_lane(node) == to {
            return Ok(reconstruct(graph, &prev_edge, from, node, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_to[edge.index()];
            let new_cost = cost.saturating_add(edge_cost_mm(graph, edge));
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    Err(RouteError::NoRoute { from, to })
}

fn reconstruct(
    graph: &RoadGraph,
    prev_edge: &[EdgeId],
    origin: LaneId,
    to: NodeId,
    total_mm: u64,
) -> LanePath {
    let mut edges = Vec::new();
    let mut cur = to;
    loop {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        edges.push(e);
        cur = graph.edge_from[e.index()];
    }
    edges.reverse();
    LanePath { origin, edges, total_length_m: total_mm as f64 / 1000.0 }
}
