//! Lane-level road graph in CSR form.
//!
//! # Nodes
//!
//! Every lane contributes two nodes, one per end.  Node `(lane, End)` stands
//! for "travelling along `lane` toward increasing `s`, about to leave through
//! its end"; `(lane, Start)` is the same toward decreasing `s`.  Node ids are
//! `2 · lane + (end == End)`, so no lookup table is needed.
//!
//! # Edges
//!
//! A resolved successor link adds an edge out of `(lane, End)`; a resolved
//! predecessor link adds one out of `(lane, Start)`.  The edge lands on the
//! node through which the walk will later leave the target lane: entering at
//! the target's `Start` means leaving through its `End`, and vice versa.
//! Junction links add one edge per candidate, tagged with the connection.
//! Edge weight is the length of the source lane.
//!
//! Edges are stored sorted by source node.  Outgoing edges of node `n` occupy
//! `node_out_start[n] .. node_out_start[n+1]`, a contiguous index range.

use od_core::{ConnectionId, EdgeId, LaneId, NodeId};

use crate::model::{ContactPoint, Lane, LaneSection, Link};

/// Directed lane graph.  Built once after linking; read-only afterwards.
pub struct RoadGraph {
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,
    /// Source node of each edge.
    pub edge_from: Vec<NodeId>,
    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,
    /// Length of the source lane, metres.
    pub edge_length_m: Vec<f64>,
    /// Junction connection an edge passes through, if any.
    pub edge_connection: Vec<Option<ConnectionId>>,
}

struct RawEdge {
    from: NodeId,
    to: NodeId,
    length_m: f64,
    connection: Option<ConnectionId>,
}

impl RoadGraph {
    pub(crate) fn build(sections: &[LaneSection], lanes: &[Lane]) -> Self {
        let node_count = lanes.len() * 2;

        let mut raw: Vec<RawEdge> = Vec::new();
        for lane in lanes {
            let length_m = sections[lane.section.index()].length();
            let mut push = |link: &Link, exit: ContactPoint| {
                for (connection, target) in link.targets() {
                    raw.push(RawEdge {
                        from: Self::node(lane.handle, exit),
                        to: Self::node(target.lane, target.contact.opposite()),
                        length_m,
                        connection,
                    });
                }
            };
            push(&lane.successor, ContactPoint::End);
            push(&lane.predecessor, ContactPoint::Start);
        }

        // Stable sort keeps junction candidates in document order per node.
        raw.sort_by_key(|e| e.from.0);

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, raw.len());

        RoadGraph {
            node_out_start,
            edge_from: raw.iter().map(|e| e.from).collect(),
            edge_to: raw.iter().map(|e| e.to).collect(),
            edge_length_m: raw.iter().map(|e| e.length_m).collect(),
            edge_connection: raw.iter().map(|e| e.connection).collect(),
        }
    }

    // ── Node addressing ───────────────────────────────────────────────────

    /// Node for leaving `lane` through `exit`.
    #[inline]
    pub fn node(lane: LaneId, exit: ContactPoint) -> NodeId {
        NodeId(lane.0 * 2 + u32::from(exit == ContactPoint::End))
    }

    #[inline]
    pub fn node_lane(node: NodeId) -> LaneId {
        LaneId(node.0 / 2)
    }

    #[inline]
    pub fn node_exit(node: NodeId) -> ContactPoint {
        if node.0 % 2 == 1 { ContactPoint::End } else { ContactPoint::Start }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_out_start.len().saturating_sub(1)
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// Outgoing edges of `node`.  A contiguous index range, no allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// Lane an edge leads into.
    #[inline]
    pub fn edge_target_lane(&self, edge: EdgeId) -> LaneId {
        Self::node_lane(self.edge_to[edge.index()])
    }

    /// Every successor lane of `lane`, including all junction branches.
    pub fn successors(&self, lane: LaneId) -> impl Iterator<Item = LaneId> + '_ {
        self.out_edges(Self::node(lane, ContactPoint::End))
            .map(|e| self.edge_target_lane(e))
    }

    /// Every predecessor lane of `lane`, including all junction branches.
    pub fn predecessors(&self, lane: LaneId) -> impl Iterator<Item = LaneId> + '_ {
        self.out_edges(Self::node(lane, ContactPoint::Start))
            .map(|e| self.edge_target_lane(e))
    }
}
