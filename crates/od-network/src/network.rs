//! The loaded road network and its read-only geometry accessors.
//!
//! # Arenas
//!
//! Roads, sections, lanes, junctions and connections live in flat `Vec`s
//! indexed by their handles.  Sections of a road are contiguous and sorted by
//! `s`; lanes of a section are contiguous and sorted by signed id.
//!
//! # Lateral layout
//!
//! Lateral offsets `t` are measured from the reference line, positive to the
//! left.  The lane-offset profile shifts the whole lane stack.  A lane's
//! inner edge sits at the sum of the widths of every lane between it and the
//! center line; its outer edge adds its own width.

use std::f64::consts::FRAC_PI_2;
use std::path::Path;

use rustc_hash::FxHashMap;

use od_core::{ConnectionId, JunctionId, LaneId, RoadId, SectionId, Vec3, normalize_angle};
use od_geometry::{Pose, Projection};

use crate::graph::RoadGraph;
use crate::model::{Connection, Junction, Lane, LaneSection, LaneSide, LaneWidth, Point, Road};
use crate::{Document, LoadResult, NetworkBuilder, NetworkConfig};

/// A C0 discontinuity between a lane end and one of its link targets.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContinuityGap {
    pub from: LaneId,
    pub to: LaneId,
    pub gap_m: f64,
}

/// Immutable road network.  Construct with [`RoadNetwork::from_document`] or
/// [`NetworkBuilder`].
///
/// Arena fields are `pub` for direct indexed access; handles returned by the
/// network are always valid indices into them.
pub struct RoadNetwork {
    pub roads: Vec<Road>,
    pub sections: Vec<LaneSection>,
    pub lanes: Vec<Lane>,
    pub junctions: Vec<Junction>,
    pub connections: Vec<Connection>,
    pub graph: RoadGraph,

    // Load-boundary name tables.
    pub(crate) road_names: FxHashMap<String, RoadId>,
    pub(crate) junction_names: FxHashMap<String, JunctionId>,
}

impl RoadNetwork {
    /// Build, validate and link a network from a parsed document.
    pub fn from_document(document: Document, config: &NetworkConfig) -> LoadResult<Self> {
        let mut builder = NetworkBuilder::new(config.clone());
        builder.add_document(document);
        builder.build()
    }

    /// Load a JSON document from disk and build the network.
    pub fn load_json(path: &Path, config: &NetworkConfig) -> LoadResult<Self> {
        Self::from_document(crate::load_document_json(path)?, config)
    }

    /// Load an OpenDRIVE `.xodr` file from disk and build the network.
    #[cfg(feature = "xodr")]
    pub fn load_xodr(path: &Path, config: &NetworkConfig) -> LoadResult<Self> {
        Self::from_document(crate::xodr::load_document_xodr(path)?, config)
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    // ── Entity access ─────────────────────────────────────────────────────

    #[inline]
    pub fn road(&self, id: RoadId) -> &Road {
        &self.roads[id.index()]
    }

    #[inline]
    pub fn section(&self, id: SectionId) -> &LaneSection {
        &self.sections[id.index()]
    }

    #[inline]
    pub fn lane(&self, id: LaneId) -> &Lane {
        &self.lanes[id.index()]
    }

    #[inline]
    pub fn junction(&self, id: JunctionId) -> &Junction {
        &self.junctions[id.index()]
    }

    #[inline]
    pub fn connection(&self, id: ConnectionId) -> &Connection {
        &self.connections[id.index()]
    }

    /// Checked lane access for handles that came from outside the network.
    pub fn get_lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(id.index())
    }

    pub fn get_road(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(id.index())
    }

    /// Handle of the road with authored id `id`.
    pub fn road_by_id(&self, id: &str) -> Option<RoadId> {
        self.road_names.get(id).copied()
    }

    /// Handle of the junction with authored id `id`.
    pub fn junction_by_id(&self, id: &str) -> Option<JunctionId> {
        self.junction_names.get(id).copied()
    }

    /// Connection of `junction` with authored id `id`.
    pub fn connection_by_id(&self, junction: JunctionId, id: &str) -> Option<ConnectionId> {
        self.junction(junction)
            .connections
            .iter()
            .copied()
            .find(|&c| self.connection(c).id == id)
    }

    // ── Positional lookup ─────────────────────────────────────────────────

    /// Section of `road` covering `s`.  `None` outside `[0, length]`.
    pub fn section_at(&self, road: RoadId, s: f64) -> Option<SectionId> {
        let road = self.get_road(road)?;
        if !(s >= -crate::S_TOLERANCE && s <= road.length + crate::S_TOLERANCE) {
            return None;
        }
        let idx = road
            .sections
            .partition_point(|&sec| self.section(sec).start_s <= s)
            .saturating_sub(1);
        Some(road.sections[idx])
    }

    /// Lane `lane_id` of the section of `road` covering `s`.
    pub fn lane_at(&self, road: RoadId, lane_id: i32, s: f64) -> Option<LaneId> {
        let section = self.section_at(road, s)?;
        self.section(section).lane(lane_id)
    }

    /// `s` where `lane` begins (its section start).
    pub fn lane_start_s(&self, lane: LaneId) -> f64 {
        self.section(self.lane(lane).section).start_s
    }

    /// `s` where `lane` ends (its section end).
    pub fn lane_end_s(&self, lane: LaneId) -> f64 {
        self.section(self.lane(lane).section).end_s
    }

    pub fn lane_length(&self, lane: LaneId) -> f64 {
        self.section(self.lane(lane).section).length()
    }

    // ── Lane geometry ─────────────────────────────────────────────────────

    /// Width of a lane at road position `s`.
    pub fn lane_width(&self, lane: LaneId, s: f64) -> f64 {
        self.lane_extent(self.lane(lane), s).1
    }

    /// `(distance of the inner edge from the lane-offset line, width)`.
    fn lane_extent(&self, lane: &Lane, s: f64) -> (f64, f64) {
        let section = self.section(lane.section);
        let ds = s - section.start_s;
        let sign = lane.side().sign();
        let mut inner = 0.0;
        for k in 1..lane.id.abs() {
            if let Some(other) = section.lane(sign * k) {
                inner += raw_width(self.lane(other), ds, inner);
            }
        }
        (inner, raw_width(lane, ds, inner))
    }

    /// Signed lateral offsets `(inner edge, outer edge)` of a lane at `s`.
    pub fn lane_edges_t(&self, lane: LaneId, s: f64) -> (f64, f64) {
        let lane = self.lane(lane);
        let road = self.road(lane.road);
        let base = road.lane_offset.value_at(s);
        let sign = f64::from(lane.side().sign());
        let (inner, width) = self.lane_extent(lane, s);
        (base + sign * inner, base + sign * (inner + width))
    }

    /// Signed lateral offset of the lane center at `s`.
    pub fn lane_center_t(&self, lane: LaneId, s: f64) -> f64 {
        let (inner, outer) = self.lane_edges_t(lane, s);
        0.5 * (inner + outer)
    }

    /// Reference-line pose of `road` at `s`.
    pub fn reference_pose(&self, road: RoadId, s: f64) -> Pose {
        self.road(road).reference_line.pose_at(s)
    }

    /// World position at `(s, t)` on `road`, with profile elevation.
    pub fn world_position(&self, road: RoadId, s: f64, t: f64) -> Vec3 {
        let road = self.road(road);
        let (x, y) = road.reference_line.pose_at(s).offset(t);
        Vec3::from_document(x, y, road.elevation.value_at(s))
    }

    /// Lane center point at road position `s`.  `None` if `s` is outside the
    /// lane's section.
    pub fn lane_center_point(&self, lane: LaneId, s: f64) -> Option<Point> {
        let l = self.get_lane(lane)?;
        let section = self.section(l.section);
        if !section.contains(s) {
            return None;
        }
        let s = s.clamp(section.start_s, section.end_s);
        let road = self.road(l.road);
        let pose = road.reference_line.pose_at(s);
        let (x, y) = pose.offset(self.lane_center_t(lane, s));
        Some(Point {
            s,
            position: Vec3::from_document(x, y, road.elevation.value_at(s)),
            heading: pose.heading,
            ortho: normalize_angle(pose.heading - FRAC_PI_2),
            curvature: pose.curvature,
            lane,
            lane_id: l.id,
        })
    }

    /// World positions of the inner and outer lane edges at `s`.
    pub fn lane_edge_points(&self, lane: LaneId, s: f64) -> (Vec3, Vec3) {
        let road = self.lane(lane).road;
        let (inner, outer) = self.lane_edges_t(lane, s);
        (self.world_position(road, s, inner), self.world_position(road, s, outer))
    }

    /// Project a world position `(x, z)` onto a road's reference line.
    /// `None` for a handle that belongs to no road of this network.
    pub fn project(&self, road: RoadId, x: f64, z: f64) -> Option<Projection> {
        self.get_road(road).map(|r| r.reference_line.project(x, -z))
    }

    /// Lane of `road` whose lateral band contains world position `(x, z)`,
    /// with the projected `s`.
    pub fn lane_at_position(&self, road: RoadId, x: f64, z: f64) -> Option<(LaneId, f64)> {
        let projection = self.project(road, x, z)?;
        let section = self.section(self.section_at(road, projection.s)?);
        section.lanes.iter().find_map(|&(_, lane)| {
            let (inner, outer) = self.lane_edges_t(lane, projection.s);
            let (lo, hi) = if inner < outer { (inner, outer) } else { (outer, inner) };
            (lo <= projection.t && projection.t <= hi && hi > lo).then_some((lane, projection.s))
        })
    }

    // ── Attributes ────────────────────────────────────────────────────────

    /// Speed limit in km/h at `s`: the lane's own record if one covers `s`,
    /// else the road's.  `None` when unset.
    pub fn speed_limit_at(&self, lane: LaneId, s: f64) -> Option<f64> {
        let l = self.lane(lane);
        match l.lane_speed_at(s) {
            Some(limit) => limit,
            None => self.road(l.road).speed_limit_at(s),
        }
    }

    /// Positions inside the lane's section where its effective speed limit
    /// may change, ascending, excluding the section bounds.
    pub fn speed_breakpoints(&self, lane: LaneId) -> Vec<f64> {
        let l = self.lane(lane);
        let section = self.section(l.section);
        let mut points: Vec<f64> = l
            .speed
            .iter()
            .chain(self.road(l.road).speed.iter())
            .map(|r| r.s)
            .filter(|&s| s > section.start_s && s < section.end_s)
            .collect();
        points.sort_by(f64::total_cmp);
        points.dedup();
        points
    }

    /// Number of driving lanes with non-zero width on one side of a section.
    pub fn driving_lane_count(&self, section: SectionId, side: LaneSide, s: f64) -> usize {
        self.section(section)
            .side(side)
            .filter(|&(_, lane)| {
                self.lane(lane).lane_type.is_driving() && self.lane_width(lane, s) > 0.0
            })
            .count()
    }

    /// Every lane end whose linked lane starts more than `tolerance_m` away.
    pub fn continuity_gaps(&self, tolerance_m: f64) -> Vec<ContinuityGap> {
        let mut gaps = Vec::new();
        for lane in &self.lanes {
            let section = self.section(lane.section);
            for (link, s) in [(&lane.successor, section.end_s), (&lane.predecessor, section.start_s)] {
                let Some(from) = self.lane_center_point(lane.handle, s) else { continue };
                for (_, target) in link.targets() {
                    let target_s = match target.contact {
                        crate::ContactPoint::Start => self.lane_start_s(target.lane),
                        crate::ContactPoint::End => self.lane_end_s(target.lane),
                    };
                    let Some(to) = self.lane_center_point(target.lane, target_s) else { continue };
                    let gap_m = from.position.distance(to.position);
                    if gap_m > tolerance_m {
                        gaps.push(ContinuityGap { from: lane.handle, to: target.lane, gap_m });
                    }
                }
            }
        }
        gaps
    }
}

fn raw_width(lane: &Lane, ds: f64, inner: f64) -> f64 {
    match &lane.width {
        LaneWidth::Width(profile) => profile.value_at(ds).max(0.0),
        LaneWidth::Border(profile) => {
            // Border values are signed offsets; right-side borders are negative.
            let outer = f64::from(lane.side().sign()) * profile.value_at(ds);
            (outer - inner).max(0.0)
        }
    }
}
