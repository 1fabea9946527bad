//! Network construction and validation.
//!
//! [`NetworkBuilder`] collects document records, then [`build`](NetworkBuilder::build)
//! runs every load-time stage in order:
//!
//! 1. name tables (duplicate ids are rejected),
//! 2. roads: geometry reconstruction, lane sections and lanes,
//! 3. junctions and their connections,
//! 4. lane neighbors,
//! 5. topology linking (whole-network closure, see [`crate::linker`]),
//! 6. the derived [`RoadGraph`].
//!
//! Any failure returns a [`LoadError`] and drops everything built so far.

use rustc_hash::FxHashMap;

use od_core::{ConnectionId, JunctionId, LaneId, RoadId, SectionId};
use od_geometry::profile::ProfileEntry;
use od_geometry::{AuthoredSegment, CubicPoly, CubicProfile, ParamRange, ReferenceLine, SegmentKind};

use crate::document::{
    Document, ElementType, GeometryKindRecord, JunctionRecord, LaneSectionRecord, LinkTargetRecord,
    PolyRecord, RoadMarkRecord, RoadRecord, WidthRecord,
};
use crate::graph::RoadGraph;
use crate::linker;
use crate::model::{
    Connection, Junction, Lane, LaneSection, LaneWidth, Link, Road, RoadLink, RoadMark, SpeedRecord,
};
use crate::{LoadError, LoadResult, NetworkConfig, RoadNetwork};

/// Collect document records, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use od_network::{LaneRecord, LaneSectionRecord, NetworkBuilder, NetworkConfig, RoadRecord};
///
/// let mut b = NetworkBuilder::new(NetworkConfig::default());
/// b.add_road(
///     RoadRecord::new("A", 100.0)
///         .straight(0.0, 0.0, 0.0)
///         .with_section(LaneSectionRecord::new(0.0).with_lane(LaneRecord::driving(-1, 3.5))),
/// );
/// let net = b.build().unwrap();
/// assert_eq!(net.road_count(), 1);
/// assert_eq!(net.lane_count(), 1);
/// ```
pub struct NetworkBuilder {
    config: NetworkConfig,
    roads: Vec<RoadRecord>,
    junctions: Vec<JunctionRecord>,
}

impl NetworkBuilder {
    pub fn new(config: NetworkConfig) -> Self {
        Self { config, roads: Vec::new(), junctions: Vec::new() }
    }

    pub fn add_road(&mut self, road: RoadRecord) -> &mut Self {
        self.roads.push(road);
        self
    }

    pub fn add_junction(&mut self, junction: JunctionRecord) -> &mut Self {
        self.junctions.push(junction);
        self
    }

    pub fn add_document(&mut self, document: Document) -> &mut Self {
        self.roads.extend(document.roads);
        self.junctions.extend(document.junctions);
        self
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    /// Consume the builder and produce a linked [`RoadNetwork`].
    pub fn build(self) -> LoadResult<RoadNetwork> {
        // ── Name tables ───────────────────────────────────────────────────
        let mut junction_names: FxHashMap<String, JunctionId> = FxHashMap::default();
        for (i, rec) in self.junctions.iter().enumerate() {
            if junction_names.insert(rec.id.clone(), JunctionId(i as u32)).is_some() {
                return Err(LoadError::DuplicateJunction(rec.id.clone()));
            }
        }
        let mut road_names: FxHashMap<String, RoadId> = FxHashMap::default();
        for (i, rec) in self.roads.iter().enumerate() {
            if road_names.insert(rec.id.clone(), RoadId(i as u32)).is_some() {
                return Err(LoadError::DuplicateRoad(rec.id.clone()));
            }
        }
        let names = Names { roads: &road_names, junctions: &junction_names };

        // ── Roads, sections, lanes ────────────────────────────────────────
        let mut roads = Vec::with_capacity(self.roads.len());
        let mut sections = Vec::new();
        let mut lanes = Vec::new();
        for (i, rec) in self.roads.iter().enumerate() {
            let road = build_road(RoadId(i as u32), rec, &names, &self.config, &mut sections, &mut lanes)?;
            roads.push(road);
        }

        // ── Junctions and connections ─────────────────────────────────────
        let mut junctions = Vec::with_capacity(self.junctions.len());
        let mut connections = Vec::new();
        for (i, rec) in self.junctions.iter().enumerate() {
            let handle = JunctionId(i as u32);
            let mut ids = Vec::with_capacity(rec.connections.len());
            for conn in &rec.connections {
                let lookup = |target: &str| {
                    road_names.get(target).copied().ok_or_else(|| LoadError::UnknownConnectionRoad {
                        junction: rec.id.clone(),
                        connection: conn.id.clone(),
                        target: target.to_owned(),
                    })
                };
                let id = ConnectionId(connections.len() as u32);
                connections.push(Connection {
                    handle: id,
                    junction: handle,
                    id: conn.id.clone(),
                    incoming_road: lookup(&conn.incoming_road)?,
                    connecting_road: lookup(&conn.connecting_road)?,
                    contact_point: conn.contact_point,
                    lane_links: conn.lane_links.iter().map(|l| (l.from, l.to)).collect(),
                });
                ids.push(id);
            }
            junctions.push(Junction {
                handle,
                id: rec.id.clone(),
                name: rec.name.clone(),
                connections: ids,
            });
        }

        // ── Neighbors ─────────────────────────────────────────────────────
        assign_neighbors(&sections, &mut lanes);

        // ── Topology ──────────────────────────────────────────────────────
        let stats = linker::link_lanes(
            &roads, &sections, &mut lanes, &junctions, &connections, &self.config,
        )?;
        let graph = RoadGraph::build(&sections, &lanes);

        let network = RoadNetwork {
            roads,
            sections,
            lanes,
            junctions,
            connections,
            graph,
            road_names,
            junction_names,
        };

        for gap in network.continuity_gaps(self.config.continuity_tolerance_m) {
            log::debug!(
                "lane {} → lane {}: linked ends are {:.3} m apart",
                gap.from, gap.to, gap.gap_m
            );
        }
        log::info!(
            "loaded {} roads, {} lanes, {} junctions ({} links resolved, {} via junction, {} unresolved)",
            network.road_count(),
            network.lane_count(),
            network.junction_count(),
            stats.resolved,
            stats.via_junction,
            stats.unresolved,
        );
        Ok(network)
    }
}

// ── Stage helpers ─────────────────────────────────────────────────────────────

struct Names<'a> {
    roads: &'a FxHashMap<String, RoadId>,
    junctions: &'a FxHashMap<String, JunctionId>,
}

impl Names<'_> {
    fn road_link(&self, road: &str, target: &LinkTargetRecord) -> LoadResult<RoadLink> {
        match target.element_type {
            ElementType::Road => {
                let handle = self.roads.get(&target.element_id).copied().ok_or_else(|| {
                    LoadError::UnknownRoad { road: road.to_owned(), target: target.element_id.clone() }
                })?;
                let contact = target.contact_point.ok_or_else(|| LoadError::MissingContactPoint {
                    road: road.to_owned(),
                    target: target.element_id.clone(),
                })?;
                Ok(RoadLink::Road { road: handle, contact })
            }
            ElementType::Junction => self.junction(road, &target.element_id).map(RoadLink::Junction),
        }
    }

    fn junction(&self, road: &str, id: &str) -> LoadResult<JunctionId> {
        self.junctions.get(id).copied().ok_or_else(|| LoadError::UnknownJunction {
            road: road.to_owned(),
            junction: id.to_owned(),
        })
    }
}

fn build_road(
    handle: RoadId,
    rec: &RoadRecord,
    names: &Names<'_>,
    config: &NetworkConfig,
    sections: &mut Vec<LaneSection>,
    lanes: &mut Vec<Lane>,
) -> LoadResult<Road> {
    if !(rec.length.is_finite() && rec.length > 0.0) {
        return Err(LoadError::InvalidLength { road: rec.id.clone(), length: rec.length });
    }

    let authored: Vec<AuthoredSegment> = rec.plan_view.iter().map(authored_segment).collect();
    let reference_line = ReferenceLine::reconstruct(&authored)
        .map_err(|source| LoadError::Geometry { road: rec.id.clone(), source })?;
    if (reference_line.length() - rec.length).abs() > 1e-3 {
        if config.strict_geometry {
            return Err(LoadError::LengthMismatch {
                road: rec.id.clone(),
                plan_view: reference_line.length(),
                length: rec.length,
            });
        }
        log::warn!(
            "road {:?}: plan view length {:.3} differs from road length {:.3}",
            rec.id, reference_line.length(), rec.length
        );
    }

    let junction = rec.junction.as_deref().map(|j| names.junction(&rec.id, j)).transpose()?;
    let predecessor = rec.link.predecessor.as_ref().map(|t| names.road_link(&rec.id, t)).transpose()?;
    let successor = rec.link.successor.as_ref().map(|t| names.road_link(&rec.id, t)).transpose()?;

    let mut speed: Vec<SpeedRecord> = rec
        .speed
        .iter()
        .map(|r| SpeedRecord { s: r.s, max_kmh: r.max.map(|v| r.unit.to_kmh(v)) })
        .collect();
    speed.sort_by(|a, b| a.s.total_cmp(&b.s));

    // ── Sections ──────────────────────────────────────────────────────────
    if rec.lane_sections.is_empty() {
        return Err(LoadError::NoLaneSections { road: rec.id.clone() });
    }
    let mut section_ids = Vec::with_capacity(rec.lane_sections.len());
    for (index, sec) in rec.lane_sections.iter().enumerate() {
        let first_ok = index > 0 || sec.s.abs() <= crate::S_TOLERANCE;
        let ordered = index == 0 || sec.s > rec.lane_sections[index - 1].s;
        if !(first_ok && ordered && sec.s < rec.length) {
            return Err(LoadError::SectionOrder { road: rec.id.clone(), s: sec.s });
        }
        let start_s = if index == 0 { 0.0 } else { sec.s };
        let end_s = rec.lane_sections.get(index + 1).map_or(rec.length, |next| next.s);

        let id = SectionId(sections.len() as u32);
        let lane_ids = build_lanes(handle, id, rec, sec, start_s, lanes)?;
        sections.push(LaneSection {
            handle: id,
            road: handle,
            index,
            start_s,
            end_s,
            lanes: lane_ids,
            center_road_marks: road_marks(&sec.center_road_marks, start_s),
        });
        section_ids.push(id);
    }

    Ok(Road {
        handle,
        id: rec.id.clone(),
        name: rec.name.clone(),
        length: rec.length,
        junction,
        predecessor,
        successor,
        reference_line,
        elevation: profile(&rec.elevation),
        lane_offset: profile(&rec.lane_offset),
        speed,
        sections: section_ids,
    })
}

fn build_lanes(
    road: RoadId,
    section: SectionId,
    rec: &RoadRecord,
    sec: &LaneSectionRecord,
    start_s: f64,
    lanes: &mut Vec<Lane>,
) -> LoadResult<Vec<(i32, LaneId)>> {
    // ── Id validation ─────────────────────────────────────────────────────
    let mut ids: Vec<i32> = sec.lanes.iter().map(|l| l.id).collect();
    ids.sort_unstable();
    if ids.contains(&0) {
        return Err(LoadError::CenterLane { road: rec.id.clone(), s: sec.s });
    }
    if let Some(w) = ids.windows(2).find(|w| w[0] == w[1]) {
        return Err(LoadError::DuplicateLane { road: rec.id.clone(), s: sec.s, lane: w[0] });
    }
    let right = ids.iter().filter(|&&id| id < 0).count() as i32;
    let left = ids.iter().filter(|&&id| id > 0).count() as i32;
    let contiguous = ids.iter().all(|&id| if id < 0 { -id <= right } else { id <= left });
    if !contiguous {
        return Err(LoadError::NonContiguousLanes { road: rec.id.clone(), s: sec.s });
    }

    // ── Lanes, sorted by signed id ────────────────────────────────────────
    let mut records: Vec<_> = sec.lanes.iter().collect();
    records.sort_by_key(|l| l.id);

    let mut out = Vec::with_capacity(records.len());
    for lr in records {
        let handle = LaneId(lanes.len() as u32);
        let width = if !lr.width.is_empty() || lr.border.is_empty() {
            LaneWidth::Width(width_profile(&lr.width))
        } else {
            LaneWidth::Border(width_profile(&lr.border))
        };
        let mut speed: Vec<SpeedRecord> = lr
            .speed
            .iter()
            .map(|r| SpeedRecord { s: start_s + r.s_offset, max_kmh: Some(r.unit.to_kmh(r.max)) })
            .collect();
        speed.sort_by(|a, b| a.s.total_cmp(&b.s));

        lanes.push(Lane {
            handle,
            road,
            section,
            id: lr.id,
            lane_type: lr.lane_type,
            width,
            speed,
            road_marks: road_marks(&lr.road_marks, start_s),
            declared_predecessor: lr.predecessor,
            declared_successor: lr.successor,
            predecessor: Link::Unresolved,
            successor: Link::Unresolved,
            inner: None,
            outer: None,
        });
        out.push((lr.id, handle));
    }
    Ok(out)
}

fn assign_neighbors(sections: &[LaneSection], lanes: &mut [Lane]) {
    for section in sections {
        for &(id, handle) in &section.lanes {
            let sign = id.signum();
            // ±1 borders the center line; its inner neighbor is across it.
            let inner_id = if id.abs() == 1 { -id } else { id - sign };
            let lane = &mut lanes[handle.index()];
            lane.inner = section.lane(inner_id);
            lane.outer = section.lane(id + sign);
        }
    }
}

// ── Record conversion ─────────────────────────────────────────────────────────

fn authored_segment(g: &crate::document::GeometryRecord) -> AuthoredSegment {
    let kind = match g.kind {
        GeometryKindRecord::Line => SegmentKind::Line,
        GeometryKindRecord::Arc { curvature } => SegmentKind::Arc { curvature },
        GeometryKindRecord::Spiral { curv_start, curv_end } => SegmentKind::Spiral { curv_start, curv_end },
        GeometryKindRecord::Poly3 { a, b, c, d } => SegmentKind::Poly3 { a, b, c, d },
        GeometryKindRecord::ParamPoly3 { au, bu, cu, du, av, bv, cv, dv, arc_length } => {
            SegmentKind::ParamPoly3 {
                au, bu, cu, du, av, bv, cv, dv,
                range: if arc_length { ParamRange::ArcLength } else { ParamRange::Normalized },
            }
        }
    };
    AuthoredSegment { s: g.s, x: g.x, y: g.y, hdg: g.hdg, length: g.length, kind }
}

fn profile(records: &[PolyRecord]) -> CubicProfile {
    CubicProfile::new(
        records
            .iter()
            .map(|r| ProfileEntry { s: r.s, poly: CubicPoly::new(r.a, r.b, r.c, r.d) })
            .collect(),
    )
}

fn width_profile(records: &[WidthRecord]) -> CubicProfile {
    CubicProfile::new(
        records
            .iter()
            .map(|r| ProfileEntry { s: r.s_offset, poly: CubicPoly::new(r.a, r.b, r.c, r.d) })
            .collect(),
    )
}

fn road_marks(records: &[RoadMarkRecord], start_s: f64) -> Vec<RoadMark> {
    let mut marks: Vec<RoadMark> = records
        .iter()
        .map(|r| RoadMark { s: start_s + r.s_offset, mark_type: r.mark_type })
        .collect();
    marks.sort_by(|a, b| a.s.total_cmp(&b.s));
    marks
}
