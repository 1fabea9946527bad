//! In-memory road network entities.
//!
//! Everything here is built once by [`crate::NetworkBuilder`] and never
//! mutated afterwards.  Cross references are handles into the arenas held by
//! [`crate::RoadNetwork`]; there are no owning back-pointers.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use od_core::{ConnectionId, JunctionId, LaneId, RoadId, SectionId, Vec3, normalize_angle};
use od_geometry::{CubicProfile, ReferenceLine};

// ── Enumerations ──────────────────────────────────────────────────────────────

/// End of a lane (or road) at which a link attaches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPoint {
    Start,
    End,
}

impl ContactPoint {
    pub fn opposite(self) -> ContactPoint {
        match self {
            ContactPoint::Start => ContactPoint::End,
            ContactPoint::End => ContactPoint::Start,
        }
    }
}

/// Lane usage category.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LaneType {
    Driving,
    Border,
    Sidewalk,
    Shoulder,
    Parking,
    Biking,
    Stop,
    Restricted,
    Median,
    Entry,
    Exit,
    OnRamp,
    OffRamp,
    #[default]
    None,
    #[serde(other)]
    Other,
}

impl LaneType {
    /// Parse an OpenDRIVE `type` attribute.  Unknown values map to `Other`.
    pub fn from_xodr(s: &str) -> LaneType {
        match s {
            "driving"    => LaneType::Driving,
            "border"     => LaneType::Border,
            "sidewalk"   => LaneType::Sidewalk,
            "shoulder"   => LaneType::Shoulder,
            "parking"    => LaneType::Parking,
            "biking"     => LaneType::Biking,
            "stop"       => LaneType::Stop,
            "restricted" => LaneType::Restricted,
            "median"     => LaneType::Median,
            "entry"      => LaneType::Entry,
            "exit"       => LaneType::Exit,
            "onRamp"     => LaneType::OnRamp,
            "offRamp"    => LaneType::OffRamp,
            "none"       => LaneType::None,
            _            => LaneType::Other,
        }
    }

    pub fn is_driving(self) -> bool {
        self == LaneType::Driving
    }
}

/// Painted line type at a lane's outer edge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadMarkType {
    #[default]
    None,
    Solid,
    Broken,
    SolidSolid,
    SolidBroken,
    BrokenSolid,
    BrokenBroken,
    BottsDots,
    Grass,
    Curb,
    #[serde(other)]
    Other,
}

impl RoadMarkType {
    /// Parse an OpenDRIVE road-mark `type` attribute (`"solid solid"` etc.).
    pub fn from_xodr(s: &str) -> RoadMarkType {
        match s {
            "none"          => RoadMarkType::None,
            "solid"         => RoadMarkType::Solid,
            "broken"        => RoadMarkType::Broken,
            "solid solid"   => RoadMarkType::SolidSolid,
            "solid broken"  => RoadMarkType::SolidBroken,
            "broken solid"  => RoadMarkType::BrokenSolid,
            "broken broken" => RoadMarkType::BrokenBroken,
            "botts dots"    => RoadMarkType::BottsDots,
            "grass"         => RoadMarkType::Grass,
            "curb"          => RoadMarkType::Curb,
            _               => RoadMarkType::Other,
        }
    }
}

/// Side of the reference line a lane is on.  Right lanes have negative ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LaneSide {
    Left,
    Right,
}

impl LaneSide {
    pub fn of(lane_id: i32) -> Option<LaneSide> {
        match lane_id.signum() {
            1 => Some(LaneSide::Left),
            -1 => Some(LaneSide::Right),
            _ => None,
        }
    }

    /// `+1` for left, `-1` for right: the sign of lane ids and lateral
    /// offsets on this side.
    pub fn sign(self) -> i32 {
        match self {
            LaneSide::Left => 1,
            LaneSide::Right => -1,
        }
    }
}

// ── Links ─────────────────────────────────────────────────────────────────────

/// A resolved link target: the lane and the end at which a walk enters it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LaneRef {
    pub lane: LaneId,
    pub contact: ContactPoint,
}

/// Resolved predecessor or successor of a lane.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Link {
    /// No continuation: end of road, or a declaration that could not be
    /// resolved.  Both read the same to queries.
    #[default]
    Unresolved,
    Direct(LaneRef),
    /// Fan-out through a junction, candidates in document order.  Never
    /// empty.
    ViaJunction {
        junction: JunctionId,
        candidates: Vec<(ConnectionId, LaneRef)>,
    },
}

impl Link {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Link::Unresolved)
    }

    /// Every reachable target, in candidate order.
    pub fn targets(&self) -> impl Iterator<Item = (Option<ConnectionId>, LaneRef)> + '_ {
        let (direct, candidates): (Option<LaneRef>, &[(ConnectionId, LaneRef)]) = match self {
            Link::Unresolved => (None, &[]),
            Link::Direct(target) => (Some(*target), &[]),
            Link::ViaJunction { candidates, .. } => (None, candidates.as_slice()),
        };
        direct
            .into_iter()
            .map(|t| (None, t))
            .chain(candidates.iter().map(|&(c, t)| (Some(c), t)))
    }

    pub fn target_count(&self) -> usize {
        match self {
            Link::Unresolved => 0,
            Link::Direct(_) => 1,
            Link::ViaJunction { candidates, .. } => candidates.len(),
        }
    }

    pub fn junction(&self) -> Option<JunctionId> {
        match self {
            Link::ViaJunction { junction, .. } => Some(*junction),
            _ => None,
        }
    }
}

/// Road-level link declaration, resolved to handles.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoadLink {
    Road { road: RoadId, contact: ContactPoint },
    Junction(JunctionId),
}

// ── Entities ──────────────────────────────────────────────────────────────────

/// A speed limit starting at road position `s`.  `max_kmh: None` means no
/// limit applies.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpeedRecord {
    pub s: f64,
    pub max_kmh: Option<f64>,
}

/// A road-mark starting at road position `s`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RoadMark {
    pub s: f64,
    pub mark_type: RoadMarkType,
}

pub struct Road {
    pub handle: RoadId,
    /// Authored id.
    pub id: String,
    pub name: Option<String>,
    pub length: f64,
    pub junction: Option<JunctionId>,
    pub predecessor: Option<RoadLink>,
    pub successor: Option<RoadLink>,
    pub reference_line: ReferenceLine,
    pub elevation: CubicProfile,
    pub lane_offset: CubicProfile,
    /// Road-level speed records, ascending `s`.
    pub speed: Vec<SpeedRecord>,
    /// Sections in ascending `s`.
    pub sections: Vec<SectionId>,
}

impl Road {
    pub fn first_section(&self) -> SectionId {
        self.sections[0]
    }

    pub fn last_section(&self) -> SectionId {
        self.sections[self.sections.len() - 1]
    }

    /// Section at the given contact end.
    pub fn section_at_contact(&self, contact: ContactPoint) -> SectionId {
        match contact {
            ContactPoint::Start => self.first_section(),
            ContactPoint::End => self.last_section(),
        }
    }

    /// Road-level speed limit at `s` in km/h.
    pub fn speed_limit_at(&self, s: f64) -> Option<f64> {
        let idx = self.speed.partition_point(|r| r.s <= s);
        idx.checked_sub(1).and_then(|i| self.speed[i].max_kmh)
    }

    pub fn is_connecting_road(&self) -> bool {
        self.junction.is_some()
    }
}

pub struct LaneSection {
    pub handle: SectionId,
    pub road: RoadId,
    /// Position within the road's section list.
    pub index: usize,
    pub start_s: f64,
    pub end_s: f64,
    /// `(signed id, handle)` sorted by signed id.
    pub lanes: Vec<(i32, LaneId)>,
    pub center_road_marks: Vec<RoadMark>,
}

impl LaneSection {
    pub fn lane(&self, id: i32) -> Option<LaneId> {
        self.lanes
            .binary_search_by_key(&id, |&(lane_id, _)| lane_id)
            .ok()
            .map(|i| self.lanes[i].1)
    }

    pub fn length(&self) -> f64 {
        self.end_s - self.start_s
    }

    pub fn contains(&self, s: f64) -> bool {
        self.start_s - crate::S_TOLERANCE <= s && s <= self.end_s + crate::S_TOLERANCE
    }

    /// Lanes on one side, ordered from the center outward.
    pub fn side(&self, side: LaneSide) -> impl Iterator<Item = (i32, LaneId)> + '_ {
        let (right, left): (Vec<_>, Vec<_>) =
            self.lanes.iter().copied().partition(|&(id, _)| id < 0);
        let lanes = match side {
            LaneSide::Left => left,
            LaneSide::Right => right.into_iter().rev().collect(),
        };
        lanes.into_iter()
    }

    pub fn center_mark_at(&self, s: f64) -> Option<RoadMarkType> {
        mark_at(&self.center_road_marks, s)
    }
}

/// How a lane's width is authored.
#[derive(Clone, Debug, PartialEq)]
pub enum LaneWidth {
    /// Width polynomials keyed by offset from the section start.
    Width(CubicProfile),
    /// Outer-border polynomials keyed by offset from the section start; the
    /// width is the border distance minus the inner lanes.
    Border(CubicProfile),
}

pub struct Lane {
    pub handle: LaneId,
    pub road: RoadId,
    pub section: SectionId,
    /// Signed OpenDRIVE id.
    pub id: i32,
    pub lane_type: LaneType,
    pub width: LaneWidth,
    /// Lane speed records converted to road `s`, ascending.
    pub speed: Vec<SpeedRecord>,
    /// Road marks converted to road `s`, ascending.
    pub road_marks: Vec<RoadMark>,
    /// Authored link declarations (same-side lane ids).
    pub declared_predecessor: Option<i32>,
    pub declared_successor: Option<i32>,
    pub predecessor: Link,
    pub successor: Link,
    /// Next lane toward the center line; for `±1` the `∓1` lane across it.
    pub inner: Option<LaneId>,
    /// Next lane away from the center line.
    pub outer: Option<LaneId>,
}

impl Lane {
    pub fn side(&self) -> LaneSide {
        // Lane id 0 is rejected by the builder.
        if self.id > 0 { LaneSide::Left } else { LaneSide::Right }
    }

    /// Lane-level speed limit in km/h, if a lane record covers `s`.
    pub fn lane_speed_at(&self, s: f64) -> Option<Option<f64>> {
        let idx = self.speed.partition_point(|r| r.s <= s);
        idx.checked_sub(1).map(|i| self.speed[i].max_kmh)
    }

    pub fn road_mark_at(&self, s: f64) -> Option<RoadMarkType> {
        mark_at(&self.road_marks, s)
    }

    /// `true` when the two lanes lie on opposite sides of the center line.
    pub fn is_opposite_to(&self, other: &Lane) -> bool {
        opposite_sides(self.id, other.id)
    }
}

/// `true` when two signed lane ids lie on opposite sides of the center lane.
pub(crate) fn opposite_sides(a: i32, b: i32) -> bool {
    a != 0 && b != 0 && (a < 0) != (b < 0)
}

fn mark_at(marks: &[RoadMark], s: f64) -> Option<RoadMarkType> {
    let idx = marks.partition_point(|m| m.s <= s);
    idx.checked_sub(1).map(|i| marks[i].mark_type)
}

pub struct Junction {
    pub handle: JunctionId,
    pub id: String,
    pub name: Option<String>,
    pub connections: Vec<ConnectionId>,
}

pub struct Connection {
    pub handle: ConnectionId,
    pub junction: JunctionId,
    /// Authored id, unique only within its junction.
    pub id: String,
    pub incoming_road: RoadId,
    pub connecting_road: RoadId,
    pub contact_point: ContactPoint,
    /// `(from, to)` signed lane ids.
    pub lane_links: Vec<(i32, i32)>,
}

// ── Points ────────────────────────────────────────────────────────────────────

/// A sampled lane center point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    pub s: f64,
    /// World position (y-up).
    pub position: Vec3,
    /// Reference-line heading at `s`, radians CCW from +x.
    pub heading: f64,
    /// Direction to the right of the reference line, `heading - π/2`.
    pub ortho: f64,
    /// Reference-line curvature; `None` on polynomial segments.
    pub curvature: Option<f64>,
    pub lane: LaneId,
    /// Signed id of `lane`.
    pub lane_id: i32,
}

impl Point {
    /// Heading in the lane's canonical travel direction.  Left lanes run
    /// against the reference line.
    pub fn travel_heading(&self) -> f64 {
        if self.lane_id > 0 {
            normalize_angle(self.heading + PI)
        } else {
            self.heading
        }
    }

    /// Curvature seen when travelling the lane in its canonical direction.
    pub fn travel_curvature(&self) -> Option<f64> {
        self.curvature.map(|k| if self.lane_id > 0 { -k } else { k })
    }
}
