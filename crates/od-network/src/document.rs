//! Logical road-description document.
//!
//! This is the serde model of an input file, independent of its concrete
//! serialization.  The JSON loader deserializes it directly; the `.xodr`
//! loader (feature `xodr`) maps OpenDRIVE XML elements onto it.  Records keep
//! authored string ids; [`crate::NetworkBuilder`] turns them into handles.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "roads": [{
//!     "id": "A", "length": 100.0,
//!     "link": { "successor": { "element_type": "junction", "element_id": "J1" } },
//!     "plan_view": [{ "s": 0, "x": 0, "y": 0, "hdg": 0, "length": 100,
//!                     "kind": { "type": "line" } }],
//!     "lane_sections": [{ "s": 0, "lanes": [
//!       { "id": -1, "type": "driving", "width": [{ "a": 3.5 }] }
//!     ]}]
//!   }],
//!   "junctions": [{ "id": "J1", "connections": [{
//!     "id": "0", "incoming_road": "A", "connecting_road": "B",
//!     "contact_point": "start", "lane_links": [{ "from": -1, "to": -1 }]
//!   }]}]
//! }
//! ```

use serde::{Deserialize, Serialize};

use od_core::SpeedUnit;

use crate::model::{ContactPoint, LaneType, RoadMarkType};

// ── Top level ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub header: Option<Header>,
    pub roads: Vec<RoadRecord>,
    pub junctions: Vec<JunctionRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    pub name: Option<String>,
    pub version: Option<String>,
}

// ── Roads ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadRecord {
    pub id: String,
    pub name: Option<String>,
    pub length: f64,
    /// Junction this road belongs to (connecting roads only).
    pub junction: Option<String>,
    pub link: RoadLinkRecord,
    pub speed: Vec<RoadSpeedRecord>,
    pub plan_view: Vec<GeometryRecord>,
    pub elevation: Vec<PolyRecord>,
    pub lane_offset: Vec<PolyRecord>,
    pub lane_sections: Vec<LaneSectionRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadLinkRecord {
    pub predecessor: Option<LinkTargetRecord>,
    pub successor: Option<LinkTargetRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Road,
    Junction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTargetRecord {
    pub element_type: ElementType,
    pub element_id: String,
    /// Required for road targets; ignored for junction targets.
    #[serde(default)]
    pub contact_point: Option<ContactPoint>,
}

/// Road-level speed record (`<type><speed>` in OpenDRIVE).  `max: None`
/// means "no limit".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSpeedRecord {
    pub s: f64,
    pub max: Option<f64>,
    #[serde(default)]
    pub unit: SpeedUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryRecord {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub hdg: f64,
    pub length: f64,
    pub kind: GeometryKindRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeometryKindRecord {
    Line,
    Arc {
        curvature: f64,
    },
    Spiral {
        curv_start: f64,
        curv_end: f64,
    },
    Poly3 {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    },
    ParamPoly3 {
        au: f64, bu: f64, cu: f64, du: f64,
        av: f64, bv: f64, cv: f64, dv: f64,
        /// `true` for `pRange="arcLength"`.
        #[serde(default)]
        arc_length: bool,
    },
}

/// `a + b·ds + c·ds² + d·ds³` starting at `s`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolyRecord {
    pub s: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

// ── Lanes ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneSectionRecord {
    pub s: f64,
    /// Road marks of the center line (lane 0).
    pub center_road_marks: Vec<RoadMarkRecord>,
    pub lanes: Vec<LaneRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneRecord {
    pub id: i32,
    #[serde(rename = "type")]
    pub lane_type: LaneType,
    pub predecessor: Option<i32>,
    pub successor: Option<i32>,
    pub width: Vec<WidthRecord>,
    /// Outer-border records; used only when `width` is empty.
    pub border: Vec<WidthRecord>,
    pub speed: Vec<LaneSpeedRecord>,
    pub road_marks: Vec<RoadMarkRecord>,
}

/// Cubic keyed by `s_offset` from the lane section start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidthRecord {
    pub s_offset: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneSpeedRecord {
    #[serde(default)]
    pub s_offset: f64,
    pub max: f64,
    #[serde(default)]
    pub unit: SpeedUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadMarkRecord {
    #[serde(default)]
    pub s_offset: f64,
    #[serde(rename = "type")]
    pub mark_type: RoadMarkType,
}

// ── Junctions ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JunctionRecord {
    pub id: String,
    pub name: Option<String>,
    pub connections: Vec<ConnectionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: String,
    pub incoming_road: String,
    pub connecting_road: String,
    pub contact_point: ContactPoint,
    #[serde(default)]
    pub lane_links: Vec<LaneLinkRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneLinkRecord {
    pub from: i32,
    pub to: i32,
}

// ── Construction helpers ──────────────────────────────────────────────────────
//
// Fluent constructors for building documents in code (tests, demos, procedural
// maps).  Each returns `Self` so records can be chained.

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_road(mut self, road: RoadRecord) -> Self {
        self.roads.push(road);
        self
    }

    pub fn with_junction(mut self, junction: JunctionRecord) -> Self {
        self.junctions.push(junction);
        self
    }
}

impl RoadRecord {
    pub fn new(id: impl Into<String>, length: f64) -> Self {
        Self { id: id.into(), length, ..Self::default() }
    }

    /// Append a plan-view segment.
    pub fn with_geometry(mut self, geometry: GeometryRecord) -> Self {
        self.plan_view.push(geometry);
        self
    }

    /// Convenience: a single straight segment covering the whole road.
    pub fn straight(mut self, x: f64, y: f64, hdg: f64) -> Self {
        let length = self.length;
        self.plan_view.push(GeometryRecord { s: 0.0, x, y, hdg, length, kind: GeometryKindRecord::Line });
        self
    }

    pub fn with_section(mut self, section: LaneSectionRecord) -> Self {
        self.lane_sections.push(section);
        self
    }

    pub fn with_predecessor(mut self, target: LinkTargetRecord) -> Self {
        self.link.predecessor = Some(target);
        self
    }

    pub fn with_successor(mut self, target: LinkTargetRecord) -> Self {
        self.link.successor = Some(target);
        self
    }

    pub fn in_junction(mut self, junction: impl Into<String>) -> Self {
        self.junction = Some(junction.into());
        self
    }

    pub fn with_speed(mut self, s: f64, max: f64, unit: SpeedUnit) -> Self {
        self.speed.push(RoadSpeedRecord { s, max: Some(max), unit });
        self
    }

    pub fn with_elevation(mut self, poly: PolyRecord) -> Self {
        self.elevation.push(poly);
        self
    }

    pub fn with_lane_offset(mut self, poly: PolyRecord) -> Self {
        self.lane_offset.push(poly);
        self
    }
}

impl GeometryRecord {
    pub fn line(s: f64, x: f64, y: f64, hdg: f64, length: f64) -> Self {
        Self { s, x, y, hdg, length, kind: GeometryKindRecord::Line }
    }

    pub fn arc(s: f64, x: f64, y: f64, hdg: f64, length: f64, curvature: f64) -> Self {
        Self { s, x, y, hdg, length, kind: GeometryKindRecord::Arc { curvature } }
    }

    pub fn spiral(s: f64, x: f64, y: f64, hdg: f64, length: f64, curv_start: f64, curv_end: f64) -> Self {
        Self { s, x, y, hdg, length, kind: GeometryKindRecord::Spiral { curv_start, curv_end } }
    }
}

impl PolyRecord {
    pub fn new(s: f64, a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { s, a, b, c, d }
    }
}

impl LinkTargetRecord {
    pub fn road(id: impl Into<String>, contact: ContactPoint) -> Self {
        Self { element_type: ElementType::Road, element_id: id.into(), contact_point: Some(contact) }
    }

    pub fn junction(id: impl Into<String>) -> Self {
        Self { element_type: ElementType::Junction, element_id: id.into(), contact_point: None }
    }
}

impl LaneSectionRecord {
    pub fn new(s: f64) -> Self {
        Self { s, ..Self::default() }
    }

    pub fn with_lane(mut self, lane: LaneRecord) -> Self {
        self.lanes.push(lane);
        self
    }

    pub fn with_center_mark(mut self, mark_type: RoadMarkType) -> Self {
        self.center_road_marks.push(RoadMarkRecord { s_offset: 0.0, mark_type });
        self
    }
}

impl LaneRecord {
    /// A lane of `lane_type` with constant `width`.
    pub fn new(id: i32, lane_type: LaneType, width: f64) -> Self {
        Self {
            id,
            lane_type,
            width: vec![WidthRecord { a: width, ..WidthRecord::default() }],
            ..Self::default()
        }
    }

    pub fn driving(id: i32, width: f64) -> Self {
        Self::new(id, LaneType::Driving, width)
    }

    pub fn predecessor(mut self, id: i32) -> Self {
        self.predecessor = Some(id);
        self
    }

    pub fn successor(mut self, id: i32) -> Self {
        self.successor = Some(id);
        self
    }

    pub fn with_speed(mut self, s_offset: f64, max: f64, unit: SpeedUnit) -> Self {
        self.speed.push(LaneSpeedRecord { s_offset, max, unit });
        self
    }

    pub fn with_width(mut self, width: WidthRecord) -> Self {
        self.width.push(width);
        self
    }

    pub fn with_mark(mut self, mark_type: RoadMarkType) -> Self {
        self.road_marks.push(RoadMarkRecord { s_offset: 0.0, mark_type });
        self
    }
}

impl JunctionRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }

    pub fn with_connection(mut self, connection: ConnectionRecord) -> Self {
        self.connections.push(connection);
        self
    }
}

impl ConnectionRecord {
    pub fn new(
        id: impl Into<String>,
        incoming_road: impl Into<String>,
        connecting_road: impl Into<String>,
        contact_point: ContactPoint,
    ) -> Self {
        Self {
            id: id.into(),
            incoming_road: incoming_road.into(),
            connecting_road: connecting_road.into(),
            contact_point,
            lane_links: Vec::new(),
        }
    }

    pub fn lane_link(mut self, from: i32, to: i32) -> Self {
        self.lane_links.push(LaneLinkRecord { from, to });
        self
    }
}
