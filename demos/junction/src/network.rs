//! The demo's road document: one approach road forking at a junction.
//!
//! ```text
//!                     D (north, 50 m, 30 km/h)
//!                     |
//!            C2 (left arc, r = 10)
//!           /
//! A ───────J───── C1 ───── B (east, 100 m)
//! (east, 100 m, 50 km/h)
//! ```

use std::f64::consts::FRAC_PI_2;

use od_core::SpeedUnit;
use od_network::{
    ConnectionRecord, ContactPoint, Document, GeometryRecord, JunctionRecord, LaneRecord,
    LaneSectionRecord, LinkTargetRecord, RoadRecord,
};

const ARC_RADIUS: f64 = 10.0;

fn two_way(link: fn(LaneRecord) -> LaneRecord) -> LaneSectionRecord {
    LaneSectionRecord::new(0.0)
        .with_lane(LaneRecord::driving(1, 3.5))
        .with_lane(link(LaneRecord::driving(-1, 3.5)))
}

fn one_way(link: fn(LaneRecord) -> LaneRecord) -> LaneSectionRecord {
    LaneSectionRecord::new(0.0).with_lane(link(LaneRecord::driving(-1, 3.5)))
}

pub fn build_document() -> Document {
    let arc_length = FRAC_PI_2 * ARC_RADIUS;
    Document::new()
        .with_road(
            RoadRecord::new("A", 100.0)
                .straight(0.0, 0.0, 0.0)
                .with_speed(0.0, 50.0, SpeedUnit::Kmh)
                .with_successor(LinkTargetRecord::junction("J"))
                .with_section(two_way(|l| l)),
        )
        .with_road(
            RoadRecord::new("C1", 20.0)
                .straight(100.0, 0.0, 0.0)
                .in_junction("J")
                .with_predecessor(LinkTargetRecord::road("A", ContactPoint::End))
                .with_successor(LinkTargetRecord::road("B", ContactPoint::Start))
                .with_section(one_way(|l| l.predecessor(-1).successor(-1))),
        )
        .with_road(
            RoadRecord::new("C2", arc_length)
                .with_geometry(GeometryRecord::arc(0.0, 100.0, 0.0, 0.0, arc_length, 1.0 / ARC_RADIUS))
                .in_junction("J")
                .with_predecessor(LinkTargetRecord::road("A", ContactPoint::End))
                .with_successor(LinkTargetRecord::road("D", ContactPoint::Start))
                .with_section(one_way(|l| l.predecessor(-1).successor(-1))),
        )
        .with_road(
            RoadRecord::new("B", 100.0)
                .straight(120.0, 0.0, 0.0)
                .with_predecessor(LinkTargetRecord::road("C1", ContactPoint::End))
                .with_section(two_way(|l| l.predecessor(-1))),
        )
        .with_road(
            RoadRecord::new("D", 50.0)
                .straight(100.0 + ARC_RADIUS, ARC_RADIUS, FRAC_PI_2)
                .with_speed(0.0, 30.0, SpeedUnit::Kmh)
                .with_predecessor(LinkTargetRecord::road("C2", ContactPoint::End))
                .with_section(two_way(|l| l.predecessor(-1))),
        )
        .with_junction(
            JunctionRecord::new("J")
                .with_connection(ConnectionRecord::new("0", "A", "C1", ContactPoint::Start).lane_link(-1, -1))
                .with_connection(ConnectionRecord::new("1", "A", "C2", ContactPoint::Start).lane_link(-1, -1)),
        )
}

