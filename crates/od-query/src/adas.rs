//! ADAS-style lane classification: lane type, line types and neighbor lane
//! occupancy as seen from the driver's seat.
//!
//! "Left" and "right" are relative to the vehicle.  For a vehicle driving a
//! lane in its canonical direction the left neighbor is the next lane
//! toward the center line; driving wrong-way mirrors that.

use od_core::LaneId;
use od_network::{LaneType, PreferredConnections, RoadMarkType};

use crate::query::PathQuery;
use crate::walk::{Along, LaneWalk, TravelDirection};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AdasLaneType {
    Unknown,
    EmergencyLane,
    SingleLaneRoad,
    LeftMostLane,
    RightMostLane,
    MiddleLane,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AdasLineType {
    /// Asked about a lane that is not a driving lane.
    Invalid,
    Undecided,
    Solid,
    Dashed,
    Double,
    BottsDots,
    RoadEdge,
    NotVisible,
}

impl From<RoadMarkType> for AdasLineType {
    fn from(mark: RoadMarkType) -> Self {
        match mark {
            RoadMarkType::BottsDots => AdasLineType::BottsDots,
            RoadMarkType::Broken | RoadMarkType::BrokenBroken => AdasLineType::Dashed,
            RoadMarkType::Solid => AdasLineType::Solid,
            RoadMarkType::SolidSolid => AdasLineType::Double,
            RoadMarkType::Curb | RoadMarkType::Grass => AdasLineType::RoadEdge,
            RoadMarkType::None => AdasLineType::NotVisible,
            // Mixed marks depend on the side they are crossed from.
            RoadMarkType::SolidBroken | RoadMarkType::BrokenSolid | RoadMarkType::Other => {
                AdasLineType::Undecided
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AdasLaneInformation {
    NotAvailable,
    Occupied,
    Free,
}

/// Side of the vehicle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LinePosition {
    Left,
    Right,
}

/// Another road user's lane position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrafficPosition {
    pub lane: LaneId,
    pub s: f64,
}

impl PathQuery<'_> {
    /// Nearest lane with non-zero width on `position`'s side of the
    /// vehicle.  Zero-width lanes are stepped over.
    pub fn neighbor_lane(
        &self,
        lane: LaneId,
        position: LinePosition,
        s: f64,
        direction: TravelDirection,
    ) -> Option<LaneId> {
        let network = self.network();
        let l = network.get_lane(lane)?;
        let mut outward = match position {
            LinePosition::Left => direction.is_wrong_way(),
            LinePosition::Right => !direction.is_wrong_way(),
        };

        let mut current = l;
        for _ in 0..network.section(l.section).lanes.len() {
            let next = if outward { current.outer } else { current.inner }?;
            if network.lane_width(next, s) > 0.0 {
                return Some(next);
            }
            let next = network.lane(next);
            if next.is_opposite_to(current) {
                outward = !outward;
            }
            current = next;
        }
        None
    }

    /// Classify a lane by its driving neighbors.
    pub fn adas_lane_type(&self, lane: LaneId, s: f64, direction: TravelDirection) -> AdasLaneType {
        let network = self.network();
        let Some(l) = network.get_lane(lane) else {
            return AdasLaneType::Unknown;
        };
        let drivable = |neighbor: Option<LaneId>| {
            neighbor.is_some_and(|n| {
                network.lane(n).lane_type == LaneType::Driving && network.lane_width(n, s) > 0.0
            })
        };

        match l.lane_type {
            LaneType::Driving => {
                let wrong_way = direction.is_wrong_way();
                match (drivable(l.inner), drivable(l.outer)) {
                    (true, true) => AdasLaneType::MiddleLane,
                    (true, false) if wrong_way => AdasLaneType::LeftMostLane,
                    (true, false) => AdasLaneType::RightMostLane,
                    (false, true) if wrong_way => AdasLaneType::RightMostLane,
                    (false, true) => AdasLaneType::LeftMostLane,
                    (false, false) => AdasLaneType::SingleLaneRoad,
                }
            }
            LaneType::Shoulder => AdasLaneType::EmergencyLane,
            _ => AdasLaneType::Unknown,
        }
    }

    /// Type of the line on `position`'s side of a driving lane.
    ///
    /// A lane's mark is its outer border, so the line between two lanes on
    /// the same side is the mark of the one nearer the center line; between
    /// `±1` it is the center lane's mark.  No driving neighbor
    /// on that side means the road edge.
    pub fn adas_line_type(
        &self,
        lane: LaneId,
        position: LinePosition,
        s: f64,
        direction: TravelDirection,
    ) -> AdasLineType {
        let network = self.network();
        let Some(l) = network.get_lane(lane) else {
            return AdasLineType::Invalid;
        };
        if l.lane_type != LaneType::Driving {
            return AdasLineType::Invalid;
        }
        let Some(neighbor) = self
            .neighbor_lane(lane, position, s, direction)
            .map(|n| network.lane(n))
            .filter(|n| n.lane_type == LaneType::Driving)
        else {
            return AdasLineType::RoadEdge;
        };

        let own_mark = match position {
            LinePosition::Left => direction.is_wrong_way(),
            LinePosition::Right => !direction.is_wrong_way(),
        };
        let mark = if own_mark {
            l.road_mark_at(s)
        } else if l.is_opposite_to(neighbor) {
            network.section(l.section).center_mark_at(s)
        } else {
            neighbor.road_mark_at(s)
        };
        mark.map_or(AdasLineType::Undecided, AdasLineType::from)
    }

    /// Whether the driving lane on `position`'s side has traffic within
    /// `ahead_m` ahead of or `behind_m` behind the vehicle.  Positions in
    /// `traffic` are supplied by the caller.
    #[allow(clippy::too_many_arguments)]
    pub fn lane_information(
        &self,
        lane: LaneId,
        position: LinePosition,
        s: f64,
        direction: TravelDirection,
        traffic: &[TrafficPosition],
        ahead_m: f64,
        behind_m: f64,
    ) -> AdasLaneInformation {
        let network = self.network();
        let Some(neighbor) = self
            .neighbor_lane(lane, position, s, direction)
            .filter(|&n| network.lane(n).lane_type == LaneType::Driving)
        else {
            return AdasLaneInformation::NotAvailable;
        };

        // Neighbors share the section's `s` axis, so the vehicle's own
        // direction of motion applies on either side of the center line.
        let Some(along) = Along::start(network.lane(lane).id, direction, true) else {
            return AdasLaneInformation::NotAvailable;
        };

        let occupied = traffic.iter().any(|other| {
            self.traffic_within(neighbor, s, along, ahead_m, other)
                || self.traffic_within(neighbor, s, along.reversed(), behind_m, other)
        });
        if occupied { AdasLaneInformation::Occupied } else { AdasLaneInformation::Free }
    }

    /// `true` if `other` is within `range_m` of `(lane, s)` walking `along`.
    /// Junction branches take their first candidate.
    fn traffic_within(
        &self,
        lane: LaneId,
        s: f64,
        along: Along,
        range_m: f64,
        other: &TrafficPosition,
    ) -> bool {
        let prefs = PreferredConnections::new();
        let Some(walk) = LaneWalk::new(self.network(), lane, s, along, &prefs, self.config()) else {
            return false;
        };
        for step in walk {
            if step.distance > range_m {
                break;
            }
            if step.lane == other.lane && step.covers(other.s) {
                let distance = step.distance + step.along.sign() * (other.s - step.start_s);
                if (0.0..=range_m).contains(&distance) {
                    return true;
                }
            }
        }
        false
    }
}
