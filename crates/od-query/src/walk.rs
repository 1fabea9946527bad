//! Bounded, iterative lane walk shared by every path query.
//!
//! A walk starts at `(lane, s)` and moves along the reference line in one
//! direction.  Each [`Step`] covers the rest of one lane.  At the lane end
//! the walk follows the successor link (moving toward increasing `s`) or the
//! predecessor link (decreasing `s`), choosing among junction candidates
//! with the caller's [`PreferredConnections`].  The entry contact of the next
//! lane decides the new direction: entering at `Start` moves toward
//! increasing `s`, entering at `End` toward decreasing `s`.
//!
//! The walk ends at an unresolved link or when either bound in
//! [`QueryConfig`] is hit, so cyclic networks terminate.

use od_core::LaneId;
use od_network::{ContactPoint, Link, PreferredConnections, RoadNetwork, S_TOLERANCE};

use crate::QueryConfig;

/// Vehicle orientation relative to the lane's canonical travel direction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TravelDirection {
    #[default]
    Normal,
    WrongWay,
}

impl TravelDirection {
    pub fn is_wrong_way(self) -> bool {
        self == TravelDirection::WrongWay
    }

    pub fn reversed(self) -> TravelDirection {
        match self {
            TravelDirection::Normal => TravelDirection::WrongWay,
            TravelDirection::WrongWay => TravelDirection::Normal,
        }
    }

    /// `WrongWay` when a vehicle heading points more than 90° away from
    /// the lane's travel heading (both radians).
    pub fn from_headings(lane_travel_heading: f64, vehicle_heading: f64) -> TravelDirection {
        if od_core::heading_diff_deg(lane_travel_heading, vehicle_heading) > 90.0 {
            TravelDirection::WrongWay
        } else {
            TravelDirection::Normal
        }
    }
}

/// Direction of motion along the reference line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Along {
    Increasing,
    Decreasing,
}

impl Along {
    /// Initial walk direction on lane `lane_id`.  Ahead on a right lane
    /// moves toward increasing `s` unless wrong-way; a left lane is the
    /// mirror image.  `None` for the center lane id 0.
    pub fn start(lane_id: i32, direction: TravelDirection, ahead: bool) -> Option<Along> {
        if lane_id == 0 {
            return None;
        }
        let canonical = (lane_id < 0) != direction.is_wrong_way();
        Some(if canonical == ahead { Along::Increasing } else { Along::Decreasing })
    }

    /// Direction after entering a lane at `contact`.
    pub fn entering(contact: ContactPoint) -> Along {
        match contact {
            ContactPoint::Start => Along::Increasing,
            ContactPoint::End => Along::Decreasing,
        }
    }

    pub fn reversed(self) -> Along {
        match self {
            Along::Increasing => Along::Decreasing,
            Along::Decreasing => Along::Increasing,
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            Along::Increasing => 1.0,
            Along::Decreasing => -1.0,
        }
    }
}

/// The part of one lane a walk covers.
#[derive(Copy, Clone, Debug)]
pub struct Step<'a> {
    pub lane: LaneId,
    pub along: Along,
    /// Where the walk entered the lane (the origin `s` on the first step).
    pub start_s: f64,
    /// Lane end in the direction of travel.
    pub end_s: f64,
    /// Distance from the origin to `start_s`.
    pub distance: f64,
    /// Link the walk leaves through at `end_s`.
    pub exit: &'a Link,
}

impl Step<'_> {
    pub fn length(&self) -> f64 {
        (self.end_s - self.start_s).abs()
    }

    /// Distance from the origin to `end_s`.
    pub fn end_distance(&self) -> f64 {
        self.distance + self.length()
    }

    /// Road position `offset` metres past `start_s`.
    pub fn s_at(&self, offset: f64) -> f64 {
        self.start_s + self.along.sign() * offset.clamp(0.0, self.length())
    }

    /// `true` if `s` lies between `start_s` and `end_s`.
    pub fn covers(&self, s: f64) -> bool {
        let (lo, hi) = if self.start_s <= self.end_s {
            (self.start_s, self.end_s)
        } else {
            (self.end_s, self.start_s)
        };
        lo - S_TOLERANCE <= s && s <= hi + S_TOLERANCE
    }
}

/// Iterator over the [`Step`]s of a walk.
pub struct LaneWalk<'a> {
    network: &'a RoadNetwork,
    prefs: &'a PreferredConnections,
    max_distance: f64,
    max_steps: usize,
    next: Option<(LaneId, f64, Along)>,
    distance: f64,
    steps: usize,
}

impl<'a> LaneWalk<'a> {
    /// Start a walk at `(lane, s)`.  `None` when the lane does not exist or
    /// `s` lies outside its section.
    pub fn new(
        network: &'a RoadNetwork,
        lane: LaneId,
        s: f64,
        along: Along,
        prefs: &'a PreferredConnections,
        config: &QueryConfig,
    ) -> Option<Self> {
        let l = network.get_lane(lane)?;
        let section = network.section(l.section);
        if !section.contains(s) {
            return None;
        }
        Some(Self {
            network,
            prefs,
            max_distance: config.max_traversal_m,
            max_steps: config.max_lane_steps,
            next: Some((lane, s.clamp(section.start_s, section.end_s), along)),
            distance: 0.0,
            steps: 0,
        })
    }

    /// Distance covered by the steps yielded so far.
    pub fn distance(&self) -> f64 {
        self.distance
    }
}

impl<'a> Iterator for LaneWalk<'a> {
    type Item = Step<'a>;

    fn next(&mut self) -> Option<Step<'a>> {
        let (lane, start_s, along) = self.next.take()?;
        if self.steps >= self.max_steps || self.distance > self.max_distance {
            log::debug!(
                "walk stopped at lane {lane} after {} lanes and {:.1} m",
                self.steps, self.distance
            );
            return None;
        }
        self.steps += 1;

        let l = self.network.lane(lane);
        let section = self.network.section(l.section);
        let (end_s, exit) = match along {
            Along::Increasing => (section.end_s, &l.successor),
            Along::Decreasing => (section.start_s, &l.predecessor),
        };
        let step = Step { lane, along, start_s, end_s, distance: self.distance, exit };
        self.distance += step.length();

        let network = self.network;
        self.next = self.prefs.choose(network, exit).map(|target| {
            let s = match target.contact {
                ContactPoint::Start => network.lane_start_s(target.lane),
                ContactPoint::End => network.lane_end_s(target.lane),
            };
            (target.lane, s, Along::entering(target.contact))
        });
        Some(step)
    }
}
