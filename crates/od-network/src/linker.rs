//! Topology linker: lane link declarations → resolved [`Link`]s.
//!
//! Runs once, after every road, section and junction exists, because a
//! junction link can only be resolved by scanning the junction's connection
//! table for connections whose incoming road is the lane's road.
//!
//! | Declaration                       | Target section            | Entry contact      |
//! |-----------------------------------|---------------------------|--------------------|
//! | successor, not the last section   | next section, same road   | `Start`            |
//! | predecessor, not the first section| previous section          | `End`              |
//! | road link to road `R`, contact `c`| first (`Start`) / last (`End`) section of `R` | `c` |
//! | road link to junction `J`         | per connection of `J` from this road | connection contact |
//!
//! A missing lane on an existing road is logged and left unresolved, unless
//! [`NetworkConfig::strict_links`] turns it into [`LoadError::DanglingLane`].

use od_core::{ConnectionId, JunctionId};

use crate::model::{Connection, ContactPoint, Junction, Lane, LaneRef, LaneSection, Link, Road, RoadLink};
use crate::{LoadError, LoadResult, NetworkConfig};

/// Summary of a linking pass, for the load log line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub resolved: usize,
    pub via_junction: usize,
    pub unresolved: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Direction {
    Predecessor,
    Successor,
}

impl Direction {
    fn name(self) -> &'static str {
        match self {
            Direction::Predecessor => "predecessor",
            Direction::Successor => "successor",
        }
    }
}

struct Linker<'a> {
    roads: &'a [Road],
    sections: &'a [LaneSection],
    junctions: &'a [Junction],
    connections: &'a [Connection],
    config: &'a NetworkConfig,
}

/// Resolve every lane's predecessor and successor in place.
pub(crate) fn link_lanes(
    roads: &[Road],
    sections: &[LaneSection],
    lanes: &mut [Lane],
    junctions: &[Junction],
    connections: &[Connection],
    config: &NetworkConfig,
) -> LoadResult<LinkStats> {
    // Resolve against an immutable view first, then write back.
    let resolved: Vec<(Link, Link)> = {
        let linker = Linker { roads, sections, junctions, connections, config };
        lanes
            .iter()
            .map(|lane| {
                Ok((
                    linker.resolve(lane, Direction::Predecessor)?,
                    linker.resolve(lane, Direction::Successor)?,
                ))
            })
            .collect::<LoadResult<_>>()?
    };

    let mut stats = LinkStats::default();
    for (lane, (predecessor, successor)) in lanes.iter_mut().zip(resolved) {
        for link in [&predecessor, &successor] {
            match link {
                Link::Unresolved => stats.unresolved += 1,
                Link::Direct(_) => stats.resolved += 1,
                Link::ViaJunction { .. } => {
                    stats.resolved += 1;
                    stats.via_junction += 1;
                }
            }
        }
        lane.predecessor = predecessor;
        lane.successor = successor;
    }
    Ok(stats)
}

impl Linker<'_> {
    fn resolve(&self, lane: &Lane, direction: Direction) -> LoadResult<Link> {
        let road = &self.roads[lane.road.index()];
        let section = &self.sections[lane.section.index()];
        let declared = match direction {
            Direction::Predecessor => lane.declared_predecessor,
            Direction::Successor => lane.declared_successor,
        };

        // ── Inside the road ───────────────────────────────────────────────
        let neighbor_section = match direction {
            Direction::Successor => road.sections.get(section.index + 1),
            Direction::Predecessor => section.index.checked_sub(1).and_then(|i| road.sections.get(i)),
        };
        if let Some(&next) = neighbor_section {
            let Some(target_id) = declared else { return Ok(Link::Unresolved) };
            let contact = match direction {
                Direction::Successor => ContactPoint::Start,
                Direction::Predecessor => ContactPoint::End,
            };
            return self.direct(lane, direction, &self.sections[next.index()], target_id, contact);
        }

        // ── Across a road end ─────────────────────────────────────────────
        let road_link = match direction {
            Direction::Predecessor => road.predecessor,
            Direction::Successor => road.successor,
        };
        match road_link {
            None => Ok(Link::Unresolved),
            Some(RoadLink::Road { road: target, contact }) => {
                let Some(target_id) = declared else { return Ok(Link::Unresolved) };
                let target_road = &self.roads[target.index()];
                let target_section = &self.sections[target_road.section_at_contact(contact).index()];
                self.direct(lane, direction, target_section, target_id, contact)
            }
            Some(RoadLink::Junction(junction)) => self.via_junction(lane, direction, junction),
        }
    }

    fn direct(
        &self,
        lane: &Lane,
        direction: Direction,
        target_section: &LaneSection,
        target_id: i32,
        contact: ContactPoint,
    ) -> LoadResult<Link> {
        match target_section.lane(target_id) {
            Some(target) => Ok(Link::Direct(LaneRef { lane: target, contact })),
            None => {
                self.dangling(lane, direction, target_id, target_section)?;
                Ok(Link::Unresolved)
            }
        }
    }

    fn via_junction(&self, lane: &Lane, direction: Direction, junction: JunctionId) -> LoadResult<Link> {
        let mut candidates: Vec<(ConnectionId, LaneRef)> = Vec::new();
        for &conn_id in &self.junctions[junction.index()].connections {
            let conn = &self.connections[conn_id.index()];
            if conn.incoming_road != lane.road {
                continue;
            }
            let connecting = &self.roads[conn.connecting_road.index()];
            let target_section = &self.sections[connecting.section_at_contact(conn.contact_point).index()];
            for &(from, to) in &conn.lane_links {
                if from != lane.id {
                    continue;
                }
                match target_section.lane(to) {
                    Some(target) => {
                        candidates.push((conn_id, LaneRef { lane: target, contact: conn.contact_point }))
                    }
                    None => self.dangling(lane, direction, to, target_section)?,
                }
            }
        }

        if candidates.is_empty() {
            return Ok(Link::Unresolved);
        }
        Ok(Link::ViaJunction { junction, candidates })
    }

    fn dangling(
        &self,
        lane: &Lane,
        direction: Direction,
        target: i32,
        target_section: &LaneSection,
    ) -> LoadResult<()> {
        let road = &self.roads[lane.road.index()].id;
        let target_road = &self.roads[target_section.road.index()].id;
        if self.config.strict_links {
            return Err(LoadError::DanglingLane {
                road: road.clone(),
                lane: lane.id,
                direction: direction.name(),
                target,
                target_road: target_road.clone(),
            });
        }
        log::warn!(
            "road {road:?}, lane {}: {} lane {target} not found on road {target_road:?}; link left unresolved",
            lane.id,
            direction.name(),
        );
        Ok(())
    }
}
