//! Caller-supplied tie-break list for junction fan-outs.

use od_core::{ConnectionId, RoadId};

use crate::model::{LaneRef, Link};
use crate::network::RoadNetwork;

/// One preference entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Preference {
    /// Take this junction connection.
    Connection(ConnectionId),
    /// Take whichever candidate lands on this road.
    Road(RoadId),
}

/// Ordered preference list consulted when a link has several candidates.
///
/// The engine never stores one; callers build it (often from
/// [`crate::LanePath::to_preferred_connections`]) and pass it per query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreferredConnections {
    entries: Vec<Preference>,
}

impl PreferredConnections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, preference: Preference) {
        self.entries.push(preference);
    }

    pub fn push_connection(&mut self, connection: ConnectionId) {
        self.push(Preference::Connection(connection));
    }

    pub fn with_connection(mut self, connection: ConnectionId) -> Self {
        self.push(Preference::Connection(connection));
        self
    }

    pub fn with_road(mut self, road: RoadId) -> Self {
        self.push(Preference::Road(road));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preference> + '_ {
        self.entries.iter()
    }

    fn matches(&self, network: &RoadNetwork, connection: Option<ConnectionId>, target: LaneRef) -> bool {
        let road = network.lane(target.lane).road;
        self.entries.iter().any(|p| match *p {
            Preference::Connection(c) => connection == Some(c),
            Preference::Road(r) => r == road,
        })
    }

    /// Pick the continuation of `link`.
    ///
    /// Candidates are scanned in document order; the first one any entry
    /// matches wins, otherwise the first candidate.  `None` only for an
    /// unresolved link.
    pub fn choose(&self, network: &RoadNetwork, link: &Link) -> Option<LaneRef> {
        match link {
            Link::Unresolved => None,
            Link::Direct(target) => Some(*target),
            Link::ViaJunction { candidates, .. } => candidates
                .iter()
                .find(|&&(c, t)| self.matches(network, Some(c), t))
                .or_else(|| candidates.first())
                .map(|&(_, t)| t),
        }
    }
}

impl FromIterator<Preference> for PreferredConnections {
    fn from_iter<I: IntoIterator<Item = Preference>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}
