//! Strongly typed, zero-cost handle wrappers.
//!
//! Every road, lane section, lane, junction and junction connection gets an
//! arena handle when a document is loaded.  Authored string ids only exist in
//! the loader's name tables; everything past the load boundary speaks in
//! handles.  All handles are `Copy + Ord + Hash` so they work as map keys and
//! sort keys without ceremony.

use std::fmt;

/// Generate a typed handle wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid handle".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as an arena index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized handles are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a road in the network arena.
    pub struct RoadId(u32);
}

typed_id! {
    /// Index of a lane section.  Sections of one road are stored contiguously
    /// in ascending `s` order.
    pub struct SectionId(u32);
}

typed_id! {
    /// Index of a lane.  This is the handle, not the signed OpenDRIVE lane id;
    /// the signed id lives on the lane itself.
    pub struct LaneId(u32);
}

typed_id! {
    /// Index of a junction.
    pub struct JunctionId(u32);
}

typed_id! {
    /// Index of a junction connection.  Unique across the whole network, so
    /// a connection handle alone identifies its junction as well.
    pub struct ConnectionId(u32);
}

typed_id! {
    /// Index of a lane-graph node (one per lane end).
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed lane-graph edge.
    pub struct EdgeId(u32);
}
