//! Spatial capability consumed by the locator and terrain projection.
//!
//! The engine does not own a scene.  Whatever does (a renderer's collision
//! world, the R-tree in `od-spatial`, a test double) implements
//! [`SpatialQuery`] and is passed into each call.

use od_core::RoadId;

/// A surface hit below a world position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    pub road: RoadId,
    /// Signed lane id on `road`.
    pub lane_id: i32,
    /// World `y` of the hit surface.
    pub contact_y: f64,
}

/// Vertical queries against the world, in world coordinates (y-up).
pub trait SpatialQuery {
    /// Ground height below `(x, z)`, if any ground exists there.
    fn elevation_at(&self, x: f64, z: f64) -> Option<f64>;

    /// Every lane surface below `(x, z)`, in the order the implementation
    /// ranks them.  Empty when off-road.
    fn raycast_down(&self, x: f64, z: f64) -> Vec<RayHit>;
}

impl<T: SpatialQuery + ?Sized> SpatialQuery for &T {
    fn elevation_at(&self, x: f64, z: f64) -> Option<f64> {
        (**self).elevation_at(x, z)
    }

    fn raycast_down(&self, x: f64, z: f64) -> Vec<RayHit> {
        (**self).raycast_down(x, z)
    }
}
