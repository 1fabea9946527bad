//! Lane-surface R-tree.
//!
//! # Data layout
//!
//! Every lane is cut into patches of at most [`IndexConfig::sample_step_m`]
//! along `s`.  A patch is the quad spanned by the lane's inner and outer
//! edge points at both ends, stored as two triangles so a hit can be
//! interpolated in height.  The R-tree (via `rstar`) indexes patch bounding
//! boxes in the world `(x, z)` plane.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use od_core::{RoadId, Vec3};
use od_network::RoadNetwork;
use od_query::{RayHit, SpatialQuery};

use crate::{SpatialError, SpatialResult};

/// Build options for [`LaneSurfaceIndex`].
#[derive(Clone, Debug, PartialEq)]
pub struct IndexConfig {
    /// Maximum patch length along `s`, metres.  Smaller steps follow curves
    /// more closely at the cost of more patches.
    pub sample_step_m: f64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { sample_step_m: 2.0 }
    }
}

// ── Patches ───────────────────────────────────────────────────────────────────

/// One lane patch: corners in order inner(s0), outer(s0), outer(s1),
/// inner(s1), each `[x, y, z]`.
#[derive(Clone, Debug)]
struct Patch {
    road: RoadId,
    lane_id: i32,
    corners: [[f64; 3]; 4],
}

impl Patch {
    fn triangles(&self) -> [[[f64; 3]; 3]; 2] {
        let [a, b, c, d] = self.corners;
        [[a, b, c], [a, c, d]]
    }

    /// Surface height at `(x, z)` if the point lies on the patch.
    fn height_at(&self, x: f64, z: f64) -> Option<f64> {
        self.triangles().iter().find_map(|tri| {
            let (u, v, w) = barycentric(tri, x, z)?;
            Some(u * tri[0][1] + v * tri[1][1] + w * tri[2][1])
        })
    }
}

/// Barycentric weights of `(x, z)` in a triangle's plan projection, or
/// `None` outside it (or for a degenerate triangle).
fn barycentric(tri: &[[f64; 3]; 3], x: f64, z: f64) -> Option<(f64, f64, f64)> {
    const EDGE_SLACK: f64 = 1e-9;
    let [p0, p1, p2] = tri;
    let det = (p1[2] - p2[2]) * (p0[0] - p2[0]) + (p2[0] - p1[0]) * (p0[2] - p2[2]);
    if det.abs() < 1e-12 {
        return None;
    }
    let u = ((p1[2] - p2[2]) * (x - p2[0]) + (p2[0] - p1[0]) * (z - p2[2])) / det;
    let v = ((p2[2] - p0[2]) * (x - p2[0]) + (p0[0] - p2[0]) * (z - p2[2])) / det;
    let w = 1.0 - u - v;
    (u >= -EDGE_SLACK && v >= -EDGE_SLACK && w >= -EDGE_SLACK).then_some((u, v, w))
}

fn segment_distance_2(a: [f64; 3], b: [f64; 3], x: f64, z: f64) -> f64 {
    let (dx, dz) = (b[0] - a[0], b[2] - a[2]);
    let len_2 = dx * dx + dz * dz;
    let t = if len_2 > 0.0 {
        (((x - a[0]) * dx + (z - a[2]) * dz) / len_2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (ex, ez) = (a[0] + t * dx - x, a[2] + t * dz - z);
    ex * ex + ez * ez
}

impl RTreeObject for Patch {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let points: Vec<[f64; 2]> = self.corners.iter().map(|c| [c[0], c[2]]).collect();
        AABB::from_points(points.iter())
    }
}

impl PointDistance for Patch {
    /// Squared plan distance to the patch outline; zero inside.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        if self.contains_point(point) {
            return 0.0;
        }
        let c = self.corners;
        (0..4)
            .map(|i| segment_distance_2(c[i], c[(i + 1) % 4], point[0], point[1]))
            .fold(f64::INFINITY, f64::min)
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.height_at(point[0], point[1]).is_some()
    }
}

// ── LaneSurfaceIndex ──────────────────────────────────────────────────────────

/// Ground and raycast queries against the lane surfaces of a network.
pub struct LaneSurfaceIndex {
    tree: RTree<Patch>,
}

impl LaneSurfaceIndex {
    pub fn build(network: &RoadNetwork) -> SpatialResult<Self> {
        Self::with_config(network, &IndexConfig::default())
    }

    pub fn with_config(network: &RoadNetwork, config: &IndexConfig) -> SpatialResult<Self> {
        let step = config.sample_step_m;
        if !(step.is_finite() && step > 0.0) {
            return Err(SpatialError::InvalidConfig { field: "sample_step_m", value: step });
        }

        let mut patches = Vec::new();
        for lane in &network.lanes {
            let section = network.section(lane.section);
            let length = section.length();
            let n = ((length / step).ceil() as usize).max(1);
            let edge = |i: usize| {
                let s = section.start_s + length * i as f64 / n as f64;
                let (inner, outer) = network.lane_edge_points(lane.handle, s);
                (xyz(inner), xyz(outer), network.lane_width(lane.handle, s))
            };

            let mut previous = edge(0);
            for i in 1..=n {
                let next = edge(i);
                if previous.2 > 0.0 || next.2 > 0.0 {
                    patches.push(Patch {
                        road: lane.road,
                        lane_id: lane.id,
                        corners: [previous.0, previous.1, next.1, next.0],
                    });
                }
                previous = next;
            }
        }
        log::debug!("lane surface index: {} patches over {} lanes", patches.len(), network.lane_count());

        Ok(Self { tree: RTree::bulk_load(patches) })
    }

    /// Number of indexed patches.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Road and signed lane id of the patch nearest to `(x, z)` in plan,
    /// with the plan distance.  `None` only for an empty index.
    pub fn nearest_lane(&self, x: f64, z: f64) -> Option<(RoadId, i32, f64)> {
        self.tree
            .nearest_neighbor(&[x, z])
            .map(|p| (p.road, p.lane_id, p.distance_2(&[x, z]).sqrt()))
    }
}

impl SpatialQuery for LaneSurfaceIndex {
    /// Height of the topmost lane surface below `(x, z)`.
    fn elevation_at(&self, x: f64, z: f64) -> Option<f64> {
        self.raycast_down(x, z).first().map(|hit| hit.contact_y)
    }

    /// Lane surfaces below `(x, z)`, topmost first, one hit per lane.
    fn raycast_down(&self, x: f64, z: f64) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = self
            .tree
            .locate_all_at_point(&[x, z])
            .filter_map(|p| {
                let contact_y = p.height_at(x, z)?;
                Some(RayHit { road: p.road, lane_id: p.lane_id, contact_y })
            })
            .collect();
        hits.sort_by(|a, b| {
            b.contact_y
                .total_cmp(&a.contact_y)
                .then(a.road.cmp(&b.road))
                .then(a.lane_id.cmp(&b.lane_id))
        });
        // Shared patch borders report the same lane twice.
        let mut seen = Vec::with_capacity(hits.len());
        hits.retain(|hit| {
            let key = (hit.road, hit.lane_id);
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });
        hits
    }
}

fn xyz(v: Vec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}
