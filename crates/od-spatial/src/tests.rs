//! Unit tests for od-spatial.

#[cfg(test)]
mod helpers {
    use od_network::{
        Document, GeometryRecord, LaneRecord, LaneSectionRecord, NetworkConfig, PolyRecord,
        RoadNetwork, RoadRecord,
    };

    fn lanes() -> LaneSectionRecord {
        LaneSectionRecord::new(0.0)
            .with_lane(LaneRecord::driving(1, 3.5))
            .with_lane(LaneRecord::driving(-1, 3.5))
    }

    /// `Ground` runs east along y = 0.  `Bridge` crosses it heading north at
    /// x = 50 with its deck 6 m up.  `Ramp` climbs 1 m per 10 m, parallel to
    /// `Ground` at y = 40.
    pub fn crossing() -> RoadNetwork {
        let document = Document::new()
            .with_road(RoadRecord::new("Ground", 100.0).straight(0.0, 0.0, 0.0).with_section(lanes()))
            .with_road(
                RoadRecord::new("Bridge", 100.0)
                    .with_geometry(GeometryRecord::line(0.0, 50.0, -50.0, std::f64::consts::FRAC_PI_2, 100.0))
                    .with_elevation(PolyRecord::new(0.0, 6.0, 0.0, 0.0, 0.0))
                    .with_section(lanes()),
            )
            .with_road(
                RoadRecord::new("Ramp", 100.0)
                    .straight(0.0, 40.0, 0.0)
                    .with_elevation(PolyRecord::new(0.0, 0.0, 0.1, 0.0, 0.0))
                    .with_section(lanes()),
            );
        RoadNetwork::from_document(document, &NetworkConfig::default()).expect("valid document")
    }
}

#[cfg(test)]
mod index {
    use approx::assert_abs_diff_eq;

    use od_query::{ExpectedLanes, SpatialQuery, VehiclePose, most_probable_lane};

    use super::helpers::crossing;
    use crate::{IndexConfig, LaneSurfaceIndex, SpatialError};

    #[test]
    fn rejects_bad_step() {
        let net = crossing();
        let err = LaneSurfaceIndex::with_config(&net, &IndexConfig { sample_step_m: 0.0 }).err().unwrap();
        assert!(matches!(err, SpatialError::InvalidConfig { field: "sample_step_m", .. }));
    }

    #[test]
    fn patches_cover_every_lane() {
        let net = crossing();
        let index = LaneSurfaceIndex::build(&net).unwrap();
        // 3 roads × 2 lanes × 50 patches of 2 m.
        assert_eq!(index.len(), 300);
        assert!(!index.is_empty());
    }

    #[test]
    fn raycast_on_a_single_lane() {
        let net = crossing();
        let index = LaneSurfaceIndex::build(&net).unwrap();
        let ground = net.road_by_id("Ground").unwrap();

        // World z = -y: lane -1 of Ground lies at 0 < z < 3.5.
        let hits = index.raycast_down(20.0, 1.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].road, ground);
        assert_eq!(hits[0].lane_id, -1);
        assert_abs_diff_eq!(hits[0].contact_y, 0.0, epsilon = 1e-9);

        let left = index.raycast_down(20.0, -1.0);
        assert_eq!(left[0].lane_id, 1);
    }

    #[test]
    fn stacked_surfaces_topmost_first() {
        let net = crossing();
        let index = LaneSurfaceIndex::build(&net).unwrap();
        let hits = index.raycast_down(51.0, 1.0);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].road, net.road_by_id("Bridge").unwrap());
        assert_abs_diff_eq!(hits[0].contact_y, 6.0, epsilon = 1e-9);
        assert_eq!(hits[1].road, net.road_by_id("Ground").unwrap());
        assert_abs_diff_eq!(index.elevation_at(51.0, 1.0).unwrap(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn height_is_interpolated() {
        let net = crossing();
        let index = LaneSurfaceIndex::build(&net).unwrap();
        // Ramp lane -1 at x = 33: document y in (36.5, 40) → world z in (-40, -36.5).
        assert_abs_diff_eq!(index.elevation_at(33.0, -38.0).unwrap(), 3.3, epsilon = 1e-9);
    }

    #[test]
    fn off_road_is_empty() {
        let net = crossing();
        let index = LaneSurfaceIndex::build(&net).unwrap();
        assert!(index.raycast_down(20.0, 20.0).is_empty());
        assert!(index.elevation_at(20.0, 20.0).is_none());
        let (road, lane_id, distance) = index.nearest_lane(20.0, 20.0).unwrap();
        assert_eq!(road, net.road_by_id("Ground").unwrap());
        assert_eq!(lane_id, -1);
        assert_abs_diff_eq!(distance, 16.5, epsilon = 1e-9);
    }

    #[test]
    fn drives_the_locator() {
        let net = crossing();
        let index = LaneSurfaceIndex::build(&net).unwrap();
        let expected = ExpectedLanes::new();
        let on_ground = VehiclePose { position: od_core::Vec3 { x: 51.0, y: 0.2, z: 1.0 }, heading: 0.0 };
        let lane = most_probable_lane(&net, &index, &on_ground, &expected).unwrap();
        assert_eq!(net.lane(lane).road, net.road_by_id("Ground").unwrap());

        let on_bridge = VehiclePose {
            position: od_core::Vec3 { x: 51.0, y: 6.1, z: 1.0 },
            heading: std::f64::consts::FRAC_PI_2,
        };
        let lane = most_probable_lane(&net, &index, &on_bridge, &expected).unwrap();
        assert_eq!(net.lane(lane).road, net.road_by_id("Bridge").unwrap());
    }
}
