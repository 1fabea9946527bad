//! Unit tests for od-network.
//!
//! Every test builds its network in code, so no fixture files are needed.

#[cfg(test)]
mod helpers {
    use std::f64::consts::{FRAC_PI_2, PI};

    use crate::{
        ConnectionRecord, ContactPoint, Document, GeometryRecord, JunctionRecord, LaneRecord,
        LaneSectionRecord, LinkTargetRecord, NetworkConfig, RoadNetwork, RoadRecord,
    };

    /// Length of the left-turning connector `C2` (a quarter circle, r = 10).
    pub const C2_LENGTH: f64 = 5.0 * PI;

    /// A fork through junction `J`.
    ///
    /// ```text
    ///                     D (north, 50 m)
    ///                     ↑
    ///                    C2 (left quarter arc)
    ///                   /
    ///   A (east, 100 m) ─ J ── C1 (20 m) ── B (east, 100 m)
    /// ```
    ///
    /// Every road carries right lane -1 (3.5 m); `A` also has left lane 1.
    /// Connection `"0"` (A → C1) is listed before `"1"` (A → C2).
    pub fn fork_document() -> Document {
        let right = || LaneSectionRecord::new(0.0);
        Document::new()
            .with_road(
                RoadRecord::new("A", 100.0)
                    .straight(0.0, 0.0, 0.0)
                    .with_successor(LinkTargetRecord::junction("J"))
                    .with_section(
                        right()
                            .with_lane(LaneRecord::driving(1, 3.5))
                            .with_lane(LaneRecord::driving(-1, 3.5)),
                    ),
            )
            .with_road(
                RoadRecord::new("C1", 20.0)
                    .straight(100.0, 0.0, 0.0)
                    .in_junction("J")
                    .with_predecessor(LinkTargetRecord::road("A", ContactPoint::End))
                    .with_successor(LinkTargetRecord::road("B", ContactPoint::Start))
                    .with_section(right().with_lane(LaneRecord::driving(-1, 3.5).predecessor(-1).successor(-1))),
            )
            .with_road(
                RoadRecord::new("C2", C2_LENGTH)
                    .with_geometry(GeometryRecord::arc(0.0, 100.0, 0.0, 0.0, C2_LENGTH, 0.1))
                    .in_junction("J")
                    .with_predecessor(LinkTargetRecord::road("A", ContactPoint::End))
                    .with_successor(LinkTargetRecord::road("D", ContactPoint::Start))
                    .with_section(right().with_lane(LaneRecord::driving(-1, 3.5).predecessor(-1).successor(-1))),
            )
            .with_road(
                RoadRecord::new("B", 100.0)
                    .straight(120.0, 0.0, 0.0)
                    .with_predecessor(LinkTargetRecord::road("C1", ContactPoint::End))
                    .with_section(right().with_lane(LaneRecord::driving(-1, 3.5).predecessor(-1))),
            )
            .with_road(
                RoadRecord::new("D", 50.0)
                    .straight(110.0, 10.0, FRAC_PI_2)
                    .with_predecessor(LinkTargetRecord::road("C2", ContactPoint::End))
                    .with_section(right().with_lane(LaneRecord::driving(-1, 3.5).predecessor(-1))),
            )
            .with_junction(
                JunctionRecord::new("J")
                    .with_connection(ConnectionRecord::new("0", "A", "C1", ContactPoint::Start).lane_link(-1, -1))
                    .with_connection(ConnectionRecord::new("1", "A", "C2", ContactPoint::Start).lane_link(-1, -1)),
            )
    }

    pub fn fork() -> RoadNetwork {
        RoadNetwork::from_document(fork_document(), &NetworkConfig::default()).expect("valid fork")
    }

    /// A single straight road along +x with the given sections.
    pub fn single_road(length: f64, sections: Vec<LaneSectionRecord>) -> RoadRecord {
        sections
            .into_iter()
            .fold(RoadRecord::new("R", length).straight(0.0, 0.0, 0.0), RoadRecord::with_section)
    }

    pub fn build(roads: Vec<RoadRecord>) -> crate::LoadResult<RoadNetwork> {
        let document = roads.into_iter().fold(Document::new(), Document::with_road);
        RoadNetwork::from_document(document, &NetworkConfig::default())
    }

    /// Lane handle by authored road id and signed lane id at `s`.
    pub fn lane(net: &RoadNetwork, road: &str, lane_id: i32, s: f64) -> od_core::LaneId {
        let road = net.road_by_id(road).expect("road exists");
        net.lane_at(road, lane_id, s).expect("lane exists")
    }
}

// ── Builder & validation ──────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use super::helpers::{build, single_road};
    use crate::{
        Document, ElementType, GeometryRecord, LaneRecord, LaneSectionRecord, LinkTargetRecord,
        LoadError, NetworkBuilder, NetworkConfig, RoadRecord,
    };

    #[test]
    fn empty_build() {
        let net = NetworkBuilder::new(NetworkConfig::default()).build().unwrap();
        assert!(net.is_empty());
        assert_eq!(net.lane_count(), 0);
        assert!(net.graph.is_empty());
    }

    #[test]
    fn arenas_are_contiguous() {
        let net = build(vec![single_road(
            100.0,
            vec![
                LaneSectionRecord::new(0.0)
                    .with_lane(LaneRecord::driving(-2, 3.0))
                    .with_lane(LaneRecord::driving(-1, 3.5))
                    .with_lane(LaneRecord::driving(1, 3.5)),
                LaneSectionRecord::new(60.0).with_lane(LaneRecord::driving(-1, 3.5)),
            ],
        )])
        .unwrap();
        assert_eq!(net.section_count(), 2);
        assert_eq!(net.lane_count(), 4);
        let first = net.section(net.road(od_core::RoadId(0)).first_section());
        let ids: Vec<i32> = first.lanes.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![-2, -1, 1]);
        assert_eq!(first.end_s, 60.0);
        assert_eq!(net.section(net.road(od_core::RoadId(0)).last_section()).end_s, 100.0);
    }

    #[test]
    fn duplicate_road_rejected() {
        let road = || single_road(10.0, vec![LaneSectionRecord::new(0.0).with_lane(LaneRecord::driving(-1, 3.0))]);
        let err = build(vec![road(), road()]).err().unwrap();
        assert!(matches!(err, LoadError::DuplicateRoad(ref id) if id == "R"));
    }

    #[test]
    fn center_lane_rejected() {
        let err = build(vec![single_road(10.0, vec![LaneSectionRecord::new(0.0).with_lane(LaneRecord::driving(0, 3.0))])])
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::CenterLane { .. }));
    }

    #[test]
    fn lane_gap_rejected() {
        let section = LaneSectionRecord::new(0.0)
            .with_lane(LaneRecord::driving(-1, 3.0))
            .with_lane(LaneRecord::driving(-3, 3.0));
        let err = build(vec![single_road(10.0, vec![section])]).err().unwrap();
        assert!(matches!(err, LoadError::NonContiguousLanes { .. }));
    }

    #[test]
    fn duplicate_lane_rejected() {
        let section = LaneSectionRecord::new(0.0)
            .with_lane(LaneRecord::driving(-1, 3.0))
            .with_lane(LaneRecord::driving(-1, 3.0));
        let err = build(vec![single_road(10.0, vec![section])]).err().unwrap();
        assert!(matches!(err, LoadError::DuplicateLane { lane: -1, .. }));
    }

    #[test]
    fn road_without_sections_rejected() {
        let err = build(vec![single_road(10.0, vec![])]).err().unwrap();
        assert!(matches!(err, LoadError::NoLaneSections { .. }));
    }

    #[test]
    fn sections_out_of_order_rejected() {
        let sections = vec![
            LaneSectionRecord::new(0.0).with_lane(LaneRecord::driving(-1, 3.0)),
            LaneSectionRecord::new(0.0).with_lane(LaneRecord::driving(-1, 3.0)),
        ];
        let err = build(vec![single_road(10.0, sections)]).err().unwrap();
        assert!(matches!(err, LoadError::SectionOrder { .. }));
    }

    #[test]
    fn invalid_length_rejected() {
        let err = build(vec![single_road(0.0, vec![LaneSectionRecord::new(0.0)])]).err().unwrap();
        assert!(matches!(err, LoadError::InvalidLength { .. }));
    }

    #[test]
    fn empty_plan_view_rejected() {
        let road = RoadRecord::new("R", 10.0).with_section(LaneSectionRecord::new(0.0));
        let err = build(vec![road]).err().unwrap();
        assert!(matches!(err, LoadError::Geometry { .. }));
    }

    #[test]
    fn unknown_road_link_rejected() {
        let road = single_road(10.0, vec![LaneSectionRecord::new(0.0)])
            .with_successor(LinkTargetRecord::road("nowhere", crate::ContactPoint::Start));
        let err = build(vec![road]).err().unwrap();
        assert!(matches!(err, LoadError::UnknownRoad { ref target, .. } if target == "nowhere"));
    }

    #[test]
    fn unknown_junction_rejected() {
        let road = single_road(10.0, vec![LaneSectionRecord::new(0.0)])
            .with_successor(LinkTargetRecord::junction("J9"));
        let err = build(vec![road]).err().unwrap();
        assert!(matches!(err, LoadError::UnknownJunction { .. }));
    }

    #[test]
    fn road_link_needs_contact_point() {
        let a = RoadRecord::new("A", 10.0)
            .straight(0.0, 0.0, 0.0)
            .with_section(LaneSectionRecord::new(0.0))
            .with_successor(LinkTargetRecord {
                element_type: ElementType::Road,
                element_id: "B".into(),
                contact_point: None,
            });
        let b = RoadRecord::new("B", 10.0).straight(10.0, 0.0, 0.0).with_section(LaneSectionRecord::new(0.0));
        let err = build(vec![a, b]).err().unwrap();
        assert!(matches!(err, LoadError::MissingContactPoint { .. }));
    }

    #[test]
    fn connection_to_unknown_road_rejected() {
        use crate::{ConnectionRecord, ContactPoint, JunctionRecord};
        let document = Document::new()
            .with_road(single_road(10.0, vec![LaneSectionRecord::new(0.0)]))
            .with_junction(JunctionRecord::new("J").with_connection(ConnectionRecord::new(
                "0",
                "R",
                "ghost",
                ContactPoint::Start,
            )));
        let err = crate::RoadNetwork::from_document(document, &NetworkConfig::default()).err().unwrap();
        assert!(matches!(err, LoadError::UnknownConnectionRoad { .. }));
    }

    #[test]
    fn neighbors_cross_center_line() {
        let section = LaneSectionRecord::new(0.0)
            .with_lane(LaneRecord::driving(2, 3.0))
            .with_lane(LaneRecord::driving(1, 3.0))
            .with_lane(LaneRecord::driving(-1, 3.0))
            .with_lane(LaneRecord::driving(-2, 3.0));
        let net = build(vec![single_road(10.0, vec![section])]).unwrap();
        let id = |lane_id| super::helpers::lane(&net, "R", lane_id, 0.0);
        assert_eq!(net.lane(id(-1)).inner, Some(id(1)));
        assert_eq!(net.lane(id(-1)).outer, Some(id(-2)));
        assert_eq!(net.lane(id(1)).inner, Some(id(-1)));
        assert_eq!(net.lane(id(2)).inner, Some(id(1)));
        assert_eq!(net.lane(id(2)).outer, None);
        assert!(net.lane(id(2)).is_opposite_to(net.lane(id(-2))));
        assert!(!net.lane(id(1)).is_opposite_to(net.lane(id(2))));
    }

    #[test]
    fn opposite_sides_with_extreme_ids() {
        use crate::model::opposite_sides;
        assert!(opposite_sides(i32::MAX, i32::MIN));
        assert!(opposite_sides(-70_000, 70_000));
        assert!(!opposite_sides(i32::MAX, i32::MAX));
        assert!(!opposite_sides(i32::MIN, -1));
        assert!(!opposite_sides(0, -1));
    }

    #[test]
    fn plan_view_length_mismatch() {
        let road = || {
            RoadRecord::new("R", 120.0)
                .with_geometry(GeometryRecord::line(0.0, 0.0, 0.0, 0.0, 100.0))
                .with_section(LaneSectionRecord::new(0.0).with_lane(LaneRecord::driving(-1, 3.5)))
        };
        let net = build(vec![road()]).unwrap();
        assert_eq!(net.road_count(), 1);

        let config = NetworkConfig { strict_geometry: true, ..NetworkConfig::default() };
        let mut b = NetworkBuilder::new(config);
        b.add_road(road());
        match b.build().err().unwrap() {
            LoadError::LengthMismatch { road, plan_view, length } => {
                assert_eq!(road, "R");
                assert!((plan_view - 100.0).abs() < 1e-6);
                assert_eq!(length, 120.0);
            }
            other => panic!("unexpected error {other}"),
        }
    }
}

// ── Topology linking ──────────────────────────────────────────────────────────

#[cfg(test)]
mod linker {
    use super::helpers::{build, fork, lane, single_road};
    use crate::{
        ContactPoint, Document, LaneRecord, LaneRef, LaneSectionRecord, Link, LinkTargetRecord,
        LoadError, NetworkConfig, RoadNetwork, RoadRecord,
    };

    #[test]
    fn junction_fan_out_keeps_document_order() {
        let net = fork();
        let a = lane(&net, "A", -1, 50.0);
        let junction = net.junction_by_id("J").unwrap();
        let c0 = net.connection_by_id(junction, "0").unwrap();
        let c1 = net.connection_by_id(junction, "1").unwrap();
        let expected = Link::ViaJunction {
            junction,
            candidates: vec![
                (c0, LaneRef { lane: lane(&net, "C1", -1, 0.0), contact: ContactPoint::Start }),
                (c1, LaneRef { lane: lane(&net, "C2", -1, 0.0), contact: ContactPoint::Start }),
            ],
        };
        assert_eq!(net.lane(a).successor, expected);
        assert_eq!(net.lane(a).successor.target_count(), 2);
    }

    #[test]
    fn direct_link_across_roads() {
        let net = fork();
        let c1 = lane(&net, "C1", -1, 0.0);
        assert_eq!(
            net.lane(c1).predecessor,
            Link::Direct(LaneRef { lane: lane(&net, "A", -1, 0.0), contact: ContactPoint::End })
        );
        assert_eq!(
            net.lane(c1).successor,
            Link::Direct(LaneRef { lane: lane(&net, "B", -1, 0.0), contact: ContactPoint::Start })
        );
    }

    #[test]
    fn unlinked_ends_are_unresolved() {
        let net = fork();
        assert_eq!(net.lane(lane(&net, "A", 1, 0.0)).predecessor, Link::Unresolved);
        assert_eq!(net.lane(lane(&net, "B", -1, 0.0)).successor, Link::Unresolved);
    }

    #[test]
    fn sections_link_inside_road() {
        let net = build(vec![single_road(
            100.0,
            vec![
                LaneSectionRecord::new(0.0).with_lane(LaneRecord::driving(-1, 3.5).successor(-1)),
                LaneSectionRecord::new(40.0).with_lane(LaneRecord::driving(-1, 3.5).predecessor(-1)),
            ],
        )])
        .unwrap();
        let first = lane(&net, "R", -1, 10.0);
        let second = lane(&net, "R", -1, 70.0);
        assert_eq!(net.lane(first).successor, Link::Direct(LaneRef { lane: second, contact: ContactPoint::Start }));
        assert_eq!(net.lane(second).predecessor, Link::Direct(LaneRef { lane: first, contact: ContactPoint::End }));
    }

    fn dangling_document() -> Document {
        Document::new()
            .with_road(
                RoadRecord::new("A", 10.0)
                    .straight(0.0, 0.0, 0.0)
                    .with_successor(LinkTargetRecord::road("B", ContactPoint::Start))
                    .with_section(LaneSectionRecord::new(0.0).with_lane(LaneRecord::driving(-1, 3.5).successor(-2))),
            )
            .with_road(
                RoadRecord::new("B", 10.0)
                    .straight(10.0, 0.0, 0.0)
                    .with_section(LaneSectionRecord::new(0.0).with_lane(LaneRecord::driving(-1, 3.5))),
            )
    }

    #[test]
    fn dangling_lane_is_unresolved_by_default() {
        let net = RoadNetwork::from_document(dangling_document(), &NetworkConfig::default()).unwrap();
        assert_eq!(net.lane(lane(&net, "A", -1, 0.0)).successor, Link::Unresolved);
    }

    #[test]
    fn dangling_lane_is_fatal_when_strict() {
        let config = NetworkConfig { strict_links: true, ..NetworkConfig::default() };
        let err = RoadNetwork::from_document(dangling_document(), &config).err().unwrap();
        match err {
            LoadError::DanglingLane { road, lane, direction, target, target_road } => {
                assert_eq!(road, "A");
                assert_eq!(lane, -1);
                assert_eq!(direction, "successor");
                assert_eq!(target, -2);
                assert_eq!(target_road, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fork_is_continuous() {
        assert!(fork().continuity_gaps(0.01).is_empty());
    }
}

// ── Lane graph ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod graph {
    use od_core::{LaneId, NodeId};

    use super::helpers::{fork, lane};
    use crate::{ContactPoint, RoadGraph};

    #[test]
    fn node_addressing() {
        let node = RoadGraph::node(LaneId(3), ContactPoint::End);
        assert_eq!(node, NodeId(7));
        assert_eq!(RoadGraph::node_lane(node), LaneId(3));
        assert_eq!(RoadGraph::node_exit(node), ContactPoint::End);
        assert_eq!(RoadGraph::node_exit(NodeId(6)), ContactPoint::Start);
    }

    #[test]
    fn two_nodes_per_lane() {
        let net = fork();
        assert_eq!(net.graph.node_count(), 2 * net.lane_count());
    }

    #[test]
    fn successors_enumerate_every_branch() {
        let net = fork();
        let a = lane(&net, "A", -1, 0.0);
        let succ: Vec<_> = net.graph.successors(a).collect();
        assert_eq!(succ, vec![lane(&net, "C1", -1, 0.0), lane(&net, "C2", -1, 0.0)]);
    }

    #[test]
    fn predecessors_follow_links_backwards() {
        let net = fork();
        let b = lane(&net, "B", -1, 0.0);
        let pred: Vec<_> = net.graph.predecessors(b).collect();
        assert_eq!(pred, vec![lane(&net, "C1", -1, 0.0)]);
    }

    #[test]
    fn junction_edges_carry_connection() {
        let net = fork();
        let a = lane(&net, "A", -1, 0.0);
        let node = RoadGraph::node(a, ContactPoint::End);
        assert_eq!(net.graph.out_degree(node), 2);
        for edge in net.graph.out_edges(node) {
            assert!(net.graph.edge_connection[edge.index()].is_some());
            assert_eq!(net.graph.edge_length_m[edge.index()], 100.0);
        }
    }

    #[test]
    fn csr_offsets_cover_every_edge() {
        let net = fork();
        let g = &net.graph;
        assert_eq!(*g.node_out_start.last().unwrap() as usize, g.edge_count());
        for w in g.node_out_start.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod router {
    use approx::assert_abs_diff_eq;
    use od_core::LaneId;

    use super::helpers::{C2_LENGTH, fork, lane};
    use crate::{DijkstraRouter, Preference, RouteError, Router};

    #[test]
    fn routes_through_left_branch() {
        let net = fork();
        let from = lane(&net, "A", -1, 0.0);
        let to = lane(&net, "D", -1, 0.0);
        let path = DijkstraRouter.route(&net, from, to).unwrap();
        assert_eq!(path.lanes(&net.graph), vec![from, lane(&net, "C2", -1, 0.0), to]);
        assert_abs_diff_eq!(path.total_length_m, 100.0 + C2_LENGTH, epsilon = 1e-3);

        let junction = net.junction_by_id("J").unwrap();
        let prefs = path.to_preferred_connections(&net.graph);
        let expected = vec![Preference::Connection(net.connection_by_id(junction, "1").unwrap())];
        assert_eq!(prefs.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn routes_straight_on() {
        let net = fork();
        let path = DijkstraRouter
            .route(&net, lane(&net, "A", -1, 0.0), lane(&net, "B", -1, 0.0))
            .unwrap();
        assert_eq!(path.edges.len(), 2);
        assert_abs_diff_eq!(path.total_length_m, 120.0, epsilon = 1e-9);
    }

    #[test]
    fn same_lane_is_trivial() {
        let net = fork();
        let a = lane(&net, "A", -1, 0.0);
        let path = DijkstraRouter.route(&net, a, a).unwrap();
        assert!(path.is_trivial());
        assert_eq!(path.total_length_m, 0.0);
    }

    #[test]
    fn no_route_against_traffic() {
        let net = fork();
        let err = DijkstraRouter
            .route(&net, lane(&net, "B", -1, 0.0), lane(&net, "A", -1, 0.0))
            .unwrap_err();
        assert!(matches!(err, RouteError::NoRoute { .. }));
    }

    #[test]
    fn unknown_lane() {
        let net = fork();
        let err = DijkstraRouter.route(&net, LaneId(999), lane(&net, "A", -1, 0.0)).unwrap_err();
        assert!(matches!(err, RouteError::LaneNotFound(LaneId(999))));
    }
}

// ── Preferences ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod prefs {
    use super::helpers::{fork, lane};
    use crate::{Link, PreferredConnections};

    #[test]
    fn no_preference_takes_first_candidate() {
        let net = fork();
        let link = &net.lane(lane(&net, "A", -1, 0.0)).successor;
        let chosen = PreferredConnections::new().choose(&net, link).unwrap();
        assert_eq!(chosen.lane, lane(&net, "C1", -1, 0.0));
    }

    #[test]
    fn connection_preference_selects_branch() {
        let net = fork();
        let junction = net.junction_by_id("J").unwrap();
        let link = &net.lane(lane(&net, "A", -1, 0.0)).successor;
        let prefs = PreferredConnections::new().with_connection(net.connection_by_id(junction, "1").unwrap());
        assert_eq!(prefs.choose(&net, link).unwrap().lane, lane(&net, "C2", -1, 0.0));
    }

    #[test]
    fn road_preference_selects_branch() {
        let net = fork();
        let link = &net.lane(lane(&net, "A", -1, 0.0)).successor;
        let prefs = PreferredConnections::new().with_road(net.road_by_id("C2").unwrap());
        assert_eq!(prefs.choose(&net, link).unwrap().lane, lane(&net, "C2", -1, 0.0));
    }

    #[test]
    fn candidate_order_beats_list_order() {
        let net = fork();
        let link = &net.lane(lane(&net, "A", -1, 0.0)).successor;
        // Both branches are preferred; the earlier candidate wins.
        let prefs = PreferredConnections::new()
            .with_road(net.road_by_id("C2").unwrap())
            .with_road(net.road_by_id("C1").unwrap());
        assert_eq!(prefs.choose(&net, link).unwrap().lane, lane(&net, "C1", -1, 0.0));
    }

    #[test]
    fn unmatched_preference_falls_back() {
        let net = fork();
        let link = &net.lane(lane(&net, "A", -1, 0.0)).successor;
        let prefs = PreferredConnections::new().with_road(net.road_by_id("B").unwrap());
        assert_eq!(prefs.choose(&net, link).unwrap().lane, lane(&net, "C1", -1, 0.0));
    }

    #[test]
    fn unresolved_link_has_no_choice() {
        let net = fork();
        assert!(PreferredConnections::new().choose(&net, &Link::Unresolved).is_none());
    }
}

// ── Lane geometry & attributes ────────────────────────────────────────────────

#[cfg(test)]
mod lanes {
    use approx::assert_abs_diff_eq;
    use od_core::SpeedUnit;

    use super::helpers::{build, fork, lane, single_road};
    use crate::{
        LaneRecord, LaneSectionRecord, LaneSide, LaneType, PolyRecord, RoadMarkType, WidthRecord,
    };

    #[test]
    fn center_points_are_y_up() {
        let net = fork();
        let right = net.lane_center_point(lane(&net, "A", -1, 0.0), 10.0).unwrap();
        assert_abs_diff_eq!(right.position.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(right.position.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(right.position.z, 1.75, epsilon = 1e-9);
        assert_abs_diff_eq!(right.travel_heading(), 0.0, epsilon = 1e-12);

        let left = net.lane_center_point(lane(&net, "A", 1, 0.0), 10.0).unwrap();
        assert_abs_diff_eq!(left.position.z, -1.75, epsilon = 1e-9);
        assert_abs_diff_eq!(left.travel_heading().abs(), std::f64::consts::PI, epsilon = 1e-12);
    }

    #[test]
    fn center_point_outside_section() {
        let net = fork();
        assert!(net.lane_center_point(lane(&net, "A", -1, 0.0), 150.0).is_none());
    }

    #[test]
    fn lane_offset_shifts_the_stack() {
        let road = single_road(50.0, vec![LaneSectionRecord::new(0.0).with_lane(LaneRecord::driving(-1, 3.5))])
            .with_lane_offset(PolyRecord::new(0.0, 0.5, 0.0, 0.0, 0.0));
        let net = build(vec![road]).unwrap();
        let l = lane(&net, "R", -1, 0.0);
        assert_abs_diff_eq!(net.lane_center_t(l, 20.0), -1.25, epsilon = 1e-12);
        assert_eq!(net.lane_edges_t(l, 20.0), (0.5, -3.0));
    }

    #[test]
    fn border_records_measure_from_the_center() {
        let mut inner = LaneRecord::new(-1, LaneType::Driving, 0.0);
        inner.width.clear();
        inner.border.push(WidthRecord { a: -3.0, ..WidthRecord::default() });
        let mut outer = LaneRecord::new(-2, LaneType::Shoulder, 0.0);
        outer.width.clear();
        outer.border.push(WidthRecord { a: -6.5, ..WidthRecord::default() });
        let net = build(vec![single_road(
            30.0,
            vec![LaneSectionRecord::new(0.0).with_lane(inner).with_lane(outer)],
        )])
        .unwrap();
        assert_abs_diff_eq!(net.lane_width(lane(&net, "R", -1, 0.0), 5.0), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(net.lane_width(lane(&net, "R", -2, 0.0), 5.0), 3.5, epsilon = 1e-12);
    }

    #[test]
    fn width_is_relative_to_section_start() {
        let widening = LaneRecord::new(-1, LaneType::Driving, 0.0);
        let widening = LaneRecord {
            width: vec![WidthRecord { s_offset: 0.0, a: 3.0, b: 0.1, ..WidthRecord::default() }],
            ..widening
        };
        let net = build(vec![single_road(
            100.0,
            vec![
                LaneSectionRecord::new(0.0).with_lane(LaneRecord::driving(-1, 3.0)),
                LaneSectionRecord::new(50.0).with_lane(widening),
            ],
        )])
        .unwrap();
        let l = lane(&net, "R", -1, 60.0);
        assert_abs_diff_eq!(net.lane_width(l, 50.0), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(net.lane_width(l, 60.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn elevation_feeds_world_height() {
        let road = single_road(50.0, vec![LaneSectionRecord::new(0.0).with_lane(LaneRecord::driving(-1, 3.5))])
            .with_elevation(PolyRecord::new(0.0, 2.0, 0.1, 0.0, 0.0));
        let net = build(vec![road]).unwrap();
        let p = net.lane_center_point(lane(&net, "R", -1, 0.0), 10.0).unwrap();
        assert_abs_diff_eq!(p.position.y, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn lane_speed_overrides_road_speed() {
        let road = single_road(
            100.0,
            vec![LaneSectionRecord::new(0.0)
                .with_lane(LaneRecord::driving(-1, 3.5).with_speed(40.0, 30.0, SpeedUnit::Kmh))
                .with_lane(LaneRecord::driving(-2, 3.5))],
        )
        .with_speed(0.0, 50.0, SpeedUnit::Mph);
        let net = build(vec![road]).unwrap();
        let inner = lane(&net, "R", -1, 0.0);
        let outer = lane(&net, "R", -2, 0.0);
        assert_abs_diff_eq!(net.speed_limit_at(inner, 10.0).unwrap(), 80.4672, epsilon = 1e-9);
        assert_eq!(net.speed_limit_at(inner, 50.0), Some(30.0));
        assert_abs_diff_eq!(net.speed_limit_at(outer, 50.0).unwrap(), 80.4672, epsilon = 1e-9);
        assert_eq!(net.speed_breakpoints(inner), vec![40.0]);
        assert!(net.speed_breakpoints(outer).is_empty());
    }

    #[test]
    fn unset_speed_is_none() {
        let net = fork();
        assert_eq!(net.speed_limit_at(lane(&net, "A", -1, 0.0), 10.0), None);
    }

    #[test]
    fn position_lookup_finds_lane() {
        let net = fork();
        let a = net.road_by_id("A").unwrap();
        let (found, s) = net.lane_at_position(a, 30.0, 1.0).unwrap();
        assert_eq!(found, lane(&net, "A", -1, 0.0));
        assert_abs_diff_eq!(s, 30.0, epsilon = 1e-6);
        let (found, _) = net.lane_at_position(a, 30.0, -1.0).unwrap();
        assert_eq!(found, lane(&net, "A", 1, 0.0));
        assert!(net.lane_at_position(a, 30.0, 10.0).is_none());
    }

    #[test]
    fn position_lookup_on_foreign_road() {
        let net = fork();
        let foreign = od_core::RoadId(99);
        assert!(net.get_road(foreign).is_none());
        assert!(net.project(foreign, 30.0, 1.0).is_none());
        assert!(net.lane_at_position(foreign, 30.0, 1.0).is_none());
        let a = net.road_by_id("A").unwrap();
        assert!(net.project(a, 30.0, 1.0).is_some());
    }

    #[test]
    fn driving_lanes_per_side() {
        let section = LaneSectionRecord::new(0.0)
            .with_lane(LaneRecord::driving(1, 3.5))
            .with_lane(LaneRecord::driving(-1, 3.5))
            .with_lane(LaneRecord::driving(-2, 0.0))
            .with_lane(LaneRecord::new(-3, LaneType::Shoulder, 2.0));
        let net = build(vec![single_road(20.0, vec![section])]).unwrap();
        let sec = net.section_at(net.road_by_id("R").unwrap(), 5.0).unwrap();
        assert_eq!(net.driving_lane_count(sec, LaneSide::Right, 5.0), 1);
        assert_eq!(net.driving_lane_count(sec, LaneSide::Left, 5.0), 1);
        let outward: Vec<i32> = net.section(sec).side(LaneSide::Right).map(|(id, _)| id).collect();
        assert_eq!(outward, vec![-1, -2, -3]);
    }

    #[test]
    fn road_marks_by_position() {
        let section = LaneSectionRecord::new(0.0)
            .with_center_mark(RoadMarkType::SolidSolid)
            .with_lane(LaneRecord::driving(-1, 3.5).with_mark(RoadMarkType::Broken));
        let net = build(vec![single_road(20.0, vec![section])]).unwrap();
        let l = lane(&net, "R", -1, 0.0);
        assert_eq!(net.lane(l).road_mark_at(5.0), Some(RoadMarkType::Broken));
        assert_eq!(net.section(net.lane(l).section).center_mark_at(5.0), Some(RoadMarkType::SolidSolid));
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loading {
    use std::io::Write;

    use super::helpers::fork_document;
    use crate::{GeometryKindRecord, LoadError, NetworkConfig, RoadNetwork, parse_document_json};

    #[test]
    fn json_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        serde_json::to_writer(&mut file, &fork_document()).unwrap();
        file.flush().unwrap();

        let net = RoadNetwork::load_json(file.path(), &NetworkConfig::default()).unwrap();
        assert_eq!(net.road_count(), 5);
        assert_eq!(net.junction_count(), 1);
        assert_eq!(net.lane_count(), 6);
    }

    #[test]
    fn json_shape() {
        let text = r#"{
            "roads": [{
                "id": "A", "length": 100.0,
                "speed": [{ "s": 0.0, "max": 20.0, "unit": "m/s" }],
                "plan_view": [{ "s": 0, "x": 0, "y": 0, "hdg": 0, "length": 100,
                                "kind": { "type": "arc", "curvature": 0.01 } }],
                "lane_sections": [{ "s": 0, "lanes": [
                    { "id": -1, "type": "driving", "width": [{ "a": 3.5 }],
                      "road_marks": [{ "type": "solid_solid" }] },
                    { "id": -2, "type": "somethingNew" }
                ]}]
            }]
        }"#;
        let document = parse_document_json(text).unwrap();
        assert_eq!(document.roads[0].plan_view[0].kind, GeometryKindRecord::Arc { curvature: 0.01 });
        assert_eq!(document.roads[0].lane_sections[0].lanes[1].lane_type, crate::LaneType::Other);

        let net = RoadNetwork::from_document(document, &NetworkConfig::default()).unwrap();
        let lane = net.lane_at(od_core::RoadId(0), -1, 1.0).unwrap();
        assert_eq!(net.speed_limit_at(lane, 1.0), Some(72.0));
    }

    #[test]
    fn malformed_json() {
        let err = parse_document_json("{ \"roads\": [ {").unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn missing_file() {
        let err = RoadNetwork::load_json(std::path::Path::new("/nonexistent/map.json"), &NetworkConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::Io(_)));
    }
}

// ── OpenDRIVE XML ─────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "xodr"))]
mod xodr {
    use crate::xodr::parse_xodr;
    use crate::{ContactPoint, ElementType, GeometryKindRecord, LaneType, NetworkConfig, RoadMarkType, RoadNetwork};

    const SAMPLE: &str = r#"<?xml version="1.0" standalone="yes"?>
<OpenDRIVE>
  <header revMajor="1" revMinor="4" name="sample"/>
  <road name="Main" length="100.0" id="1" junction="-1">
    <link>
      <successor elementType="road" elementId="2" contactPoint="start"/>
    </link>
    <type s="0.0" type="town">
      <speed max="30" unit="mph"/>
    </type>
    <planView>
      <geometry s="0.0" x="0.0" y="0.0" hdg="0.0" length="60.0"><line/></geometry>
      <geometry s="60.0" x="60.0" y="0.0" hdg="0.0" length="40.0"><arc curvature="0.01"/></geometry>
    </planView>
    <elevationProfile>
      <elevation s="0.0" a="1.0" b="0.0" c="0.0" d="0.0"/>
    </elevationProfile>
    <lanes>
      <laneOffset s="0.0" a="0.0" b="0.0" c="0.0" d="0.0"/>
      <laneSection s="0.0">
        <left>
          <lane id="1" type="driving" level="false">
            <link><predecessor id="1"/></link>
            <width sOffset="0.0" a="3.5" b="0.0" c="0.0" d="0.0"/>
          </lane>
        </left>
        <center>
          <lane id="0" type="none" level="false">
            <roadMark sOffset="0.0" type="solid solid" weight="standard"/>
          </lane>
        </center>
        <right>
          <lane id="-1" type="driving" level="false">
            <link><successor id="-1"/></link>
            <width sOffset="0.0" a="3.5" b="0.0" c="0.0" d="0.0"/>
            <roadMark sOffset="0.0" type="broken"/>
            <speed sOffset="10.0" max="50" unit="km/h"/>
          </lane>
          <lane id="-2" type="shoulder" level="false">
            <width sOffset="0.0" a="1.0" b="0.0" c="0.0" d="0.0"/>
          </lane>
        </right>
      </laneSection>
    </lanes>
  </road>
  <road name="" length="50.0" id="2" junction="-1">
    <link>
      <predecessor elementType="road" elementId="1" contactPoint="end"/>
    </link>
    <planView>
      <geometry s="0.0" x="100.0" y="0.0" hdg="0.0" length="50.0"><line/></geometry>
    </planView>
    <lanes>
      <laneSection s="0.0">
        <right>
          <lane id="-1" type="driving" level="false">
            <link><predecessor id="-1"/></link>
            <width sOffset="0.0" a="3.5" b="0.0" c="0.0" d="0.0"/>
          </lane>
        </right>
      </laneSection>
    </lanes>
  </road>
</OpenDRIVE>
"#;

    #[test]
    fn parses_roads_and_lanes() {
        let doc = parse_xodr(SAMPLE).unwrap();
        assert_eq!(doc.header.as_ref().and_then(|h| h.version.clone()), Some("1.4".into()));
        assert_eq!(doc.roads.len(), 2);

        let main = &doc.roads[0];
        assert_eq!(main.id, "1");
        assert_eq!(main.junction, None);
        assert_eq!(main.plan_view.len(), 2);
        assert_eq!(main.plan_view[1].kind, GeometryKindRecord::Arc { curvature: 0.01 });
        let succ = main.link.successor.as_ref().unwrap();
        assert_eq!(succ.element_type, ElementType::Road);
        assert_eq!(succ.contact_point, Some(ContactPoint::Start));
        assert_eq!(main.speed[0].max, Some(30.0));

        let section = &main.lane_sections[0];
        assert_eq!(section.lanes.len(), 3, "center lane is not a lane record");
        assert_eq!(section.center_road_marks[0].mark_type, RoadMarkType::SolidSolid);
        let right = section.lanes.iter().find(|l| l.id == -1).unwrap();
        assert_eq!(right.successor, Some(-1));
        assert_eq!(right.road_marks[0].mark_type, RoadMarkType::Broken);
        assert_eq!(right.speed[0].s_offset, 10.0);
        let shoulder = section.lanes.iter().find(|l| l.id == -2).unwrap();
        assert_eq!(shoulder.lane_type, LaneType::Shoulder);
    }

    #[test]
    fn builds_linked_network() {
        let net = RoadNetwork::from_document(parse_xodr(SAMPLE).unwrap(), &NetworkConfig::default()).unwrap();
        let main = net.road_by_id("1").unwrap();
        let lane = net.lane_at(main, -1, 50.0).unwrap();
        assert!(net.lane(lane).successor.is_resolved());
        assert_eq!(net.speed_limit_at(lane, 50.0), Some(50.0));
        assert!((net.speed_limit_at(lane, 5.0).unwrap() - 48.28032).abs() < 1e-9);
    }

    #[test]
    fn malformed_xml() {
        assert!(parse_xodr("<OpenDRIVE><road id=\"1\"></OpenDRIVE>").is_err());
    }
}
