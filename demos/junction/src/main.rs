//! `junction` — routing, forecasting and lane location over a small forked
//! road network.
//!
//! Builds the document in [`network`], routes from the approach road to
//! the northbound exit, forecasts the road ahead of a vehicle following
//! that route, and replays a short drive log into a CSV report.
//!
//! Run with:
//!   RUST_LOG=debug cargo run -p junction

mod network;

use std::path::Path;

use anyhow::{Context, Result};

use od_network::{DijkstraRouter, NetworkConfig, RoadNetwork, Router};
use od_query::{
    ExpectedLanes, PathQuery, RoadPosition, TravelDirection, VehiclePose, locate_batch,
};
use od_replay::{LogRecord, Replay, ReportWriter};
use od_spatial::LaneSurfaceIndex;

use network::build_document;

const OUTPUT_DIR: &str = "output/junction";
/// Where the vehicle starts on the approach road.
const START_S: f64 = 60.0;

fn main() -> Result<()> {
    env_logger::init();
    println!("=== junction — od-engine demo ===");
    println!();

    // 1. Build and keep a JSON copy of the document.
    let document = build_document();
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let json_path = Path::new(OUTPUT_DIR).join("network.json");
    serde_json::to_writer_pretty(std::fs::File::create(&json_path)?, &document)?;
    println!("Document written to {}", json_path.display());

    let network = RoadNetwork::from_document(document, &NetworkConfig::default())?;
    println!(
        "Network: {} roads, {} lanes, {} junctions, graph {} nodes / {} edges",
        network.road_count(),
        network.lane_count(),
        network.junction_count(),
        network.graph.node_count(),
        network.graph.edge_count(),
    );

    // 2. Route A/-1 → D/-1.
    let lane_of = |road: &str, s: f64| -> Result<_> {
        let road_id = network.road_by_id(road).with_context(|| format!("road {road}"))?;
        network.lane_at(road_id, -1, s).with_context(|| format!("lane -1 of {road}"))
    };
    let origin = lane_of("A", START_S)?;
    let destination = lane_of("D", 0.0)?;
    let path = DijkstraRouter.route(&network, origin, destination)?;
    let prefs = path.to_preferred_connections(&network.graph);
    println!(
        "Route: {} lanes, {:.1} m before the destination lane, {} junction preference(s)",
        path.lanes(&network.graph).len(),
        path.total_length_m,
        prefs.len(),
    );
    println!();

    // 3. Forecast from A/-1 following the route.
    let query = PathQuery::new(&network);
    let index = LaneSurfaceIndex::build(&network)?;
    let mut forecast = query
        .forecast(origin, START_S, TravelDirection::Normal, &prefs)
        .context("forecast start position")?;
    forecast.project_to_ground(&index, query.config().terrain_offset_m);

    println!(
        "Forecast at s={START_S}: {} points ahead, {} behind, lanes {} / {} opposite",
        forecast.ahead.len(),
        forecast.behind.len(),
        forecast.lanes_in_direction,
        forecast.lanes_opposite,
    );
    println!("{:>10} {:>12}", "distance", "curvature");
    println!("{}", "-".repeat(23));
    for sample in &forecast.curvatures {
        println!("{:>10.1} {:>12.4}", sample.distance, sample.curvature);
    }
    for change in &forecast.speed_limits {
        match change.speed_kmh {
            Some(kmh) => println!("Speed limit {kmh:.0} km/h in {:.1} m", change.distance),
            None => println!("Speed limit ends in {:.1} m", change.distance),
        }
    }
    for junction in &forecast.intersections {
        println!(
            "Junction {} in {:.1} m ({} branches)",
            network.junction(junction.junction).id,
            junction.distance,
            junction.branches,
        );
    }
    println!();

    // 4. Locate a few vehicles at once.
    let poses = [
        VehiclePose { position: od_core::Vec3::new(30.0, 0.0, 1.75), heading: 0.0 },
        VehiclePose { position: od_core::Vec3::new(30.0, 0.0, -1.75), heading: std::f64::consts::PI },
        VehiclePose { position: od_core::Vec3::new(500.0, 0.0, 0.0), heading: 0.0 },
    ];
    let vehicles: Vec<_> = poses.iter().map(|&p| (p, ExpectedLanes::new())).collect();
    for (pose, found) in poses.iter().zip(locate_batch(&network, &index, &vehicles)) {
        match found {
            Some(m) => {
                let lane = network.lane(m.lane);
                println!(
                    "({:>6.1}, {:>6.1}) → road {} lane {} s={:.1} score {:.2}",
                    pose.position.x,
                    pose.position.z,
                    network.road(lane.road).id,
                    lane.id,
                    m.s,
                    m.score,
                );
            }
            None => println!("({:>6.1}, {:>6.1}) → off road", pose.position.x, pose.position.z),
        }
    }
    println!();

    // 5. Replay a drive along the route into a CSV report.
    let drive = [
        LogRecord { time_s: 0.0, x: 20.0, y: 0.0, z: 1.75, heading_deg: 0.0 },
        LogRecord { time_s: 4.0, x: 60.0, y: 0.0, z: 1.75, heading_deg: 0.0 },
        LogRecord { time_s: 8.0, x: 95.0, y: 0.0, z: 1.75, heading_deg: 0.0 },
        LogRecord { time_s: 14.0, x: 111.75, y: 0.0, z: -30.0, heading_deg: 90.0 },
    ];
    let target = RoadPosition {
        road: network.road(network.lane(destination).road).handle,
        lane_id: -1,
        s: 40.0,
    };
    let rows = Replay::new(query.clone(), &index)
        .with_target(target)
        .with_preferences(prefs)
        .run(&drive);

    let report_path = Path::new(OUTPUT_DIR).join("report.csv");
    let mut writer = ReportWriter::create(&report_path)?;
    writer.write_rows(&rows)?;
    writer.finish()?;
    println!("Replay: {} rows written to {}", rows.len(), report_path.display());

    Ok(())
}
