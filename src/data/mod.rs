//! Input datasets for the demo host
//!
//! A dataset directory holds three JSON files:
//! - `world.json`: array of rings, each an array of `[lon, lat]` pairs
//! - `nodes.json`: array of `{ "id", "name", "lon", "lat" }`
//! - `edges.json`: array of `{ "source", "destination", "metadata"? }`
//!
//! Without a directory the built-in sample is used.

use std::fs;
use std::path::Path;

use anyhow::Context;
use bevy::log::info;
use serde::de::DeserializeOwned;

use crate::core::coordinates::GeoPoint;
use crate::network::{Edge, Node, RouteNetwork, WorldGeometry};

/// Parsed world geometry plus the route network.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub world: WorldGeometry,
    pub network: RouteNetwork,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// Load `world.json`, `nodes.json` and `edges.json` from `dir`.
pub fn load_dataset(dir: &Path) -> anyhow::Result<Dataset> {
    let rings: Vec<Vec<[f64; 2]>> = read_json(&dir.join("world.json"))?;
    let nodes: Vec<Node> = read_json(&dir.join("nodes.json"))?;
    let edges: Vec<Edge> = read_json(&dir.join("edges.json"))?;

    for node in &nodes {
        GeoPoint::from_degrees(node.position.lon, node.position.lat)
            .with_context(|| format!("node {}", node.id))?;
    }

    let world = WorldGeometry::new(
        rings
            .into_iter()
            .map(|ring| ring.into_iter().map(|[lon, lat]| GeoPoint::new(lon, lat)).collect())
            .collect(),
    );
    info!(
        "Loaded dataset from {}: {} rings, {} nodes, {} edges",
        dir.display(),
        world.rings().len(),
        nodes.len(),
        edges.len()
    );
    Ok(Dataset {
        world,
        network: RouteNetwork::new(nodes, edges),
    })
}

/// Built-in airports, routes and a coarse continent outline.
pub fn sample_dataset() -> Dataset {
    let nodes = sample_airports()
        .into_iter()
        .map(|(code, name, lon, lat)| Node::new(code, name, lon, lat))
        .collect();
    let edges = sample_routes()
        .into_iter()
        .map(|(from, to)| Edge::new(from, to))
        .collect();
    let world = WorldGeometry::new(
        sample_continents()
            .into_iter()
            .map(|ring| ring.iter().map(|&(lon, lat)| GeoPoint::new(lon, lat)).collect())
            .collect(),
    );
    Dataset {
        world,
        network: RouteNetwork::new(nodes, edges),
    }
}

fn sample_airports() -> Vec<(&'static str, &'static str, f64, f64)> {
    vec![
        ("JFK", "John F. Kennedy International", -73.7781, 40.6413),
        ("LAX", "Los Angeles International", -118.4085, 33.9416),
        ("ORD", "O'Hare International", -87.9073, 41.9742),
        ("YYZ", "Toronto Pearson International", -79.6248, 43.6777),
        ("MEX", "Mexico City International", -99.0721, 19.4361),
        ("GRU", "São Paulo/Guarulhos International", -46.4731, -23.4356),
        ("LHR", "London Heathrow", -0.4543, 51.4700),
        ("CDG", "Paris Charles de Gaulle", 2.5479, 49.0097),
        ("FRA", "Frankfurt am Main", 8.5622, 50.0379),
        ("MAD", "Adolfo Suárez Madrid-Barajas", -3.5676, 40.4983),
        ("IST", "Istanbul Airport", 28.7519, 41.2753),
        ("CAI", "Cairo International", 31.4056, 30.1219),
        ("JNB", "O. R. Tambo International", 28.2460, -26.1367),
        ("DXB", "Dubai International", 55.3657, 25.2532),
        ("DEL", "Indira Gandhi International", 77.1025, 28.5562),
        ("SIN", "Singapore Changi", 103.9915, 1.3644),
        ("HND", "Tokyo Haneda", 139.7798, 35.5494),
        ("PEK", "Beijing Capital International", 116.5975, 40.0799),
        ("SYD", "Sydney Kingsford Smith", 151.1772, -33.9399),
        ("AKL", "Auckland Airport", 174.7850, -37.0082),
    ]
}

fn sample_routes() -> Vec<(&'static str, &'static str)> {
    vec![
        ("JFK", "LHR"),
        ("JFK", "CDG"),
        ("JFK", "FRA"),
        ("JFK", "MAD"),
        ("JFK", "LAX"),
        ("JFK", "GRU"),
        ("JFK", "DXB"),
        ("JFK", "HND"),
        ("LAX", "HND"),
        ("LAX", "SYD"),
        ("LAX", "MEX"),
        ("LAX", "JFK"),
        ("LAX", "AKL"),
        ("ORD", "LHR"),
        ("ORD", "YYZ"),
        ("ORD", "LAX"),
        ("LHR", "JFK"),
        ("LHR", "DXB"),
        ("LHR", "SIN"),
        ("LHR", "JNB"),
        ("LHR", "DEL"),
        ("CDG", "JFK"),
        ("CDG", "CAI"),
        ("CDG", "HND"),
        ("CDG", "GRU"),
        ("FRA", "PEK"),
        ("FRA", "IST"),
        ("IST", "DXB"),
        ("IST", "CAI"),
        ("DXB", "SYD"),
        ("DXB", "DEL"),
        ("DXB", "JNB"),
        ("SIN", "SYD"),
        ("SIN", "HND"),
        ("HND", "SYD"),
        ("PEK", "HND"),
        ("SYD", "AKL"),
        ("GRU", "MAD"),
    ]
}

/// Very coarse continent outlines, enough to orient the globe.
fn sample_continents() -> Vec<Vec<(f64, f64)>> {
    vec![
        // North America
        vec![
            (-168.0, 65.0),
            (-140.0, 70.0),
            (-95.0, 72.0),
            (-65.0, 60.0),
            (-55.0, 50.0),
            (-70.0, 42.0),
            (-81.0, 25.0),
            (-97.0, 26.0),
            (-105.0, 20.0),
            (-87.0, 13.0),
            (-78.0, 8.0),
            (-92.0, 15.0),
            (-110.0, 24.0),
            (-117.0, 33.0),
            (-124.0, 40.0),
            (-125.0, 49.0),
            (-135.0, 58.0),
            (-152.0, 58.0),
            (-168.0, 65.0),
        ],
        // South America
        vec![
            (-78.0, 8.0),
            (-60.0, 10.0),
            (-50.0, 0.0),
            (-35.0, -7.0),
            (-40.0, -22.0),
            (-58.0, -38.0),
            (-68.0, -55.0),
            (-75.0, -48.0),
            (-71.0, -18.0),
            (-81.0, -5.0),
            (-78.0, 8.0),
        ],
        // Europe and Asia
        vec![
            (-10.0, 36.0),
            (-9.0, 43.0),
            (-2.0, 48.0),
            (5.0, 53.0),
            (10.0, 58.0),
            (5.0, 62.0),
            (25.0, 71.0),
            (60.0, 70.0),
            (100.0, 77.0),
            (140.0, 72.0),
            (180.0, 68.0),
            (160.0, 60.0),
            (140.0, 50.0),
            (128.0, 35.0),
            (121.0, 31.0),
            (108.0, 21.0),
            (104.0, 1.5),
            (98.0, 16.0),
            (80.0, 8.0),
            (72.0, 21.0),
            (57.0, 25.0),
            (48.0, 30.0),
            (35.0, 36.0),
            (27.0, 41.0),
            (15.0, 38.0),
            (3.0, 43.0),
            (-5.0, 36.0),
            (-10.0, 36.0),
        ],
        // Africa
        vec![
            (-17.0, 21.0),
            (-10.0, 35.0),
            (10.0, 37.0),
            (32.0, 31.0),
            (43.0, 12.0),
            (51.0, 11.0),
            (40.0, -15.0),
            (32.0, -29.0),
            (20.0, -35.0),
            (12.0, -18.0),
            (9.0, 4.0),
            (-8.0, 4.0),
            (-17.0, 14.0),
            (-17.0, 21.0),
        ],
        // Australia
        vec![
            (114.0, -22.0),
            (130.0, -12.0),
            (142.0, -11.0),
            (153.0, -27.0),
            (150.0, -37.0),
            (140.0, -38.0),
            (131.0, -31.0),
            (115.0, -34.0),
            (114.0, -22.0),
        ],
    ]
}
