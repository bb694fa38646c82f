// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Shortest routes between named city locations.
//!
//! A [Network] pairs a small, hand-authored weighted [Graph] of named locations
//! with their coordinates. [find_route] runs Dijkstra's algorithm over that graph,
//! a [MapSession] draws the result through any [MapRenderer], and a [Tracker]
//! streams live position fixes into a [TrackingStore] for a remote [Viewer].
//!
//! # Example
//!
//! ```
//! let network = cityroute::Network::bangalore();
//! let route = cityroute::find_route(&network.graph, "Hebbal", "Electronic City")
//!     .expect("failed to find route");
//!
//! assert_eq!(route.path.len(), 8);
//! assert_eq!(route.distance, 41.0);
//! ```

mod dijkstra;
mod distance;
pub mod geojson;
mod graph;
pub mod network;
mod session;
pub mod tracking;

pub use dijkstra::{find_route, Route, RouteError};
pub use distance::earth_distance;
pub use graph::Graph;
pub use network::Network;
pub use session::{MapRenderer, MapSession, Status, LIVE_ZOOM};
pub use tracking::{Tracker, TrackingStore, Viewer};

/// A geographic position, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub lat: f32,
    pub lon: f32,
}

impl Position {
    pub const fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to another position, in kilometers.
    pub fn distance_to(&self, other: Position) -> f32 {
        earth_distance(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Represents an outgoing (one-way) connection from a location in a [Graph].
///
/// `cost` is the length of the connection in kilometers and must be finite
/// and not negative.
///
/// `to` might not be a node of the [Graph]. Route search silently ignores such edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub to: String,
    pub cost: f32,
}

impl Edge {
    pub fn new<S: Into<String>>(to: S, cost: f32) -> Self {
        Self {
            to: to.into(),
            cost,
        }
    }
}
