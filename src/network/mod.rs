// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Configuration of named locations and the roads between them.

use std::collections::BTreeMap;

use crate::{Graph, Position, Route};

mod reader;

pub use reader::{
    add_features_from_buffer, add_features_from_file, add_features_from_io, FileFormat, LoadError,
    Options,
};

/// Zoom level used when a network doesn't define its own [View].
pub const DEFAULT_ZOOM: u8 = 11;

/// Initial map viewport for a [Network].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: Position,
    pub zoom: u8,
}

impl Default for View {
    fn default() -> Self {
        Self {
            center: Position::default(),
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// A fixed set of named [locations](Position) together with a [Graph] of
/// roads between them.
///
/// Every graph node is expected to have a location, but this isn't enforced:
/// nodes without one simply can't be drawn on a map.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Network {
    pub locations: BTreeMap<String, Position>,
    pub graph: Graph,
    pub view: View,
}

const BANGALORE_LOCATIONS: &[(&str, f32, f32)] = &[
    ("Hebbal", 13.0358, 77.5970),
    ("Malleshwaram", 13.0031, 77.5640),
    ("Majestic", 12.9767, 77.5713),
    ("KR Market", 12.9641, 77.5776),
    ("Jayanagar", 12.9250, 77.5938),
    ("Banashankari", 12.9255, 77.5468),
    ("Silk Board", 12.9177, 77.6233),
    ("Electronic City", 12.8452, 77.6600),
];

const BANGALORE_ROADS: &[(&str, &str, f32)] = &[
    ("Hebbal", "Malleshwaram", 7.0),
    ("Malleshwaram", "Majestic", 5.0),
    ("Majestic", "KR Market", 3.0),
    ("KR Market", "Jayanagar", 6.0),
    ("Jayanagar", "Banashankari", 4.0),
    ("Banashankari", "Silk Board", 6.0),
    ("Silk Board", "Electronic City", 10.0),
];

impl Network {
    /// Returns the built-in network of eight Bangalore locations,
    /// connected in a single chain from Hebbal to Electronic City.
    pub fn bangalore() -> Self {
        let locations = BANGALORE_LOCATIONS
            .iter()
            .map(|&(name, lat, lon)| (name.to_string(), Position::new(lat, lon)))
            .collect();

        let graph = BANGALORE_ROADS.iter().copied().collect();

        Self {
            locations,
            graph,
            view: View {
                center: Position::new(12.9716, 77.5946),
                zoom: DEFAULT_ZOOM,
            },
        }
    }

    /// Returns the position of a location with the given name.
    pub fn position(&self, name: &str) -> Option<Position> {
        self.locations.get(name).copied()
    }

    /// Returns positions of all locations along a [Route], in order.
    ///
    /// Locations without a known position are skipped.
    pub fn route_positions(&self, route: &Route) -> Vec<(&str, Position)> {
        route
            .path
            .iter()
            .filter_map(|name| match self.locations.get_key_value(name.as_str()) {
                Some((name, &pos)) => Some((name.as_str(), pos)),
                None => {
                    log::warn!("location {:?} has no position - not drawing it", name);
                    None
                }
            })
            .collect()
    }

    /// Finds the closest location (which is also a graph node) to the given position.
    ///
    /// This function requires computing the distance to every location,
    /// and is not suitable for large networks.
    pub fn find_nearest_location(&self, pos: Position) -> Option<(&str, Position)> {
        self.locations
            .iter()
            .filter(|(name, _)| self.graph.contains(name))
            .map(|(name, &loc)| (pos.distance_to(loc), name.as_str(), loc))
            .min_by(|(a, _, _), (b, _, _)| a.total_cmp(b))
            .map(|(_, name, loc)| (name, loc))
    }
}
