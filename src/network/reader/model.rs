// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Position;

/// Represents a `<location>` element - a named point on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub position: Position,
}

/// Represents a `<road>` element - a connection between two locations.
#[derive(Debug, Clone, PartialEq)]
pub struct Road {
    pub from: String,
    pub to: String,
    pub km: f32,
    pub oneway: bool,
}

/// Union over all elements of a network description file.
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    View(crate::network::View),
    Location(Location),
    Road(Road),
}
