// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Error conditions which may occur during [find_route](crate::find_route).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The start or end location doesn't exist in the graph.
    #[error("invalid location: {0:?}")]
    UnknownNode(String),

    /// No path connects the start and end locations.
    #[error("no route from {from:?} to {to:?}")]
    Unreachable { from: String, to: String },
}
