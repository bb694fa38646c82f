// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::tracking::Fix;
use crate::{find_route, Network, Position, Route, RouteError};

/// Zoom level used when following a live device.
pub const LIVE_ZOOM: u8 = 14;

/// Label of the marker showing the live device position.
const LIVE_LABEL: &str = "Live Device";

/// Something which can draw markers and lines on a map.
///
/// Every drawing call returns a handle to the created layer,
/// which can later be used to move or remove it.
pub trait MapRenderer {
    type Layer;

    /// Places a labeled marker at the given position.
    fn add_marker(&mut self, at: Position, label: &str) -> Self::Layer;

    /// Draws a line connecting all provided positions, in order.
    fn add_line(&mut self, points: &[Position]) -> Self::Layer;

    /// Moves a previously added marker.
    fn move_marker(&mut self, marker: &Self::Layer, to: Position);

    /// Removes a previously added marker or line from the map.
    fn remove(&mut self, layer: Self::Layer);

    /// Centers the map on the given position.
    fn set_view(&mut self, center: Position, zoom: u8);
}

/// Text shown to the user after a [MapSession] operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Route(Route),
    InvalidLocation,
    Unreachable { from: String, to: String },
    Tracking(Position),
    TrackingStopped,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Route(route) => {
                writeln!(f, "Shortest Route: {}", route.path.join(" → "))?;
                write!(f, "Total Distance: {} km", route.distance)
            }
            Self::InvalidLocation => write!(f, "Invalid Location"),
            Self::Unreachable { from, to } => write!(f, "No route from {} to {}", from, to),
            Self::Tracking(pos) => {
                writeln!(f, "Status: Tracking Active")?;
                writeln!(f, "Latitude: {:.6}", pos.lat)?;
                write!(f, "Longitude: {:.6}", pos.lon)
            }
            Self::TrackingStopped => write!(f, "Tracking Stopped"),
        }
    }
}

/// State of a single interactive map: the shown route and the live device marker.
///
/// All layers added through a session are owned by it and removed
/// before being replaced.
pub struct MapSession<R: MapRenderer> {
    renderer: R,
    markers: Vec<R::Layer>,
    route_line: Option<R::Layer>,
    live_marker: Option<R::Layer>,
}

impl<R: MapRenderer> MapSession<R> {
    /// Creates a new session, centering the renderer on the network's initial view.
    pub fn new(mut renderer: R, network: &Network) -> Self {
        renderer.set_view(network.view.center, network.view.zoom);
        Self {
            renderer,
            markers: Vec::default(),
            route_line: None,
            live_marker: None,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Returns `true` if a live device marker is shown.
    pub fn is_tracking(&self) -> bool {
        self.live_marker.is_some()
    }

    /// Removes the shown route: all location markers and the route line.
    pub fn clear(&mut self) {
        for marker in self.markers.drain(..) {
            self.renderer.remove(marker);
        }
        if let Some(line) = self.route_line.take() {
            self.renderer.remove(line);
        }
    }

    /// Places a labeled marker for every location of the network,
    /// replacing the shown route.
    pub fn show_locations(&mut self, network: &Network) {
        self.clear();
        for (name, &pos) in &network.locations {
            let marker = self.renderer.add_marker(pos, name);
            self.markers.push(marker);
        }
    }

    /// Finds and draws the shortest route between two named locations.
    ///
    /// The previously shown route is always cleared. Names are trimmed before lookup.
    /// Nothing is drawn if the route can't be found.
    pub fn show_route(&mut self, network: &Network, start: &str, end: &str) -> Status {
        self.clear();

        let route = match find_route(&network.graph, start.trim(), end.trim()) {
            Ok(route) => route,
            Err(RouteError::UnknownNode(name)) => {
                log::warn!("unknown location: {:?}", name);
                return Status::InvalidLocation;
            }
            Err(RouteError::Unreachable { from, to }) => {
                log::warn!("no route from {:?} to {:?}", from, to);
                return Status::Unreachable { from, to };
            }
        };

        let stops = network.route_positions(&route);
        for &(name, pos) in &stops {
            let marker = self.renderer.add_marker(pos, name);
            self.markers.push(marker);
        }

        let points: Vec<Position> = stops.iter().map(|&(_, pos)| pos).collect();
        self.route_line = Some(self.renderer.add_line(&points));

        log::info!(
            "route {} -> {}: {} km over {} locations",
            start.trim(),
            end.trim(),
            route.distance,
            route.path.len(),
        );
        Status::Route(route)
    }

    /// Shows the live device at the position of the given fix,
    /// creating its marker on the first call.
    pub fn update_live_position(&mut self, fix: &Fix) -> Status {
        let pos = fix.position();
        match &self.live_marker {
            Some(marker) => self.renderer.move_marker(marker, pos),
            None => {
                log::info!("live tracking started");
                self.live_marker = Some(self.renderer.add_marker(pos, LIVE_LABEL));
            }
        }

        self.renderer.set_view(pos, LIVE_ZOOM);
        Status::Tracking(pos)
    }

    /// Removes the live device marker.
    /// Returns [None] if live tracking wasn't active.
    pub fn stop_tracking(&mut self) -> Option<Status> {
        let marker = self.live_marker.take()?;
        self.renderer.remove(marker);
        log::info!("live tracking stopped");
        Some(Status::TrackingStopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::{GeoJsonRenderer, Shape};

    fn session() -> (MapSession<GeoJsonRenderer>, Network) {
        let network = Network::bangalore();
        (MapSession::new(GeoJsonRenderer::default(), &network), network)
    }

    fn fix(lat: f32, lon: f32) -> Fix {
        Fix {
            lat,
            lon,
            heading: None,
            speed: None,
            timestamp: chrono::DateTime::from_timestamp(0, 0).unwrap(),
        }
    }

    #[test]
    fn new_session_sets_initial_view() {
        let (s, network) = session();
        assert_eq!(s.renderer().view(), Some((network.view.center, 11)));
    }

    #[test]
    fn show_route() {
        let (mut s, network) = session();
        let status = s.show_route(&network, " Majestic ", "Jayanagar");

        let Status::Route(route) = &status else {
            panic!("expected a route, got {:?}", status);
        };
        assert_eq!(route.path, vec!["Majestic", "KR Market", "Jayanagar"]);
        assert_eq!(route.distance, 9.0);

        let shapes: Vec<_> = s.renderer().shapes().collect();
        assert_eq!(shapes.len(), 4);
        assert_eq!(
            shapes[0],
            &Shape::Marker {
                at: network.position("Majestic").unwrap(),
                label: "Majestic".to_string(),
            }
        );
        assert_eq!(
            shapes[3],
            &Shape::Line {
                points: vec![
                    network.position("Majestic").unwrap(),
                    network.position("KR Market").unwrap(),
                    network.position("Jayanagar").unwrap(),
                ],
            }
        );

        assert_eq!(
            status.to_string(),
            "Shortest Route: Majestic → KR Market → Jayanagar\nTotal Distance: 9 km",
        );
    }

    #[test]
    fn show_route_replaces_previous() {
        let (mut s, network) = session();
        s.show_route(&network, "Hebbal", "Electronic City");
        assert_eq!(s.renderer().shapes().count(), 9);

        s.show_route(&network, "Silk Board", "Electronic City");
        assert_eq!(s.renderer().shapes().count(), 3);

        s.clear();
        assert_eq!(s.renderer().shapes().count(), 0);
    }

    #[test]
    fn show_locations() {
        let (mut s, network) = session();
        s.show_locations(&network);
        assert_eq!(s.renderer().shapes().count(), 8);
        assert!(s
            .renderer()
            .shapes()
            .all(|shape| matches!(shape, Shape::Marker { .. })));

        s.show_route(&network, "Hebbal", "Hebbal");
        assert_eq!(s.renderer().shapes().count(), 2);
    }

    #[test]
    fn invalid_location_clears_map() {
        let (mut s, network) = session();
        s.show_route(&network, "Hebbal", "Majestic");

        let status = s.show_route(&network, "Hebbal", "Whitefield");
        assert_eq!(status, Status::InvalidLocation);
        assert_eq!(status.to_string(), "Invalid Location");
        assert_eq!(s.renderer().shapes().count(), 0);
    }

    #[test]
    fn unreachable_location() {
        let (mut s, mut network) = session();
        network.graph.set_node("Whitefield");
        network
            .locations
            .insert("Whitefield".to_string(), Position::new(12.9698, 77.7500));

        let status = s.show_route(&network, "Hebbal", "Whitefield");
        assert_eq!(
            status,
            Status::Unreachable {
                from: "Hebbal".to_string(),
                to: "Whitefield".to_string(),
            }
        );
        assert_eq!(s.renderer().shapes().count(), 0);
    }

    #[test]
    fn live_tracking() {
        let (mut s, network) = session();
        assert!(!s.is_tracking());
        assert_eq!(s.stop_tracking(), None);

        s.show_route(&network, "Hebbal", "Majestic");
        let status = s.update_live_position(&fix(12.5, 77.25));
        assert!(s.is_tracking());
        assert_eq!(
            status.to_string(),
            "Status: Tracking Active\nLatitude: 12.500000\nLongitude: 77.250000",
        );

        let status = s.update_live_position(&fix(12.98, 77.60));
        assert_eq!(status, Status::Tracking(Position::new(12.98, 77.60)));
        assert_eq!(
            s.renderer().view(),
            Some((Position::new(12.98, 77.60), LIVE_ZOOM))
        );

        // Route markers and line, plus a single live marker
        let shapes: Vec<_> = s.renderer().shapes().collect();
        assert_eq!(shapes.len(), 5);
        assert_eq!(
            shapes[4],
            &Shape::Marker {
                at: Position::new(12.98, 77.60),
                label: "Live Device".to_string(),
            }
        );

        assert_eq!(s.stop_tracking(), Some(Status::TrackingStopped));
        assert!(!s.is_tracking());
        assert_eq!(s.renderer().shapes().count(), 4);
    }
}
