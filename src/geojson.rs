// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! A [MapRenderer] which keeps its layers in memory and
//! exports them as a [GeoJSON](https://geojson.org/) FeatureCollection.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::{MapRenderer, Position};

/// Handle to a layer added to a [GeoJsonRenderer].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(u64);

/// A single drawn layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Marker { at: Position, label: String },
    Line { points: Vec<Position> },
}

impl Shape {
    fn to_feature(&self) -> Value {
        match self {
            Self::Marker { at, label } => json!({
                "type": "Feature",
                "properties": { "name": label },
                "geometry": {
                    "type": "Point",
                    "coordinates": coordinates(*at),
                },
            }),

            Self::Line { points } => json!({
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "LineString",
                    "coordinates": points.iter().map(|&p| coordinates(p)).collect::<Vec<_>>(),
                },
            }),
        }
    }
}

/// GeoJSON positions are written as longitude first.
fn coordinates(p: Position) -> [f32; 2] {
    [p.lon, p.lat]
}

#[derive(Debug, Default, Clone)]
pub struct GeoJsonRenderer {
    layers: BTreeMap<LayerId, Shape>,
    next_id: u64,
    view: Option<(Position, u8)>,
}

impl GeoJsonRenderer {
    fn insert(&mut self, shape: Shape) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.insert(id, shape);
        id
    }

    /// Returns all currently drawn shapes, in the order they were added.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.layers.values()
    }

    /// Returns the last requested map center and zoom level.
    pub fn view(&self) -> Option<(Position, u8)> {
        self.view
    }

    /// Exports all currently drawn shapes as a GeoJSON FeatureCollection.
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.shapes().map(Shape::to_feature).collect::<Vec<_>>(),
        })
    }
}

impl MapRenderer for GeoJsonRenderer {
    type Layer = LayerId;

    fn add_marker(&mut self, at: Position, label: &str) -> LayerId {
        self.insert(Shape::Marker {
            at,
            label: label.to_string(),
        })
    }

    fn add_line(&mut self, points: &[Position]) -> LayerId {
        self.insert(Shape::Line {
            points: points.to_vec(),
        })
    }

    fn move_marker(&mut self, marker: &LayerId, to: Position) {
        match self.layers.get_mut(marker) {
            Some(Shape::Marker { at, .. }) => *at = to,
            Some(Shape::Line { .. }) => log::warn!("layer {:?} is not a marker", marker),
            None => log::warn!("layer {:?} doesn't exist", marker),
        }
    }

    fn remove(&mut self, layer: LayerId) {
        self.layers.remove(&layer);
    }

    fn set_view(&mut self, center: Position, zoom: u8) {
        self.view = Some((center, zoom));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_collection() {
        let mut r = GeoJsonRenderer::default();
        let a = Position::new(12.5, 77.5);
        let b = Position::new(13.0, 77.75);

        let marker = r.add_marker(a, "A");
        r.add_line(&[a, b]);
        r.move_marker(&marker, b);

        assert_eq!(
            r.to_geojson(),
            json!({
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": { "name": "A" },
                        "geometry": { "type": "Point", "coordinates": [77.75, 13.0] },
                    },
                    {
                        "type": "Feature",
                        "properties": {},
                        "geometry": {
                            "type": "LineString",
                            "coordinates": [[77.5, 12.5], [77.75, 13.0]],
                        },
                    },
                ],
            })
        );
    }

    #[test]
    fn remove_layers() {
        let mut r = GeoJsonRenderer::default();
        let marker = r.add_marker(Position::new(1.0, 2.0), "A");
        let line = r.add_line(&[]);
        assert_ne!(marker, line);

        r.remove(marker);
        assert_eq!(r.shapes().collect::<Vec<_>>(), vec![&Shape::Line { points: vec![] }]);

        // Moving a removed marker is a no-op
        r.move_marker(&marker, Position::new(3.0, 4.0));
        r.remove(line);
        assert_eq!(r.shapes().count(), 0);
        assert_eq!(r.to_geojson()["features"], json!([]));
    }
}
