// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::mpsc;

use super::TrackRecord;
use crate::{MapRenderer, LIVE_ZOOM};

/// Label of the marker showing the remote device.
const DEVICE_LABEL: &str = "Tracked Device";

/// The receiving end of live tracking: shows the latest [TrackRecord]
/// published by a remote device on its own map.
pub struct Viewer<R: MapRenderer> {
    renderer: R,
    marker: Option<R::Layer>,
    latest: Option<TrackRecord>,
}

impl<R: MapRenderer> Viewer<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            marker: None,
            latest: None,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Returns the last shown record.
    pub fn latest(&self) -> Option<&TrackRecord> {
        self.latest.as_ref()
    }

    /// Moves the device marker to the position of the record,
    /// creating it on the first call, and centers the map on it.
    pub fn apply(&mut self, record: TrackRecord) {
        let pos = record.position();
        match &self.marker {
            Some(marker) => self.renderer.move_marker(marker, pos),
            None => self.marker = Some(self.renderer.add_marker(pos, DEVICE_LABEL)),
        }

        self.renderer.set_view(pos, LIVE_ZOOM);
        log::debug!(
            "device at {:.6}, {:.6}: {:.1} km/h, {:.3} km travelled",
            record.lat,
            record.lon,
            record.speed,
            record.distance,
        );
        self.latest = Some(record);
    }

    /// Applies every received record, until all senders are gone.
    pub fn follow(&mut self, records: &mpsc::Receiver<TrackRecord>) {
        for record in records.iter() {
            self.apply(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::{GeoJsonRenderer, Shape};
    use crate::tracking::{Fix, MemoryStore, Tracker, TrackerOptions};
    use crate::Position;
    use chrono::{DateTime, Duration};
    use std::thread;

    fn fix(lat: f32, lon: f32, after_secs: i64) -> Fix {
        Fix {
            lat,
            lon,
            heading: Some(0.0),
            speed: None,
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap()
                + Duration::seconds(after_secs),
        }
    }

    #[test]
    fn follows_tracker_across_threads() {
        let store = MemoryStore::default();
        let records = store.subscribe();

        let publisher = thread::spawn(move || {
            let mut tracker = Tracker::new(store, TrackerOptions::default());
            for i in 0..3 {
                tracker
                    .record(fix(12.5 + 0.25 * i as f32, 77.5, 60 * i))
                    .unwrap();
            }
            // Dropping the tracker (and the store) closes the subscription
        });

        let mut viewer = Viewer::new(GeoJsonRenderer::default());
        viewer.follow(&records);
        publisher.join().unwrap();

        let latest = viewer.latest().unwrap();
        assert_eq!(latest.position(), Position::new(13.0, 77.5));
        assert!((latest.distance - 0.5 * 111.195).abs() < 0.1);

        let shapes: Vec<_> = viewer.renderer().shapes().collect();
        assert_eq!(
            shapes,
            vec![&Shape::Marker {
                at: Position::new(13.0, 77.5),
                label: "Tracked Device".to_string(),
            }]
        );
        assert_eq!(
            viewer.renderer().view(),
            Some((Position::new(13.0, 77.5), LIVE_ZOOM))
        );
    }
}
