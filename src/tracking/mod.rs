// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Live device tracking: turning position fixes into [TrackRecords](TrackRecord),
//! publishing them to a [TrackingStore], and showing them on a remote [Viewer].

use std::collections::VecDeque;
use std::io;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Position;

mod source;
mod store;
mod viewer;

pub use source::JsonLinesSource;
pub use store::{JsonLinesStore, MemoryStore, StoreError};
pub use viewer::Viewer;

/// A single position sample reported by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub lat: f32,
    pub lon: f32,

    /// Direction of travel in degrees clockwise from true north, if known.
    #[serde(default)]
    pub heading: Option<f32>,

    /// Speed reported by the device, in km/h, if known.
    #[serde(default)]
    pub speed: Option<f32>,

    pub timestamp: DateTime<Utc>,
}

impl Fix {
    pub fn position(&self) -> Position {
        Position::new(self.lat, self.lon)
    }
}

/// Reasons why a position source failed to provide a [Fix].
#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    /// The user refused access to their location. No more fixes will follow.
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error("malformed position: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] io::Error),
}

/// The record published for every [Fix] by a [Tracker].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub lat: f32,
    pub lon: f32,

    /// Current speed, in km/h.
    pub speed: f32,

    /// Distance travelled since tracking started, in km.
    pub distance: f32,

    pub heading: Option<f32>,
    pub timestamp: DateTime<Utc>,
}

impl TrackRecord {
    pub fn position(&self) -> Position {
        Position::new(self.lat, self.lon)
    }
}

/// Destination of [TrackRecords](TrackRecord), usually shared with remote viewers.
pub trait TrackingStore {
    type Error: std::error::Error;

    /// Publishes a record, replacing the latest one.
    fn write(&mut self, record: &TrackRecord) -> Result<(), Self::Error>;
}

/// Default value of [TrackerOptions::max_path_points].
pub const DEFAULT_MAX_PATH_POINTS: usize = 1000;

/// Additional controls for a [Tracker].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerOptions {
    /// How many most recent positions to keep in [Tracker::path].
    /// Older positions are discarded; they still count towards the travelled distance.
    pub max_path_points: usize,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            max_path_points: DEFAULT_MAX_PATH_POINTS,
        }
    }
}

/// Error returned by [Tracker::run].
#[derive(Debug, thiserror::Error)]
pub enum TrackingError<E: std::error::Error + 'static> {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("store: {0}")]
    Store(#[source] E),
}

/// Accumulates travelled distance over consecutive [Fixes](Fix)
/// and publishes a [TrackRecord] for each of them.
pub struct Tracker<S: TrackingStore> {
    store: S,
    options: TrackerOptions,
    last: Option<Fix>,
    distance: f32,
    path: VecDeque<Position>,
}

impl<S: TrackingStore> Tracker<S> {
    pub fn new(store: S, options: TrackerOptions) -> Self {
        Self {
            store,
            options,
            last: None,
            distance: 0.0,
            path: VecDeque::default(),
        }
    }

    /// Distance travelled since tracking started, in km.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Most recent positions, oldest first.
    pub fn path(&self) -> impl Iterator<Item = &Position> {
        self.path.iter()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Accounts for a new [Fix] and publishes the resulting [TrackRecord].
    ///
    /// If the fix doesn't report its speed, it is computed from the distance
    /// and time since the previous fix (zero for the first fix, or if the time
    /// didn't advance).
    ///
    /// If the store rejects the record, the fix is discarded and the tracker
    /// state (distance, path, previous fix) is left unchanged.
    pub fn record(&mut self, fix: Fix) -> Result<TrackRecord, S::Error> {
        let pos = fix.position();
        let (hop, elapsed) = match &self.last {
            Some(last) => (
                last.position().distance_to(pos),
                (fix.timestamp - last.timestamp).num_milliseconds(),
            ),
            None => (0.0, 0),
        };

        let distance = self.distance + hop;

        let speed = match fix.speed {
            Some(speed) => speed,
            None if elapsed > 0 => hop / (elapsed as f32 / 3_600_000.0),
            None => 0.0,
        };

        let record = TrackRecord {
            lat: fix.lat,
            lon: fix.lon,
            speed,
            distance,
            heading: fix.heading,
            timestamp: fix.timestamp,
        };

        // Nothing is committed unless the record was published
        self.store.write(&record)?;

        if self.options.max_path_points > 0 {
            while self.path.len() >= self.options.max_path_points {
                self.path.pop_front();
            }
            self.path.push_back(pos);
        }
        self.distance = distance;
        self.last = Some(fix);
        Ok(record)
    }

    /// Records every [Fix] from the source, until it's exhausted.
    ///
    /// Stops with [TrackingError::PermissionDenied] once the source reports so.
    /// Other source errors are logged and skipped.
    pub fn run<I>(&mut self, source: I) -> Result<(), TrackingError<S::Error>>
    where
        I: IntoIterator<Item = Result<Fix, PositionError>>,
        S::Error: 'static,
    {
        log::info!("live tracking started");
        for fix in source {
            match fix {
                Ok(fix) => {
                    self.record(fix).map_err(TrackingError::Store)?;
                }
                Err(PositionError::PermissionDenied) => {
                    log::error!("location permission denied");
                    return Err(TrackingError::PermissionDenied);
                }
                Err(e) => log::warn!("skipping position: {}", e),
            }
        }

        log::info!("live tracking stopped after {:.3} km", self.distance);
        Ok(())
    }
}
