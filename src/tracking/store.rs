// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::convert::Infallible;
use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{TrackRecord, TrackingStore};

#[derive(Debug, Default)]
struct Shared {
    latest: Option<TrackRecord>,
    subscribers: Vec<mpsc::Sender<TrackRecord>>,
}

/// In-process [TrackingStore] which keeps the latest record and pushes
/// every new one to all subscribers.
///
/// Clones share the same state, so one clone can be handed to a
/// [Tracker](super::Tracker) and another one to whoever serves viewers.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore(Arc<Mutex<Shared>>);

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        // Shared is consistent after every statement, poisoning can be ignored
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the most recently written record.
    pub fn latest(&self) -> Option<TrackRecord> {
        self.lock().latest.clone()
    }

    /// Subscribes to the stream of records.
    ///
    /// The receiver immediately gets the latest record (if any),
    /// followed by every record written afterwards.
    /// Dropping the receiver cancels the subscription.
    pub fn subscribe(&self) -> mpsc::Receiver<TrackRecord> {
        let (tx, rx) = mpsc::channel();
        let mut shared = self.lock();

        if let Some(latest) = &shared.latest {
            // Can't fail, the receiver is still alive
            let _ = tx.send(latest.clone());
        }

        shared.subscribers.push(tx);
        rx
    }

    /// Returns the number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

impl TrackingStore for MemoryStore {
    type Error = Infallible;

    fn write(&mut self, record: &TrackRecord) -> Result<(), Infallible> {
        let mut shared = self.lock();
        shared.latest = Some(record.clone());
        shared.subscribers.retain(|tx| tx.send(record.clone()).is_ok());
        Ok(())
    }
}

/// Error conditions which may occur when writing to a [JsonLinesStore].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// [TrackingStore] which writes every record as a single line of JSON.
pub struct JsonLinesStore<W: io::Write> {
    writer: W,
}

impl<W: io::Write> JsonLinesStore<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> TrackingStore for JsonLinesStore<W> {
    type Error = StoreError;

    fn write(&mut self, record: &TrackRecord) -> Result<(), StoreError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
