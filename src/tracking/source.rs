// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;

use serde::Deserialize;

use super::{Fix, PositionError};

/// Error code which signals that location access was refused.
const PERMISSION_DENIED: &str = "permission_denied";

#[derive(Deserialize)]
#[serde(untagged)]
enum Line {
    Fix(Fix),
    Error { error: String },
}

/// Reads [Fixes](Fix) from a stream with one JSON object per line.
///
/// Each line is either a fix, for example
/// `{"lat": 12.97, "lon": 77.59, "heading": 90, "timestamp": "2025-01-01T08:00:00Z"}`,
/// or an error reported by the device, like `{"error": "permission_denied"}`.
/// Blank lines are skipped.
pub struct JsonLinesSource<R: io::BufRead> {
    lines: io::Lines<R>,
}

impl<R: io::BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: io::BufRead> Iterator for JsonLinesSource<R> {
    type Item = Result<Fix, PositionError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };

            if line.trim().is_empty() {
                continue;
            }

            return Some(match serde_json::from_str(&line) {
                Ok(Line::Fix(fix)) => Ok(fix),
                Ok(Line::Error { error }) if error == PERMISSION_DENIED => {
                    Err(PositionError::PermissionDenied)
                }
                Ok(Line::Error { error }) => Err(PositionError::Unavailable(error)),
                Err(e) => Err(e.into()),
            });
        }
    }
}
