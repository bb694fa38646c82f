// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use crate::network::{Network, View};
use crate::{Edge, Position};

mod model;
mod xml;

/// Format of the input network description file
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    #[default]
    Unknown,

    /// Force uncompressed XML
    Xml,

    /// Force XML with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force XML with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format from the first few bytes of a file.
    fn detect(head: &[u8]) -> Self {
        if head.starts_with(&[0x1F, 0x8B]) {
            Self::XmlGz
        } else if head.starts_with(b"BZh") {
            Self::XmlBz2
        } else {
            Self::Xml
        }
    }
}

/// Additional controls for loading a [Network].
#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Format of the input data.
    pub file_format: FileFormat,

    /// Filter locations by a specific bounding box. In order: left (min lon), bottom (min lat),
    /// right (max lon), top (max lat). Ignored if all values are set to zero, or at least one
    /// of them is not finite. Roads leading to filtered-out locations are dropped as well.
    pub bbox: [f32; 4],
}

impl Options {
    fn ignore_bbox(&self) -> bool {
        self.bbox.iter().all(|&x| x == 0.0) || self.bbox.iter().any(|x| !x.is_finite())
    }

    fn in_bbox(&self, pos: Position) -> bool {
        let [left, bottom, right, top] = self.bbox;
        pos.lon >= left && pos.lon <= right && pos.lat >= bottom && pos.lat <= top
    }
}

/// Error conditions which may occur while loading a [Network].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("<{element}>: missing or invalid {attribute:?} attribute")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("road {from:?} - {to:?}: invalid length {km}")]
    InvalidLength { from: String, to: String, km: f32 },
}

/// Adds all locations and roads from the provided features into a [Network].
///
/// All features are read and validated before the network is touched,
/// so a failed load leaves it unchanged. Roads are applied after locations,
/// as they may reference locations defined later in the file.
fn add_features<I>(n: &mut Network, options: &Options, features: I) -> Result<(), LoadError>
where
    I: Iterator<Item = Result<model::Feature, LoadError>>,
{
    let ignore_bbox = options.ignore_bbox();
    let mut dropped: HashSet<String> = HashSet::default();
    let mut locations: Vec<model::Location> = Vec::default();
    let mut roads: Vec<model::Road> = Vec::default();
    let mut view: Option<View> = None;

    for f in features {
        match f? {
            model::Feature::View(v) => view = Some(v),

            model::Feature::Location(loc) => {
                if ignore_bbox || options.in_bbox(loc.position) {
                    locations.push(loc);
                } else {
                    log::debug!("location {:?} is outside of the bounding box", loc.name);
                    dropped.insert(loc.name);
                }
            }

            model::Feature::Road(road) => {
                if !road.km.is_finite() || road.km < 0.0 {
                    return Err(LoadError::InvalidLength {
                        from: road.from,
                        to: road.to,
                        km: road.km,
                    });
                }
                roads.push(road);
            }
        }
    }

    let added = locations.len();
    for loc in locations {
        n.graph.set_node(loc.name.as_str());
        n.locations.insert(loc.name, loc.position);
    }

    for road in roads {
        if dropped.contains(&road.from) || dropped.contains(&road.to) {
            continue;
        }

        // Both ends are nodes, even for one-way roads
        n.graph.set_node(road.to.as_str());
        n.graph.set_edge(road.from.as_str(), Edge::new(road.to.as_str(), road.km));
        if !road.oneway {
            n.graph.set_edge(road.to, Edge::new(road.from, road.km));
        }
    }

    n.view = match view {
        Some(v) => v,
        None => centered_view(n),
    };
    log::info!(
        "loaded {} locations ({} outside of the bounding box), network has {} nodes",
        added,
        dropped.len(),
        n.graph.len(),
    );
    Ok(())
}

/// Creates a [View] centered on the mean position of all locations of a [Network].
fn centered_view(n: &Network) -> View {
    if n.locations.is_empty() {
        return View::default();
    }

    let count = n.locations.len() as f32;
    let (lat, lon) = n
        .locations
        .values()
        .fold((0.0, 0.0), |(lat, lon), pos| (lat + pos.lat, lon + pos.lon));

    View {
        center: Position::new(lat / count, lon / count),
        ..View::default()
    }
}

/// Parse a network description from a reader into a [Network] as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
pub fn add_features_from_io<R: io::Read>(
    n: &mut Network,
    options: &Options,
    reader: R,
) -> Result<(), LoadError> {
    let mut b = io::BufReader::new(reader);

    let file_format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(b.fill_buf()?),
        f => f,
    };

    match file_format {
        FileFormat::Unknown | FileFormat::Xml => add_features(n, options, xml::Reader::from_io(b)),

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            let r = xml::Reader::from_io(io::BufReader::new(d));
            add_features(n, options, r)
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            let r = xml::Reader::from_io(io::BufReader::new(d));
            add_features(n, options, r)
        }
    }
}

/// Parse a network description from a file at the provided path into a [Network]
/// as per the provided [Options].
pub fn add_features_from_file<P: AsRef<Path>>(
    n: &mut Network,
    options: &Options,
    path: P,
) -> Result<(), LoadError> {
    let f = File::open(path)?;
    add_features_from_io(n, options, f)
}

/// Parse a network description from a static buffer into a [Network]
/// as per the provided [Options].
pub fn add_features_from_buffer(
    n: &mut Network,
    options: &Options,
    data: &[u8],
) -> Result<(), LoadError> {
    add_features_from_io(n, options, data)
}
