// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::borrow::Cow;
use std::io;
use std::str::{from_utf8, FromStr};

use quick_xml::events::{BytesStart, Event};

use super::{model, LoadError};
use crate::network::View;
use crate::Position;

/// Reader reads network [Features](model::Feature) from an XML document.
///
/// Only `<view>`, `<location>` and `<road>` elements are interpreted,
/// regardless of their nesting. Everything else is skipped.
pub(super) struct Reader<R: io::BufRead> {
    parser: quick_xml::Reader<R>,
    buf: Vec<u8>,
    eof: bool,
}

impl<R: io::BufRead> Reader<R> {
    pub(super) fn from_io(reader: R) -> Self {
        Self {
            parser: quick_xml::Reader::from_reader(reader),
            buf: Vec::default(),
            eof: false,
        }
    }
}

impl<R: io::BufRead> Iterator for Reader<R> {
    type Item = Result<model::Feature, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.eof {
            self.buf.clear();
            let event = match self.parser.read_event_into(&mut self.buf) {
                Ok(e) => e,
                Err(e) => {
                    self.eof = true;
                    return Some(Err(e.into()));
                }
            };

            let feature = match event {
                // Children of non-self-closing elements are ignored,
                // so Start and Empty events are handled the same way.
                Event::Start(start) | Event::Empty(start) => parse_feature(&start),
                Event::Eof => {
                    self.eof = true;
                    None
                }
                _ => None,
            };

            if feature.is_some() {
                return feature;
            }
        }

        None
    }
}

fn parse_feature(start: &BytesStart<'_>) -> Option<Result<model::Feature, LoadError>> {
    match start.local_name().as_ref() {
        b"view" => Some(parse_view(start).map(model::Feature::View)),
        b"location" => Some(parse_location(start).map(model::Feature::Location)),
        b"road" => Some(parse_road(start).map(model::Feature::Road)),
        _ => None,
    }
}

/// Attributes of a single element, indexed by their names.
struct Attributes<'a> {
    element: &'static str,
    start: &'a BytesStart<'a>,
}

impl<'a> Attributes<'a> {
    fn new(element: &'static str, start: &'a BytesStart<'a>) -> Self {
        Self { element, start }
    }

    fn invalid(&self, attribute: &'static str) -> LoadError {
        LoadError::InvalidAttribute {
            element: self.element,
            attribute,
        }
    }

    /// Returns the unescaped value of an attribute, or `None` if it is not present.
    fn get(&self, attribute: &'static str) -> Result<Option<String>, LoadError> {
        for attr in self.start.attributes() {
            let attr = attr.map_err(|_| self.invalid(attribute))?;
            if attr.key.as_ref() != attribute.as_bytes() {
                continue;
            }

            let raw = from_utf8(&attr.value).map_err(|_| self.invalid(attribute))?;
            let value = quick_xml::escape::unescape(raw).map_err(|_| self.invalid(attribute))?;
            return Ok(Some(Cow::into_owned(value)));
        }
        Ok(None)
    }

    fn required(&self, attribute: &'static str) -> Result<String, LoadError> {
        self.get(attribute)?.ok_or_else(|| self.invalid(attribute))
    }

    fn parse<T: FromStr>(&self, attribute: &'static str) -> Result<T, LoadError> {
        self.required(attribute)?
            .trim()
            .parse()
            .map_err(|_| self.invalid(attribute))
    }

    fn position(&self) -> Result<Position, LoadError> {
        let lat: f32 = self.parse("lat")?;
        let lon: f32 = self.parse("lon")?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(self.invalid("lat"));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(self.invalid("lon"));
        }
        Ok(Position::new(lat, lon))
    }
}

fn parse_view(start: &BytesStart<'_>) -> Result<View, LoadError> {
    let attrs = Attributes::new("view", start);
    Ok(View {
        center: attrs.position()?,
        zoom: attrs.parse("zoom")?,
    })
}

fn parse_location(start: &BytesStart<'_>) -> Result<model::Location, LoadError> {
    let attrs = Attributes::new("location", start);
    let name = attrs.required("name")?;
    if name.trim().is_empty() {
        return Err(attrs.invalid("name"));
    }

    Ok(model::Location {
        name,
        position: attrs.position()?,
    })
}

fn parse_road(start: &BytesStart<'_>) -> Result<model::Road, LoadError> {
    let attrs = Attributes::new("road", start);
    let oneway = match attrs.get("oneway")?.as_deref() {
        None | Some("no") => false,
        Some("yes") => true,
        Some(_) => return Err(attrs.invalid("oneway")),
    };

    Ok(model::Road {
        from: attrs.required("from")?,
        to: attrs.required("to")?,
        km: attrs.parse("km")?,
        oneway,
    })
}
