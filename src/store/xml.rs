// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;
use std::str::from_utf8;

use quick_xml::events::{BytesStart, Event};

use crate::geometry::{Point, Polyline, Srid};
use crate::model::{Intersection, NodeId, Oneway, RoadClass, Street, StreetId, StreetName};

/// Element of a street network file.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Record {
    Network(Srid),
    Intersection(Intersection),
    Street(Street),
}

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
pub(super) trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
pub(super) struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> IoParser<R> {
    #[inline]
    fn new(reader: R) -> Self {
        Self(quick_xml::Reader::from_reader(reader), Vec::default())
    }
}

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>> {
        self.1.clear();
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
pub(super) struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> BufParser<'a> {
    #[inline]
    fn new(data: &'a [u8]) -> Self {
        Self(quick_xml::Reader::from_reader(data))
    }
}

impl<'a> Parser for BufParser<'a> {
    #[inline]
    fn read_event<'b>(&'b mut self) -> quick_xml::Result<Event<'b>> {
        self.0.read_event()
    }
}

/// Value of the `cost` attribute of a street.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CostAttr {
    /// Attribute not present, cost equals the geometry length.
    Length,
    Impassable,
    Value(f64),
}

/// Street whose `<pt>` children are still being read.
#[derive(Debug)]
struct PendingStreet {
    id: StreetId,
    start: NodeId,
    end: NodeId,
    name: Option<StreetName>,
    class: RoadClass,
    oneway: Oneway,
    bike_oneway: Option<Oneway>,
    cost: CostAttr,
    points: Vec<Point>,
}

impl PendingStreet {
    fn finish(self) -> Option<Street> {
        let geometry = match Polyline::new(self.points) {
            Ok(g) => g,
            Err(e) => {
                log::warn!("street {}: invalid geometry: {}", self.id, e);
                return None;
            }
        };

        let cost = match self.cost {
            CostAttr::Length => Some(geometry.length()),
            CostAttr::Impassable => None,
            CostAttr::Value(v) => Some(v),
        };

        Some(Street {
            id: self.id,
            start: self.start,
            end: self.end,
            geometry,
            name: self.name,
            class: self.class,
            oneway: self.oneway,
            bike_oneway: self.bike_oneway,
            cost,
        })
    }
}

/// Reader reads [Records](Record) from a street network XML file:
///
/// ```xml
/// <network srid="3857">
///   <intersection id="1" x="..." y="..." />
///   <street id="10" from="1" to="2" name="Main" type="St" class="residential" oneway="no">
///     <pt x="..." y="..." />
///     <pt x="..." y="..." />
///   </street>
/// </network>
/// ```
///
/// Invalid elements are logged and skipped.
pub(super) struct Reader<P: Parser> {
    parser: P,
    street: Option<PendingStreet>,
    eof: bool,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self {
            parser,
            street: None,
            eof: false,
        }
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    pub(super) fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser::new(data))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    pub(super) fn from_io(reader: R) -> Self {
        Self::new(IoParser::new(reader))
    }
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<Record, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.eof {
            let event = match self.parser.read_event() {
                Ok(e) => e,
                Err(e) => return Some(Err(e)),
            };

            match event {
                Event::Empty(start) => match start.local_name().as_ref() {
                    b"intersection" => {
                        if let Some(i) = parse_intersection(&start) {
                            return Some(Ok(Record::Intersection(i)));
                        }
                    }
                    b"pt" => {
                        if let Some(ref mut street) = self.street {
                            match parse_point(&start) {
                                Some(pt) => street.points.push(pt),
                                None => log::warn!("street {}: skipping invalid <pt>", street.id),
                            }
                        }
                    }
                    b"street" => {
                        if let Some(street) = parse_street(&start) {
                            log::warn!("street {}: no geometry", street.id);
                        }
                    }
                    b"network" => return Some(Ok(Record::Network(parse_srid(&start)))),
                    _ => {}
                },

                Event::Start(start) => match start.local_name().as_ref() {
                    b"street" => self.street = parse_street(&start),
                    b"network" => return Some(Ok(Record::Network(parse_srid(&start)))),
                    _ => {}
                },

                Event::End(end) => {
                    if end.local_name().as_ref() == b"street" {
                        if let Some(street) = self.street.take().and_then(PendingStreet::finish) {
                            return Some(Ok(Record::Street(street)));
                        }
                    }
                }

                Event::Eof => {
                    self.eof = true;
                }

                _ => {}
            }
        }

        None
    }
}

fn attr_str(start: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    start
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn attr_parse<T: std::str::FromStr>(start: &BytesStart<'_>, key: &[u8]) -> Result<Option<T>, String> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_ref() == key {
            let s = from_utf8(&attr.value).map_err(|e| e.to_string())?;
            return s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| format!("invalid {}: {:?}", String::from_utf8_lossy(key), s));
        }
    }
    Ok(None)
}

fn parse_srid(start: &BytesStart<'_>) -> Srid {
    match attr_parse::<u32>(start, b"srid") {
        Ok(Some(code)) => Srid::from_code(code).unwrap_or_else(|| {
            log::warn!("unsupported network srid {}, assuming planar coordinates", code);
            Srid::Cartesian
        }),
        Ok(None) => Srid::default(),
        Err(e) => {
            log::warn!("network: {}", e);
            Srid::default()
        }
    }
}

fn parse_point(start: &BytesStart<'_>) -> Option<Point> {
    match (attr_parse::<f64>(start, b"x"), attr_parse::<f64>(start, b"y")) {
        (Ok(Some(x)), Ok(Some(y))) if x.is_finite() && y.is_finite() => Some(Point::new(x, y)),
        _ => None,
    }
}

fn parse_intersection(start: &BytesStart<'_>) -> Option<Intersection> {
    let id = match attr_parse::<NodeId>(start, b"id") {
        Ok(Some(id)) if id >= 0 => id,
        Ok(_) => {
            log::warn!("skipping intersection without a valid id");
            return None;
        }
        Err(e) => {
            log::warn!("skipping intersection: {}", e);
            return None;
        }
    };

    match parse_point(start) {
        Some(point) => Some(Intersection { id, point }),
        None => {
            log::warn!("intersection {}: invalid coordinates", id);
            None
        }
    }
}

fn parse_oneway(start: &BytesStart<'_>, key: &[u8]) -> Result<Option<Oneway>, String> {
    match attr_str(start, key) {
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| format!("invalid {}: {:?}", String::from_utf8_lossy(key), v)),
        None => Ok(None),
    }
}

fn parse_street(start: &BytesStart<'_>) -> Option<PendingStreet> {
    let id = match attr_parse::<StreetId>(start, b"id") {
        Ok(Some(id)) if id >= 0 => id,
        Ok(_) => {
            log::warn!("skipping street without a valid id");
            return None;
        }
        Err(e) => {
            log::warn!("skipping street: {}", e);
            return None;
        }
    };

    let fields = || -> Result<PendingStreet, String> {
        let start_id = attr_parse::<NodeId>(start, b"from")?.ok_or("missing from")?;
        let end_id = attr_parse::<NodeId>(start, b"to")?.ok_or("missing to")?;

        let name = attr_str(start, b"name")
            .filter(|n| !n.is_empty())
            .map(|name| StreetName {
                name,
                kind: attr_str(start, b"type").filter(|k| !k.is_empty()),
            });

        let class = match attr_str(start, b"class") {
            Some(c) => c
                .parse()
                .map_err(|_| format!("unknown class: {:?}", c))?,
            None => RoadClass::Unclassified,
        };

        let cost = match attr_str(start, b"cost").as_deref() {
            None => CostAttr::Length,
            Some("none") => CostAttr::Impassable,
            Some(v) => CostAttr::Value(
                v.trim()
                    .parse()
                    .map_err(|_| format!("invalid cost: {:?}", v))?,
            ),
        };

        Ok(PendingStreet {
            id,
            start: start_id,
            end: end_id,
            name,
            class,
            oneway: parse_oneway(start, b"oneway")?.unwrap_or_default(),
            bike_oneway: parse_oneway(start, b"oneway_bicycle")?,
            cost,
            points: Vec::new(),
        })
    };

    match fields() {
        Ok(street) => Some(street),
        Err(e) => {
            log::warn!("skipping street {}: {}", id, e);
            None
        }
    }
}
