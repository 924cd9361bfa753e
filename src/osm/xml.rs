// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;
use std::str::from_utf8;

use quick_xml::events::{BytesStart, Event};

use super::model;

pub fn features_from_io<R: io::BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<model::Feature, quick_xml::Error>> {
    Reader::from_io(reader)
}

pub fn features_from_buffer(
    b: &[u8],
) -> impl Iterator<Item = Result<model::Feature, quick_xml::Error>> + '_ {
    Reader::from_buffer(b)
}

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> IoParser<R> {
    #[inline]
    fn new(reader: R) -> Self {
        Self(quick_xml::Reader::from_reader(reader), Vec::default())
    }
}

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>> {
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

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

/// Reader streams OSM [Features](model::Feature) from an XML document.
///
/// Malformed elements (missing or unparsable mandatory attributes) are
/// skipped; only XML-level failures surface as errors.
struct Reader<P: Parser> {
    parser: P,
    eof: bool,
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<model::Feature, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut f: Option<model::Feature> = None;

        while !self.eof {
            let event = match self.parser.read_event() {
                Ok(e) => e,
                Err(e) => return Some(Err(e)),
            };

            match event {
                Event::Empty(start) => match start.local_name().as_ref() {
                    b"node" => {
                        if let Some(n) = parse_node(&start) {
                            return Some(Ok(model::Feature::Node(n)));
                        }
                    }
                    // "way" and "relation" can't be self-closing
                    b"tag" => {
                        if let (Some(tags), Some((k, v))) = (feature_tags(&mut f), parse_tag(&start))
                        {
                            tags.insert(k, v);
                        }
                    }
                    b"nd" => {
                        if let (Some(nodes), Some(ref_)) = (feature_nodes(&mut f), parse_nd(&start))
                        {
                            nodes.push(ref_);
                        }
                    }
                    b"member" => {
                        if let (Some(members), Some(member)) =
                            (feature_members(&mut f), parse_member(&start))
                        {
                            members.push(member);
                        }
                    }
                    _ => {}
                },

                Event::Start(start) => match start.local_name().as_ref() {
                    b"node" => f = parse_node(&start).map(model::Feature::Node),
                    b"way" => f = parse_way(&start).map(model::Feature::Way),
                    b"relation" => f = parse_relation(&start).map(model::Feature::Relation),
                    // "tag", "nd" and "member" must be self-closing
                    _ => {}
                },

                Event::End(end) => match end.local_name().as_ref() {
                    b"node" | b"way" | b"relation" => {
                        if let Some(f) = f.take() {
                            return Some(Ok(f));
                        }
                    }
                    _ => {}
                },

                Event::Eof => {
                    self.eof = true;
                }

                _ => {}
            }
        }

        return f.map(Ok);
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    fn from_buffer(data: &'a [u8]) -> Self {
        Self {
            parser: BufParser::new(data),
            eof: false,
        }
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    fn from_io(reader: R) -> Self {
        Self {
            parser: IoParser::new(reader),
            eof: false,
        }
    }
}

fn parse_node(start: &BytesStart<'_>) -> Option<model::Node> {
    let mut id: i64 = 0;
    let mut lat = f64::NAN;
    let mut lon = f64::NAN;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        match attr.key.as_ref() {
            b"id" => id = from_utf8(&attr.value).ok()?.parse().ok()?,
            b"lat" => lat = from_utf8(&attr.value).ok()?.parse().ok()?,
            b"lon" => lon = from_utf8(&attr.value).ok()?.parse().ok()?,
            _ => {}
        }
    }

    if id != 0 && lat.is_finite() && lon.is_finite() {
        Some(model::Node { id, lat, lon })
    } else {
        None
    }
}

/// Extracts the `id` attribute; used for both ways and relations,
/// whose remaining content arrives through child elements.
fn parse_feature_id(start: &BytesStart<'_>) -> Option<i64> {
    let mut id: i64 = 0;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        if attr.key.as_ref() == b"id" {
            id = from_utf8(&attr.value).ok()?.parse().ok()?;
        }
    }

    if id != 0 {
        Some(id)
    } else {
        None
    }
}

fn parse_way(start: &BytesStart<'_>) -> Option<model::Way> {
    parse_feature_id(start).map(|id| model::Way {
        id,
        nodes: Vec::default(),
        tags: model::Tags::default(),
    })
}

fn parse_relation(start: &BytesStart<'_>) -> Option<model::Relation> {
    parse_feature_id(start).map(|id| model::Relation {
        id,
        members: Vec::default(),
        tags: model::Tags::default(),
    })
}

fn parse_tag(start: &BytesStart<'_>) -> Option<(String, String)> {
    let mut k = None;
    let mut v = None;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        match attr.key.as_ref() {
            b"k" => k = from_utf8(&attr.value).ok().map(|s| s.to_string()),
            b"v" => v = from_utf8(&attr.value).ok().map(|s| s.to_string()),
            _ => {}
        }
    }

    k.map(|k| (k, v.unwrap_or_default()))
}

fn parse_nd(start: &BytesStart<'_>) -> Option<i64> {
    let mut ref_: i64 = 0;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        if attr.key.as_ref() == b"ref" {
            ref_ = from_utf8(&attr.value).ok()?.parse().ok()?;
        }
    }

    if ref_ != 0 {
        Some(ref_)
    } else {
        None
    }
}

fn parse_member(start: &BytesStart<'_>) -> Option<model::RelationMember> {
    let mut ref_: i64 = 0;
    let mut type_ = None;
    let mut role = None;

    for attr in start.attributes() {
        let attr = attr.ok()?;
        match attr.key.as_ref() {
            b"ref" => ref_ = from_utf8(&attr.value).ok()?.parse().ok()?,
            b"type" => type_ = Some(parse_feature_type(&attr.value)?),
            b"role" => role = Some(from_utf8(&attr.value).ok()?.to_string()),
            _ => {}
        }
    }

    match (ref_, type_, role) {
        (0, _, _) => None,
        (ref_, Some(type_), Some(role)) => Some(model::RelationMember { type_, ref_, role }),
        _ => None,
    }
}

fn parse_feature_type(s: &[u8]) -> Option<model::FeatureType> {
    match s {
        b"node" => Some(model::FeatureType::Node),
        b"way" => Some(model::FeatureType::Way),
        b"relation" => Some(model::FeatureType::Relation),
        _ => None,
    }
}

fn feature_tags<'a>(f: &'a mut Option<model::Feature>) -> Option<&'a mut model::Tags> {
    match f {
        Some(model::Feature::Way(ref mut w)) => Some(&mut w.tags),
        Some(model::Feature::Relation(ref mut r)) => Some(&mut r.tags),
        _ => None,
    }
}

fn feature_nodes<'a>(f: &'a mut Option<model::Feature>) -> Option<&'a mut Vec<i64>> {
    match f {
        Some(model::Feature::Way(ref mut w)) => Some(&mut w.nodes),
        _ => None,
    }
}

fn feature_members<'a>(
    f: &'a mut Option<model::Feature>,
) -> Option<&'a mut Vec<model::RelationMember>> {
    match f {
        Some(model::Feature::Relation(ref mut r)) => Some(&mut r.members),
        _ => None,
    }
}
