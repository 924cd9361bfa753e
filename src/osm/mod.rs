// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;
use std::sync::Arc;

pub mod model;
mod xml;

pub use model::{has_kv, Feature, FeatureType, Node, Relation, RelationMember, Tags, Way};

/// Error which can occur during OSM reading and parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] Arc<io::Error>),

    #[error("xml: {0}")]
    Xml(quick_xml::Error),

    #[error("unknown file format: data does not look like .osm/.osm.gz/.osm.bz2")]
    UnknownFileFormat,
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(Arc::new(e))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        match e {
            quick_xml::Error::Io(ioe) => Error::Io(ioe),
            _ => Error::Xml(e),
        }
    }
}

/// Format of the input OSM data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    Unknown,

    /// Force uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Attempts to detect the file format based on the initial bytes of the data.
    pub fn detect(b: &[u8]) -> FileFormat {
        if b.starts_with(b"<?xml") || b.starts_with(b"<osm") {
            FileFormat::Xml
        } else if b.starts_with(b"\x1F\x8B") {
            FileFormat::XmlGz // Gzip magic bytes
        } else if b.starts_with(b"BZh") {
            FileFormat::XmlBz2 // Bzip2 magic bytes
        } else {
            FileFormat::Unknown
        }
    }
}

/// Trait alias for objects which can stream [osm features](model::Feature)
/// from an underlying source - alias for `IntoIterator<Item=Result<model::Feature, Error>>`.
trait FeatureReader: IntoIterator<Item = Result<model::Feature, Self::Error>> {
    type Error: std::error::Error;
}

impl<E: std::error::Error, I> FeatureReader for I
where
    I: IntoIterator<Item = Result<model::Feature, E>>,
{
    type Error = E;
}

/// An in-memory OSM dataset: [nodes](Node), [ways](Way) and [relations](Relation),
/// each stored sorted by id to support binary lookup.
///
/// The dataset is immutable once read; duplicate ids keep their first occurrence.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<model::Node>,
    ways: Vec<model::Way>,
    relations: Vec<model::Relation>,
}

impl Document {
    /// Reads an OSM document from a buffered reader as per the provided [FileFormat],
    /// detecting the format from the initial bytes when [FileFormat::Unknown] is given.
    pub fn read_from_io<R: io::BufRead>(mut reader: R, format: FileFormat) -> Result<Self, Error> {
        let detected_format = if format == FileFormat::Unknown {
            FileFormat::detect(reader.fill_buf()?)
        } else {
            format
        };

        match detected_format {
            FileFormat::Unknown => Err(Error::UnknownFileFormat),

            FileFormat::Xml => Self::from_features(xml::features_from_io(reader)),

            FileFormat::XmlGz => {
                let d = flate2::bufread::MultiGzDecoder::new(reader);
                let b = io::BufReader::new(d);
                Self::from_features(xml::features_from_io(b))
            }

            FileFormat::XmlBz2 => {
                let d = bzip2::bufread::MultiBzDecoder::new(reader);
                let b = io::BufReader::new(d);
                Self::from_features(xml::features_from_io(b))
            }
        }
    }

    /// Reads an OSM document from a static buffer, detecting the format
    /// from the initial bytes.
    pub fn read_from_buffer(data: &[u8]) -> Result<Self, Error> {
        if FileFormat::detect(data) == FileFormat::Xml {
            // Fast path is available for in-memory XML data
            Self::from_features(xml::features_from_buffer(data))
        } else {
            // Wrap the buffer in a cursor and use the IO path
            Self::read_from_io(io::Cursor::new(data), FileFormat::Unknown)
        }
    }

    /// Creates a Document directly from in-memory features.
    pub fn from_parts(
        nodes: Vec<model::Node>,
        ways: Vec<model::Way>,
        relations: Vec<model::Relation>,
    ) -> Self {
        let mut doc = Self {
            nodes,
            ways,
            relations,
        };
        doc.finish();
        doc
    }

    fn from_features<F>(features: F) -> Result<Self, Error>
    where
        F: FeatureReader,
        Error: From<F::Error>,
    {
        let mut doc = Self::default();
        for f in features {
            match f? {
                model::Feature::Node(n) => doc.nodes.push(n),
                model::Feature::Way(w) => doc.ways.push(w),
                model::Feature::Relation(r) => doc.relations.push(r),
            }
        }
        doc.finish();
        Ok(doc)
    }

    /// Sorts all feature stores by id, keeping the first occurrence
    /// among duplicates.
    fn finish(&mut self) {
        let before = self.nodes.len() + self.ways.len() + self.relations.len();

        self.nodes.sort_by_key(|n| n.id);
        self.nodes.dedup_by_key(|n| n.id);
        self.ways.sort_by_key(|w| w.id);
        self.ways.dedup_by_key(|w| w.id);
        self.relations.sort_by_key(|r| r.id);
        self.relations.dedup_by_key(|r| r.id);

        let dropped = before - self.nodes.len() - self.ways.len() - self.relations.len();
        if dropped > 0 {
            log::warn!(target: "platdist.osm", "{} features with duplicate ids - keeping first occurrences", dropped);
        }
    }

    /// All nodes, sorted by id.
    pub fn nodes(&self) -> &[model::Node] {
        &self.nodes
    }

    /// All ways, sorted by id.
    pub fn ways(&self) -> &[model::Way] {
        &self.ways
    }

    /// All relations, sorted by id.
    pub fn relations(&self) -> &[model::Relation] {
        &self.relations
    }

    /// Looks up a [Node] by its id using binary search.
    pub fn node_by_id(&self, id: i64) -> Option<&model::Node> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|i| &self.nodes[i])
    }

    /// Looks up a [Way] by its id using binary search.
    pub fn way_by_id(&self, id: i64) -> Option<&model::Way> {
        self.ways
            .binary_search_by_key(&id, |w| w.id)
            .ok()
            .map(|i| &self.ways[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_XML: &[u8] = include_bytes!("test_fixtures/simple.osm");

    #[test]
    fn test_file_format_detect() {
        assert_eq!(FileFormat::detect(b""), FileFormat::Unknown);
        assert_eq!(FileFormat::detect(b"lorem ipsum dolo"), FileFormat::Unknown);
        assert_eq!(FileFormat::detect(b"<?xml version='1"), FileFormat::Xml);
        assert_eq!(FileFormat::detect(b"<osm version='0."), FileFormat::Xml);
        assert_eq!(
            FileFormat::detect(b"\x1F\x8B\x08\x08\x84s\xCE^"),
            FileFormat::XmlGz,
        );
        assert_eq!(
            FileFormat::detect(b"BZh91AY&SY\x12\x10&X\x00\x04"),
            FileFormat::XmlBz2,
        );
    }

    #[test]
    fn read_sorted_document() -> Result<(), Error> {
        let doc = Document::read_from_buffer(SIMPLE_XML)?;

        assert_eq!(doc.nodes().len(), 5);
        assert_eq!(doc.ways().len(), 3);
        assert_eq!(doc.relations().len(), 1);

        assert!(doc.nodes().windows(2).all(|p| p[0].id < p[1].id));
        assert!(doc.ways().windows(2).all(|p| p[0].id < p[1].id));

        assert_eq!(doc.node_by_id(4).map(|n| (n.lat, n.lon)), Some((1.0, 1.0)));
        assert_eq!(doc.node_by_id(99), None);
        assert_eq!(doc.way_by_id(11).map(|w| w.nodes.len()), Some(3));
        Ok(())
    }

    #[test]
    fn read_compressed_documents() -> Result<(), Error> {
        let plain = Document::read_from_buffer(SIMPLE_XML)?;

        let gz = Document::read_from_buffer(include_bytes!("test_fixtures/simple.osm.gz"))?;
        assert_eq!(gz, plain);

        let bz2 = Document::read_from_buffer(include_bytes!("test_fixtures/simple.osm.bz2"))?;
        assert_eq!(bz2, plain);
        Ok(())
    }

    #[test]
    fn unknown_format_is_an_error() {
        let result = Document::read_from_buffer(b"lorem ipsum dolor sit amet");
        assert!(matches!(result, Err(Error::UnknownFileFormat)));
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let nodes = vec![
            model::Node {
                id: 1,
                lat: 5.0,
                lon: 5.0,
            },
            model::Node {
                id: 1,
                lat: 9.0,
                lon: 9.0,
            },
        ];
        let doc = Document::from_parts(nodes, vec![], vec![]);

        assert_eq!(doc.nodes().len(), 1);
        assert_eq!(doc.node_by_id(1).map(|n| n.lat), Some(5.0));
    }
}
