// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Coord;
use std::collections::HashMap;

/// Key-value tags attached to an OSM feature.
pub type Tags = HashMap<String, String>;

/// Checks whether a tag collection has the given key set to the given value.
pub fn has_kv(tags: &Tags, key: &str, value: &str) -> bool {
    tags.get(key).is_some_and(|v| v == value)
}

/// Represents an [OSM node](https://wiki.openstreetmap.org/wiki/Node) -
/// a single named position on Earth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    /// The position of this node.
    pub fn coord(&self) -> Coord {
        Coord {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// Represents an [OSM way](https://wiki.openstreetmap.org/wiki/Way) -
/// an ordered sequence of node references forming a polyline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Way {
    pub id: i64,
    pub nodes: Vec<i64>,
    pub tags: Tags,
}

/// Type of an [OSM feature/element](https://wiki.openstreetmap.org/wiki/Elements).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureType {
    Node,
    Way,
    Relation,
}

impl std::fmt::Display for FeatureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Way => write!(f, "way"),
            Self::Relation => write!(f, "relation"),
        }
    }
}

/// Represents a member of an [OSM relation](https://wiki.openstreetmap.org/wiki/Relation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationMember {
    pub type_: FeatureType,
    pub ref_: i64,
    pub role: String,
}

/// Represents an [OSM relation](https://wiki.openstreetmap.org/wiki/Relation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub id: i64,
    pub members: Vec<RelationMember>,
    pub tags: Tags,
}

/// Union over all possible [OSM features/elements](https://wiki.openstreetmap.org/wiki/Elements).
#[derive(Debug, Clone)]
pub enum Feature {
    Node(Node),
    Way(Way),
    Relation(Relation),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_kv() {
        let tags = Tags::from_iter([
            ("railway".to_string(), "platform".to_string()),
            ("ref".to_string(), "2".to_string()),
        ]);

        assert!(has_kv(&tags, "railway", "platform"));
        assert!(!has_kv(&tags, "railway", "rail"));
        assert!(!has_kv(&tags, "public_transport", "platform"));
    }
}
