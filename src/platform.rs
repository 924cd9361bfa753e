// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::geometry;
use crate::osm::{has_kv, model, Document, FeatureType};
use crate::Coord;

/// A public-transport platform found in an OSM document,
/// reduced to its bounding-box center and a display label.
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub type_: FeatureType,
    pub id: i64,
    pub label: String,
    pub center: Coord,
}

/// Checks whether the tags mark a public-transport platform.
///
/// Matches `railway=platform`, and `public_transport=platform` unless
/// the platform only serves buses (`bus=yes`).
pub fn is_platform(tags: &model::Tags) -> bool {
    has_kv(tags, "railway", "platform")
        || (has_kv(tags, "public_transport", "platform") && !has_kv(tags, "bus", "yes"))
}

/// Picks the display label for a platform: `local_ref` wins over `ref`,
/// which wins over `name`. Platforms carrying none of these are
/// labelled `-`.
pub fn platform_label(tags: &model::Tags) -> String {
    tags.get("local_ref")
        .or_else(|| tags.get("ref"))
        .or_else(|| tags.get("name"))
        .cloned()
        .unwrap_or_else(|| "-".to_string())
}

/// Collects every platform in the document: ways first, then relations,
/// each in id order. Platforms without a single resolvable position
/// are skipped.
pub fn find_platforms(doc: &Document) -> Vec<Platform> {
    let mut platforms: Vec<Platform> = Vec::default();

    for way in doc.ways() {
        if !is_platform(&way.tags) {
            continue;
        }
        match geometry::way_bbox_center(way, doc) {
            Some(center) => platforms.push(Platform {
                type_: FeatureType::Way,
                id: way.id,
                label: platform_label(&way.tags),
                center,
            }),
            None => {
                log::warn!(target: "platdist", "platform way {} has no resolvable nodes - skipping", way.id)
            }
        }
    }

    for relation in doc.relations() {
        if !is_platform(&relation.tags) {
            continue;
        }
        match geometry::relation_bbox_center(relation, doc) {
            Some(center) => platforms.push(Platform {
                type_: FeatureType::Relation,
                id: relation.id,
                label: platform_label(&relation.tags),
                center,
            }),
            None => {
                log::warn!(target: "platdist", "platform relation {} has no resolvable members - skipping", relation.id)
            }
        }
    }

    platforms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osm::model::{Node, Relation, RelationMember, Tags, Way};

    macro_rules! tags {
        {} => { Tags::default() };
        {$( $k:literal : $v:literal ),+} => {
            Tags::from_iter([ $( ($k.to_string(), $v.to_string()) ),+ ])
        };
    }

    #[test]
    fn test_is_platform() {
        assert!(is_platform(&tags! {"railway": "platform"}));
        assert!(is_platform(&tags! {"public_transport": "platform"}));
        assert!(is_platform(
            &tags! {"public_transport": "platform", "tram": "yes"}
        ));

        // Pure bus platforms are excluded...
        assert!(!is_platform(
            &tags! {"public_transport": "platform", "bus": "yes"}
        ));
        // ...unless also tagged railway=platform.
        assert!(is_platform(
            &tags! {"railway": "platform", "bus": "yes"}
        ));

        assert!(!is_platform(&tags! {"railway": "rail"}));
        assert!(!is_platform(&tags! {}));
    }

    #[test]
    fn test_platform_label() {
        assert_eq!(platform_label(&tags! {}), "-");
        assert_eq!(platform_label(&tags! {"name": "Central"}), "Central");
        assert_eq!(
            platform_label(&tags! {"name": "Central", "ref": "4"}),
            "4",
        );
        assert_eq!(
            platform_label(&tags! {"name": "Central", "ref": "4", "local_ref": "4a"}),
            "4a",
        );
    }

    fn node(id: i64, lat: f64, lon: f64) -> Node {
        Node { id, lat, lon }
    }

    fn way(id: i64, nodes: Vec<i64>, tags: Tags) -> Way {
        Way { id, nodes, tags }
    }

    #[test]
    fn finds_non_bus_platforms() {
        let doc = Document::from_parts(
            vec![
                node(1, 0.0, 0.0),
                node(2, 0.0, 1.0),
                node(3, 1.0, 0.0),
                node(4, 1.0, 1.0),
            ],
            vec![
                way(10, vec![1, 2], tags! {"railway": "platform", "local_ref": "1"}),
                way(11, vec![2, 4], tags! {"railway": "platform", "local_ref": "2"}),
                way(12, vec![3, 4], tags! {"railway": "platform", "local_ref": "3"}),
                way(
                    13,
                    vec![1, 3],
                    tags! {"public_transport": "platform", "bus": "yes"},
                ),
                way(14, vec![1, 4], tags! {"highway": "residential"}),
            ],
            vec![],
        );

        let platforms = find_platforms(&doc);
        assert_eq!(
            platforms
                .iter()
                .map(|p| (p.id, p.label.as_str()))
                .collect::<Vec<_>>(),
            vec![(10, "1"), (11, "2"), (12, "3")],
        );
        assert_eq!(
            platforms[0].center,
            Coord { lat: 0.0, lon: 0.5 },
        );
    }

    #[test]
    fn finds_relation_platforms_after_ways() {
        let doc = Document::from_parts(
            vec![node(1, 0.0, 0.0), node(2, 0.0, 1.0)],
            vec![way(10, vec![1, 2], tags! {"railway": "platform"})],
            vec![Relation {
                id: 20,
                members: vec![RelationMember {
                    type_: FeatureType::Way,
                    ref_: 10,
                    role: "outer".to_string(),
                }],
                tags: tags! {"public_transport": "platform", "name": "North"},
            }],
        );

        let platforms = find_platforms(&doc);
        assert_eq!(platforms.len(), 2);
        assert_eq!(platforms[0].type_, FeatureType::Way);
        assert_eq!(platforms[1].type_, FeatureType::Relation);
        assert_eq!(platforms[1].label, "North");
    }

    #[test]
    fn skips_platforms_without_positions() {
        let doc = Document::from_parts(
            vec![],
            vec![way(10, vec![1, 2], tags! {"railway": "platform"})],
            vec![],
        );
        assert!(find_platforms(&doc).is_empty());
    }
}
