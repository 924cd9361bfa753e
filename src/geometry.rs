// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::osm::{model, Document};
use crate::Coord;

/// A position within an OSM way: `index` is the 0-based position of the
/// containing segment's first nd within the way's nd list, and `pos` the
/// planar distance from that segment's start to the position, in degree
/// units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WayReference {
    pub way: i64,
    pub index: usize,
    pub pos: f64,
}

impl WayReference {
    /// Anchors a free position onto the closest way segment in the
    /// document. Node ids which do not resolve are skipped, but still
    /// advance the segment index.
    ///
    /// Returns [None] when the document contains no usable segment.
    pub fn locate(point: Coord, doc: &Document) -> Option<Self> {
        let mut best: Option<Self> = None;
        let mut best_distance = f64::INFINITY;

        for way in doc.ways() {
            for index in 0..way.nodes.len().saturating_sub(1) {
                let (Some(a), Some(b)) = (
                    doc.node_by_id(way.nodes[index]),
                    doc.node_by_id(way.nodes[index + 1]),
                ) else {
                    continue;
                };

                let (distance, pos) = project_onto_segment(point, a.coord(), b.coord());
                if distance < best_distance {
                    best_distance = distance;
                    best = Some(Self {
                        way: way.id,
                        index,
                        pos,
                    });
                }
            }
        }

        best
    }
}

/// Projects `point` onto the segment `a`-`b` in the scaled planar frame
/// (longitudes stretched by the inverse cosine of the segment's mean
/// latitude, matching [planar_distance](crate::planar_distance)).
///
/// Returns the distance from the point to its projection and the distance
/// from `a` to the projection along the segment, both in degree units.
/// The projection is clamped to the segment.
fn project_onto_segment(point: Coord, a: Coord, b: Coord) -> (f64, f64) {
    let lon_scale = 1.0 / ((a.lat + b.lat) * 0.5).to_radians().cos();

    let (ax, ay) = (a.lat, a.lon * lon_scale);
    let (bx, by) = (b.lat, b.lon * lon_scale);
    let (px, py) = (point.lat, point.lon * lon_scale);

    let (dx, dy) = (bx - ax, by - ay);
    let length_squared = dx * dx + dy * dy;
    let t = if length_squared == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / length_squared).clamp(0.0, 1.0)
    };

    let (cx, cy) = (ax + t * dx, ay + t * dy);
    let distance = ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt();
    (distance, t * length_squared.sqrt())
}

/// The center of the bounding box of the given positions,
/// or [None] when there are none.
pub fn bbox_center<I: IntoIterator<Item = Coord>>(coords: I) -> Option<Coord> {
    let mut bounds: Option<(f64, f64, f64, f64)> = None;

    for c in coords {
        bounds = Some(match bounds {
            None => (c.lat, c.lon, c.lat, c.lon),
            Some((min_lat, min_lon, max_lat, max_lon)) => (
                min_lat.min(c.lat),
                min_lon.min(c.lon),
                max_lat.max(c.lat),
                max_lon.max(c.lon),
            ),
        });
    }

    bounds.map(|(min_lat, min_lon, max_lat, max_lon)| Coord {
        lat: (min_lat + max_lat) * 0.5,
        lon: (min_lon + max_lon) * 0.5,
    })
}

/// Bounding-box center of a way's resolvable nodes.
pub fn way_bbox_center(way: &model::Way, doc: &Document) -> Option<Coord> {
    bbox_center(
        way.nodes
            .iter()
            .filter_map(|&nd| doc.node_by_id(nd))
            .map(|n| n.coord()),
    )
}

/// Bounding-box center of a relation's direct node members plus the nodes
/// of its member ways. Nested relation members are not expanded.
pub fn relation_bbox_center(relation: &model::Relation, doc: &Document) -> Option<Coord> {
    let mut coords: Vec<Coord> = Vec::default();

    for member in &relation.members {
        match member.type_ {
            model::FeatureType::Node => {
                if let Some(n) = doc.node_by_id(member.ref_) {
                    coords.push(n.coord());
                }
            }
            model::FeatureType::Way => {
                if let Some(way) = doc.way_by_id(member.ref_) {
                    coords.extend(
                        way.nodes
                            .iter()
                            .filter_map(|&nd| doc.node_by_id(nd))
                            .map(|n| n.coord()),
                    );
                }
            }
            model::FeatureType::Relation => {}
        }
    }

    bbox_center(coords)
}
