// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::geometry::WayReference;
use crate::{planar_distance, RoutingData};

/// A labelled point on the routing graph: a [RoutingEdge](crate::RoutingEdge)
/// slot, a segment index within that edge's trace, and a distance offset
/// along that segment.
///
/// `edge` is [None] when the referenced way is unknown to the graph;
/// routing operations treat such anchors as no-ops.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub label: String,
    pub edge: Option<usize>,
    pub index: usize,
    pub pos: f64,
}

impl Anchor {
    /// Anchors a [WayReference] onto the routing graph.
    pub fn new(routing: &RoutingData, way_ref: &WayReference, label: String) -> Self {
        let (edge, index) = match routing.resolve_way_pos(way_ref.way, way_ref.index) {
            Some((edge, index)) => (Some(edge), index),
            None => (None, 0),
        };

        Self {
            label,
            edge,
            index,
            pos: way_ref.pos,
        }
    }

    /// Creates an anchor which is not attached to any edge.
    pub fn unresolved(label: String) -> Self {
        Self {
            label,
            edge: None,
            index: 0,
            pos: 0.0,
        }
    }

    /// The distance from the edge's start to this anchor, measured along
    /// the edge's trace and rescaled to the edge's total valuation.
    /// Falls within `[0, edge.valuation]`; unresolved anchors yield 0,
    /// and anchors on zero-length edges yield the edge's valuation.
    ///
    /// `pos` is a raw distance offset, but the trace's segment sum may
    /// drift from `valuation` when trace points were dropped - hence the
    /// proportional rescale against the trace total.
    pub fn proportionate_valuation(&self, routing: &RoutingData) -> f64 {
        let Some(edge) = self.edge.and_then(|slot| routing.edges().get(slot)) else {
            return 0.0;
        };

        let mut total_length = 0.0;
        let mut partial_length = 0.0;

        for i in 1..edge.trace.len() {
            if i == self.index + 1 {
                partial_length = total_length + self.pos;
            }
            total_length += planar_distance(edge.trace[i - 1], edge.trace[i]);
        }

        if total_length == 0.0 {
            edge.valuation
        } else {
            edge.valuation * partial_length / total_length
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osm::{model, Document};

    fn doc() -> Document {
        Document::from_parts(
            vec![
                model::Node {
                    id: 1,
                    lat: 0.0,
                    lon: 0.0,
                },
                model::Node {
                    id: 2,
                    lat: 0.0,
                    lon: 1.0,
                },
                model::Node {
                    id: 3,
                    lat: 0.0,
                    lon: 3.0,
                },
            ],
            vec![model::Way {
                id: 100,
                nodes: vec![1, 2, 3],
                tags: model::Tags::default(),
            }],
            vec![],
        )
    }

    fn anchor_at(index: usize, pos: f64) -> Anchor {
        Anchor {
            label: "-".to_string(),
            edge: Some(0),
            index,
            pos,
        }
    }

    #[test]
    fn resolves_through_the_way_dictionary() {
        let routing = RoutingData::new(&doc());
        let way_ref = WayReference {
            way: 100,
            index: 1,
            pos: 0.25,
        };

        let anchor = Anchor::new(&routing, &way_ref, "A".to_string());
        assert_eq!(anchor.edge, Some(0));
        assert_eq!(anchor.index, 1);
        assert_eq!(anchor.pos, 0.25);
    }

    #[test]
    fn unknown_way_stays_unresolved() {
        let routing = RoutingData::new(&doc());
        let way_ref = WayReference {
            way: 555,
            index: 1,
            pos: 0.25,
        };

        let anchor = Anchor::new(&routing, &way_ref, "A".to_string());
        assert_eq!(anchor.edge, None);
        assert_eq!(anchor.index, 0);
        assert_eq!(anchor.proportionate_valuation(&routing), 0.0);
    }

    #[test]
    fn measures_along_the_trace() {
        let routing = RoutingData::new(&doc());

        // Within the first segment: only the in-segment offset counts.
        assert_eq!(anchor_at(0, 0.0).proportionate_valuation(&routing), 0.0);
        assert_eq!(anchor_at(0, 0.5).proportionate_valuation(&routing), 0.5);

        // Within the second segment: the first segment's full length is added.
        assert_eq!(anchor_at(1, 0.0).proportionate_valuation(&routing), 1.0);
        assert_eq!(anchor_at(1, 1.5).proportionate_valuation(&routing), 2.5);
    }

    #[test]
    fn bounded_by_the_edge_valuation() {
        let routing = RoutingData::new(&doc());
        let valuation = routing.edges()[0].valuation;

        for (index, pos) in [(0, 0.0), (0, 1.0), (1, 0.0), (1, 2.0)] {
            let v = anchor_at(index, pos).proportionate_valuation(&routing);
            assert!(v >= 0.0 && v <= valuation, "out of bounds: {}", v);
        }
    }

    #[test]
    fn zero_length_edge_yields_its_valuation() {
        // Both nodes at the same position - the trace total is zero.
        let doc = Document::from_parts(
            vec![
                model::Node {
                    id: 1,
                    lat: 0.5,
                    lon: 0.5,
                },
                model::Node {
                    id: 2,
                    lat: 0.5,
                    lon: 0.5,
                },
            ],
            vec![model::Way {
                id: 100,
                nodes: vec![1, 2],
                tags: model::Tags::default(),
            }],
            vec![],
        );
        let routing = RoutingData::new(&doc);

        let v = anchor_at(0, 0.0).proportionate_valuation(&routing);
        assert_eq!(v, routing.edges()[0].valuation);
    }
}
