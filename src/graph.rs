// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::osm::{Document, Way};
use crate::{planar_distance, Coord, METERS_PER_DEGREE};

/// A graph vertex, corresponding to an OSM node which is either a way
/// endpoint or shared between multiple way positions.
///
/// `edges` holds the slots (indices into [RoutingData::edges]) of all
/// incident [RoutingEdges](RoutingEdge), in no particular order.
/// A self-loop appears twice.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingNode {
    pub id: i64,
    pub edges: Vec<usize>,
}

/// An undirected stretch of a single OSM way between two consecutive
/// [RoutingNodes](RoutingNode) of that way.
///
/// `trace` holds the positions of the stretch's OSM nodes in way order;
/// node ids which do not resolve in the source [Document] are omitted.
/// `valuation` is the sum of [planar distances](planar_distance) between
/// consecutive trace points, in degree units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingEdge {
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub trace: Vec<Coord>,
    pub valuation: f64,
}

/// Per-way index from sub-segment starts to edge slots.
///
/// `segments` lists `(segment_start, edge_slot)` pairs, sorted ascending
/// by `segment_start` - the position within the way's nd list where the
/// edge begins.
#[derive(Debug, Clone, PartialEq)]
struct WayEntry {
    way_id: i64,
    segments: Vec<(usize, usize)>,
}

/// The routing graph derived from an OSM [Document]: ways collapsed into
/// [edges](RoutingEdge) between junction [nodes](RoutingNode).
///
/// The graph is immutable once built. Nodes are sorted by OSM id and the
/// way dictionary by way id, so both support binary lookup. All
/// cross-references are flat-array indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingData {
    nodes: Vec<RoutingNode>,
    edges: Vec<RoutingEdge>,
    way_dictionary: Vec<WayEntry>,
}

impl RoutingData {
    /// Builds the routing graph from a [Document].
    ///
    /// An OSM node becomes a graph vertex iff its usage count is at least 2,
    /// where every way contributes 2 uses to its first and last nd and 1 use
    /// to each interior nd. Each way is then split into edges at its
    /// promoted interior nds.
    pub fn new(doc: &Document) -> Self {
        // Endpoints count double, so that even a way's dead-end node
        // becomes a graph vertex.
        let mut node_count: BTreeMap<i64, u32> = BTreeMap::new();
        for way in doc.ways() {
            let (Some(&first), Some(&last)) = (way.nodes.first(), way.nodes.last()) else {
                continue;
            };
            *node_count.entry(first).or_default() += 2;
            if way.nodes.len() > 2 {
                for &nd in &way.nodes[1..way.nodes.len() - 1] {
                    *node_count.entry(nd).or_default() += 1;
                }
            }
            *node_count.entry(last).or_default() += 2;
        }

        // BTreeMap iteration is id-ascending, keeping the node store sorted.
        let nodes: Vec<RoutingNode> = node_count
            .iter()
            .filter(|&(_, &count)| count >= 2)
            .map(|(&id, _)| RoutingNode {
                id,
                edges: Vec::default(),
            })
            .collect();

        let mut edges: Vec<RoutingEdge> = Vec::default();
        let mut way_dictionary: Vec<WayEntry> = Vec::default();

        for way in doc.ways() {
            let mut segments: Vec<(usize, usize)> = Vec::default();
            let mut segment_start = 0;

            for i in 1..way.nodes.len() {
                if node_count.get(&way.nodes[i]).is_some_and(|&c| c >= 2) {
                    segments.push((segment_start, edges.len()));
                    edges.push(edge_from_way(&nodes, doc, way, segment_start, i));
                    segment_start = i;
                }
            }
            if way.nodes.len() >= 2 && segment_start < way.nodes.len() - 1 {
                segments.push((segment_start, edges.len()));
                edges.push(edge_from_way(
                    &nodes,
                    doc,
                    way,
                    segment_start,
                    way.nodes.len() - 1,
                ));
            }

            way_dictionary.push(WayEntry {
                way_id: way.id,
                segments,
            });
        }

        let mut data = Self {
            nodes,
            edges,
            way_dictionary,
        };
        data.register_incident_edges();
        data
    }

    /// Records every edge slot in the incident lists of both its endpoints.
    fn register_incident_edges(&mut self) {
        for slot in 0..self.edges.len() {
            let (start, end) = (self.edges[slot].start, self.edges[slot].end);
            if let Some(n) = start {
                self.nodes[n].edges.push(slot);
            }
            if let Some(n) = end {
                self.nodes[n].edges.push(slot);
            }
        }
    }

    /// Maps a position within an OSM way onto the routing graph.
    ///
    /// `index` is the 0-based position within the way's original nd list.
    /// Returns the slot of the [RoutingEdge] containing that position and
    /// the index relative to the edge's own trace, or [None] for unknown
    /// ways and ways which produced no edges.
    pub fn resolve_way_pos(&self, way_id: i64, index: usize) -> Option<(usize, usize)> {
        let entry = self
            .way_dictionary
            .binary_search_by_key(&way_id, |e| e.way_id)
            .ok()
            .map(|i| &self.way_dictionary[i])?;

        // Select the last segment starting at or before the index.
        let pos = entry.segments.partition_point(|&(start, _)| start <= index);
        let &(segment_start, edge_slot) = entry.segments.get(pos.checked_sub(1)?)?;
        Some((edge_slot, index - segment_start))
    }

    /// All graph vertices, sorted by OSM node id.
    pub fn nodes(&self) -> &[RoutingNode] {
        &self.nodes
    }

    /// All edges, in way order.
    pub fn edges(&self) -> &[RoutingEdge] {
        &self.edges
    }

    /// Returns the node count, the edge count and the total valuation
    /// of all edges in degree units.
    pub fn statistics(&self) -> (usize, usize, f64) {
        let total_valuation = self.edges.iter().map(|e| e.valuation).sum();
        (self.nodes.len(), self.edges.len(), total_valuation)
    }

    /// The summary emitted by [print_statistics](Self::print_statistics):
    /// node count, edge count and total valuation in meters,
    /// separated by single spaces.
    pub fn statistics_line(&self) -> String {
        let (nodes, edges, total_valuation) = self.statistics();
        format!("{} {} {}", nodes, edges, total_valuation * METERS_PER_DEGREE)
    }

    /// Prints the graph summary line to standard output.
    pub fn print_statistics(&self) {
        println!("{}", self.statistics_line());
    }
}

fn node_index(nodes: &[RoutingNode], id: i64) -> Option<usize> {
    nodes.binary_search_by_key(&id, |n| n.id).ok()
}

/// Creates the [RoutingEdge] for `way.nodes[start..=end]`.
///
/// Node ids which do not resolve in the [Document] contribute neither a
/// trace point nor any valuation, but still take up a position within
/// the edge.
fn edge_from_way(
    nodes: &[RoutingNode],
    doc: &Document,
    way: &Way,
    start: usize,
    end: usize,
) -> RoutingEdge {
    let mut edge = RoutingEdge {
        start: node_index(nodes, way.nodes[start]),
        end: node_index(nodes, way.nodes[end]),
        ..RoutingEdge::default()
    };

    let mut last_coord: Option<Coord> = None;
    for &nd in &way.nodes[start..=end] {
        if let Some(node) = doc.node_by_id(nd) {
            let coord = node.coord();
            edge.trace.push(coord);
            if let Some(last) = last_coord {
                edge.valuation += planar_distance(last, coord);
            }
            last_coord = Some(coord);
        }
    }

    edge
}
