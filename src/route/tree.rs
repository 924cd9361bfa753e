// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use super::Anchor;
use crate::RoutingData;

/// Sentinel distance marking a route which has not been found (yet),
/// in degree units. Larger than any distance the planar approximation
/// can produce between two points of the graph.
pub const UNREACHABLE: f64 = 180.0;

/// A single origin-destination result.
///
/// `value` is the travelled distance in degree units, or [UNREACHABLE]
/// when the destination cannot be reached through the graph. `edges`
/// lists the traversed edge slots from the origin's edge to the
/// destination's edge; it is empty for same-edge short-circuits and
/// unreachable destinations.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub start: Anchor,
    pub end: Anchor,
    pub edges: Vec<usize>,
    pub value: f64,
}

/// Shortest distances from one origin [Anchor] to every destination
/// [Anchor], in destination order.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTree {
    pub routes: Vec<Route>,
}

/// Frontier entry: a node reachable via `arrived_from` at distance `value`
/// from the origin. The distance is not necessarily final - stale entries
/// are discarded when popped.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    node: usize,
    arrived_from: usize,
    value: f64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.value.eq(&other.value)
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower values are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other
            .value
            .partial_cmp(&self.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

/// A finalised node: its shortest distance from the origin and the edge
/// it was reached through.
#[derive(Debug, Clone, Copy)]
struct ClosedNode {
    arrived_from: usize,
    value: f64,
}

impl RouteTree {
    /// Runs a single-source shortest-path search from `origin` and
    /// collects one [Route] per destination, in destination order.
    ///
    /// Destinations sharing the origin's edge and within-edge segment are
    /// measured directly along that segment. Every other destination lies
    /// in the interior of some edge and is evaluated once both endpoints
    /// of that edge have been finalised, as the shorter approach may come
    /// from either side.
    ///
    /// An unresolved origin produces a degenerate tree with every route
    /// at [UNREACHABLE]; unresolved destinations keep the sentinel too.
    pub fn new(routing: &RoutingData, origin: &Anchor, destinations: &[Anchor]) -> Self {
        let mut routes: Vec<Route> = destinations
            .iter()
            .map(|destination| {
                let value = if destination.edge.is_some()
                    && destination.edge == origin.edge
                    && destination.index == origin.index
                {
                    (destination.pos - origin.pos).abs()
                } else {
                    UNREACHABLE
                };

                Route {
                    start: origin.clone(),
                    end: destination.clone(),
                    edges: Vec::default(),
                    value,
                }
            })
            .collect();

        let Some(origin_slot) = origin.edge else {
            return Self { routes };
        };

        let mut open_nodes: BinaryHeap<OpenNode> = BinaryHeap::default();
        let mut final_tree: HashMap<usize, ClosedNode> = HashMap::default();

        // Reach the graph via the two ends of the origin's edge.
        let origin_valuation = origin.proportionate_valuation(routing);
        let origin_edge = &routing.edges()[origin_slot];
        if let Some(node) = origin_edge.start {
            open_nodes.push(OpenNode {
                node,
                arrived_from: origin_slot,
                value: origin_valuation,
            });
        }
        if let Some(node) = origin_edge.end {
            open_nodes.push(OpenNode {
                node,
                arrived_from: origin_slot,
                value: origin_edge.valuation - origin_valuation,
            });
        }

        while let Some(current) = open_nodes.pop() {
            if final_tree.contains_key(&current.node) {
                continue;
            }
            final_tree.insert(
                current.node,
                ClosedNode {
                    arrived_from: current.arrived_from,
                    value: current.value,
                },
            );

            for &slot in &routing.nodes()[current.node].edges {
                let edge = &routing.edges()[slot];

                if edge.start == Some(current.node) {
                    if let Some(other) = edge.end {
                        match final_tree.get(&other) {
                            None => open_nodes.push(OpenNode {
                                node: other,
                                arrived_from: slot,
                                value: current.value + edge.valuation,
                            }),
                            // Both endpoints finalised - resolve anchors
                            // inside this edge.
                            Some(closed) => eval_edge_for_destinations(
                                routing,
                                slot,
                                destinations,
                                current.value,
                                closed.value,
                                &final_tree,
                                origin_slot,
                                &mut routes,
                            ),
                        }
                    }
                }
                if edge.end == Some(current.node) {
                    if let Some(other) = edge.start {
                        match final_tree.get(&other) {
                            None => open_nodes.push(OpenNode {
                                node: other,
                                arrived_from: slot,
                                value: current.value + edge.valuation,
                            }),
                            Some(closed) => eval_edge_for_destinations(
                                routing,
                                slot,
                                destinations,
                                closed.value,
                                current.value,
                                &final_tree,
                                origin_slot,
                                &mut routes,
                            ),
                        }
                    }
                }
            }
        }

        Self { routes }
    }
}

/// Resolves destinations anchored inside a closing edge - an edge both of
/// whose endpoints have been finalised. `start_value` and `end_value` are
/// the finalised distances of the edge's start and end nodes.
///
/// Only destinations whose route still holds the sentinel are touched,
/// so repeated calls for the same edge are no-ops.
fn eval_edge_for_destinations(
    routing: &RoutingData,
    slot: usize,
    destinations: &[Anchor],
    start_value: f64,
    end_value: f64,
    final_tree: &HashMap<usize, ClosedNode>,
    origin_slot: usize,
    routes: &mut [Route],
) {
    let edge = &routing.edges()[slot];

    for (destination, route) in destinations.iter().zip(routes.iter_mut()) {
        if destination.edge != Some(slot) || route.value != UNREACHABLE {
            continue;
        }

        let proportionate_valuation = destination.proportionate_valuation(routing);
        let via_start = start_value + proportionate_valuation;
        let via_end = end_value + edge.valuation - proportionate_valuation;

        let (value, entry) = if via_start < via_end {
            (via_start, edge.start)
        } else {
            (via_end, edge.end)
        };

        let mut edges = collect_path(routing, final_tree, origin_slot, entry);
        if edges.last() != Some(&slot) {
            edges.push(slot);
        }

        route.value = value;
        route.edges = edges;
    }
}

/// Reconstructs the edge sequence from the origin's edge to `entry` by
/// walking `arrived_from` references back through the finalised tree.
/// Returned in travel order, origin's edge first.
fn collect_path(
    routing: &RoutingData,
    final_tree: &HashMap<usize, ClosedNode>,
    origin_slot: usize,
    entry: Option<usize>,
) -> Vec<usize> {
    let mut path = Vec::default();
    let mut at = entry;

    while let Some(node) = at {
        let Some(closed) = final_tree.get(&node) else {
            break;
        };

        path.push(closed.arrived_from);
        if closed.arrived_from == origin_slot {
            break;
        }

        // Step to the node this one was entered from.
        let edge = &routing.edges()[closed.arrived_from];
        at = if edge.start == Some(node) {
            edge.end
        } else {
            edge.start
        };
    }

    path.reverse();
    path
}
