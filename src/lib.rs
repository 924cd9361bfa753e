// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod distance;
mod graph;
mod route;

pub mod geometry;
pub mod osm;
pub mod platform;

pub use distance::{planar_distance, METERS_PER_DEGREE};
pub use graph::{RoutingData, RoutingEdge, RoutingNode};
pub use route::{Anchor, Route, RouteTree, UNREACHABLE};

/// A position on Earth, in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}
