// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod anchor;
mod tree;

pub use anchor::Anchor;
pub use tree::{Route, RouteTree, UNREACHABLE};
