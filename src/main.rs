// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;

use clap::Parser;

use platdist::geometry::WayReference;
use platdist::osm::{Document, FileFormat};
use platdist::platform::find_platforms;
use platdist::{Anchor, RouteTree, RoutingData, METERS_PER_DEGREE};

/// Computes pairwise travelling distances between public-transport
/// platforms along the ways of an OSM document.
///
/// Prints a graph summary line, one progress line per platform found,
/// and then one `distance<TAB>origin<TAB>destination` line per ordered
/// platform pair, with the distance in meters.
#[derive(Parser)]
struct Cli {
    /// The OSM file (.osm/.osm.gz/.osm.bz2); standard input when absent or "-"
    osm_file: Option<PathBuf>,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let doc = read_document(cli.osm_file.as_deref())?;
    let routing = RoutingData::new(&doc);
    routing.print_statistics();

    let mut destinations: Vec<Anchor> = Vec::default();
    for platform in find_platforms(&doc) {
        println!("{} {}", platform.type_, platform.id);

        let anchor = match WayReference::locate(platform.center, &doc) {
            Some(way_ref) => Anchor::new(&routing, &way_ref, platform.label),
            None => Anchor::unresolved(platform.label),
        };
        destinations.push(anchor);
    }
    log::info!(target: "platdist", "{} platforms found", destinations.len());

    for origin in &destinations {
        let tree = RouteTree::new(&routing, origin, &destinations);
        for route in &tree.routes {
            println!(
                "{}\t{}\t{}",
                route.value * METERS_PER_DEGREE,
                route.start.label,
                route.end.label,
            );
        }
    }

    Ok(())
}

fn read_document(path: Option<&std::path::Path>) -> Result<Document, Box<dyn Error>> {
    match path {
        Some(p) if p.as_os_str() != "-" => {
            let f = File::open(p)?;
            let b = io::BufReader::new(f);
            Ok(Document::read_from_io(b, FileFormat::Unknown)?)
        }
        _ => Ok(Document::read_from_io(
            io::stdin().lock(),
            FileFormat::Unknown,
        )?),
    }
}
