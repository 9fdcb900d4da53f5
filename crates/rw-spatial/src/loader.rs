//! CSV adjacency loader.
//!
//! # CSV format
//!
//! One row per room; neighbors are separated by `;`.  A room with no exits
//! leaves the second column empty.
//!
//! ```csv
//! room,adjacent
//! village_square,village_tavern;village_well;forest_edge
//! village_tavern,village_square
//! forest_edge,village_square;forest_clearing
//! forest_clearing,
//! ```
//!
//! Rows are applied as a bulk registry replacement, so loading a file twice is
//! idempotent.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::graph::RoomGraph;
use crate::SpatialError;

#[derive(Deserialize)]
struct AdjacencyRecord {
    room:     String,
    #[serde(default)]
    adjacent: String,
}

/// Load a room registry from a CSV file into `graph`.
///
/// Returns the number of rows applied.
pub fn load_adjacency_csv(path: &Path, graph: &mut RoomGraph) -> Result<usize, SpatialError> {
    let file = std::fs::File::open(path).map_err(SpatialError::Io)?;
    load_adjacency_reader(file, graph)
}

/// Like [`load_adjacency_csv`] but accepts any `Read` source.
pub fn load_adjacency_reader<R: Read>(reader: R, graph: &mut RoomGraph) -> Result<usize, SpatialError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut entries: Vec<(String, Vec<String>)> = Vec::new();

    for result in csv_reader.deserialize::<AdjacencyRecord>() {
        let row = result.map_err(|e| SpatialError::Parse(e.to_string()))?;
        let room = row.room.trim();
        if room.is_empty() {
            return Err(SpatialError::Parse("row with empty room name".into()));
        }
        let adjacent = row
            .adjacent
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        entries.push((room.to_owned(), adjacent));
    }

    let rows = entries.len();
    graph.set_registry(entries);
    info!(rows, rooms = graph.room_count(), "loaded room adjacency");
    Ok(rows)
}
