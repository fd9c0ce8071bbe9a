use serde::{Deserialize, Serialize};
use std::path;

use log::info;

use super::catalog::{self, CatalogError, ParkingSpot};
use super::cli_utils;

/// Where the spots come from.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource<'a> {
    Builtin,
    Csv(&'a path::Path),
    GeoJson(&'a path::Path),
    Snapshot(&'a path::Path),
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    spots: Vec<ParkingSpot>,
}

pub fn load_spots(source: &CatalogSource, seed: u64) -> Result<Vec<ParkingSpot>, CatalogError> {
    match source {
        CatalogSource::Builtin => catalog::builtin_spots(seed),
        CatalogSource::Csv(path) => catalog::load_csv(path, seed),
        CatalogSource::GeoJson(path) => catalog::load_geojson(path, seed),
        CatalogSource::Snapshot(path) => load_snapshot(path),
    }
}

pub fn load_snapshot(input_path: &path::Path) -> Result<Vec<ParkingSpot>, CatalogError> {
    let progress_bar = cli_utils::create_spinner(false, "Loading snapshot...");

    let file_reader = std::fs::File::open(input_path)?;
    let buf_reader = std::io::BufReader::new(file_reader);
    let result: Result<SnapshotFile, _> = bincode::deserialize_from(buf_reader);

    progress_bar.finish();

    let snapshot = result?;
    info!("Snapshot {} holds {} spots", input_path.display(), snapshot.spots.len());
    Ok(snapshot.spots)
}

pub fn save_snapshot(spots: &[ParkingSpot], output_file: &path::Path) -> Result<(), CatalogError> {
    let file_writer = std::fs::File::create(output_file)?;
    let buf_writer = std::io::BufWriter::new(file_writer);
    let snapshot = SnapshotFile {
        spots: spots.to_vec(),
    };
    bincode::serialize_into(buf_writer, &snapshot)?;
    Ok(())
}
