use geojson::GeoJson;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use std::collections::HashMap;
use std::convert::TryInto;
use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::path;

use log::{debug, info};

use super::spot_types::{CatalogError, Coordinate, Fee, ParkingSpot, SpotStatus};

const BUILTIN_CSV: &str = include_str!("../../data/bengaluru_parking_spots.csv");

pub const DEFAULT_SEED: u64 = 2025;

/**
 * Assigns a status to spots whose source has none: 70% available,
 * 20% occupied, 10% booked. Seeded so that a load is reproducible.
 */
pub struct StatusSeeder {
    rng: StdRng,
}

impl StatusSeeder {
    pub fn new(seed: u64) -> StatusSeeder {
        StatusSeeder {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_status(&mut self) -> SpotStatus {
        let draw: f64 = self.rng.gen();
        if draw < 0.7 {
            SpotStatus::Available
        } else if draw < 0.9 {
            SpotStatus::Occupied
        } else {
            SpotStatus::Booked
        }
    }

    fn status_or_seed(&mut self, status: Option<&str>) -> Result<SpotStatus, CatalogError> {
        match status.map(str::trim) {
            Some(s) if !s.is_empty() => s.parse(),
            _ => Ok(self.next_status()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpotRow {
    #[serde(rename = "Place_Name", alias = "name")]
    name: String,
    #[serde(rename = "Latitude", alias = "lat")]
    latitude: f64,
    #[serde(rename = "Longitude", alias = "lng")]
    longitude: f64,
    #[serde(rename = "parking_type", alias = "type")]
    spot_type: String,
    fee: String,
    access: String,
    #[serde(default)]
    status: Option<String>,
}

/// Reads spots from CSV with a header line.
pub fn spots_from_csv<R: io::Read>(
    input: R,
    seeder: &mut StatusSeeder,
) -> Result<Vec<ParkingSpot>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut spots = Vec::new();
    for (line_number, record) in csv_reader.deserialize::<SpotRow>().enumerate() {
        let row = record?;
        let row_number = line_number + 1;
        let status = seeder.status_or_seed(row.status.as_ref().map(String::as_str))?;

        let spot = ParkingSpot::new(
            &row.name,
            Coordinate::new(row.latitude, row.longitude),
            &row.spot_type,
            Fee::from_tag(&row.fee),
            &row.access,
            status,
        )
        .map_err(|reason| CatalogError::InvalidSpot {
            row: row_number,
            reason,
        })?;

        spots.push(spot);
    }

    Ok(spots)
}

pub fn load_csv<P: AsRef<path::Path>>(csv_path: P, seed: u64) -> Result<Vec<ParkingSpot>, CatalogError> {
    info!("Loading spots from csv {:?} ...", csv_path.as_ref());
    let file = File::open(&csv_path)?;
    spots_from_csv(io::BufReader::new(file), &mut StatusSeeder::new(seed))
}

/// The Bengaluru dataset shipped with the binary.
pub fn builtin_spots(seed: u64) -> Result<Vec<ParkingSpot>, CatalogError> {
    info!("Loading built-in spots");
    spots_from_csv(BUILTIN_CSV.as_bytes(), &mut StatusSeeder::new(seed))
}

fn feature_properties(
    feature: &geojson::Feature,
) -> Result<HashMap<String, String>, CatalogError> {
    let mut properties = HashMap::new();

    if let Some(properties_json) = &feature.properties {
        for (k, v) in properties_json {
            match v {
                serde_json::Value::String(v_str) => {
                    properties.insert(k.clone(), v_str.clone());
                }
                serde_json::Value::Number(v_num) => {
                    properties.insert(k.clone(), v_num.to_string());
                }
                serde_json::Value::Bool(v_bool) => {
                    properties.insert(k.clone(), if *v_bool { "yes" } else { "no" }.to_owned());
                }
                serde_json::Value::Null => {}
                other => return Err(CatalogError::InvalidProperty(other.clone())),
            }
        }
    }

    Ok(properties)
}

fn spot_from_feature(
    row: usize,
    feature: geojson::Feature,
    seeder: &mut StatusSeeder,
) -> Result<ParkingSpot, CatalogError> {
    let properties = feature_properties(&feature)?;

    let lookup = |keys: &[&str], property: &'static str| -> Result<String, CatalogError> {
        keys.iter()
            .filter_map(|key| properties.get(*key))
            .next()
            .cloned()
            .ok_or(CatalogError::MissingProperty { row, property })
    };

    let name = lookup(&["name", "Place_Name"], "name")?;
    let spot_type = lookup(&["type", "parking_type"], "type")?;
    let fee = lookup(&["fee"], "fee")?;
    let access = lookup(&["access"], "access")?;

    let geometry = feature.geometry.ok_or(CatalogError::NotAPoint(row))?;
    let point: geo_types::Point<f64> = match geometry.value {
        geojson::Value::Point(_) => geometry.value.try_into().map_err(CatalogError::GeoJson)?,
        _ => return Err(CatalogError::NotAPoint(row)),
    };

    let status = seeder.status_or_seed(properties.get("status").map(String::as_str))?;

    ParkingSpot::new(
        &name,
        Coordinate::from(point),
        &spot_type,
        Fee::from_tag(&fee),
        &access,
        status,
    )
    .map_err(|reason| CatalogError::InvalidSpot { row, reason })
}

/// Reads spots from a `FeatureCollection` of points.
pub fn spots_from_geojson(
    geo_json_str: &str,
    seeder: &mut StatusSeeder,
) -> Result<Vec<ParkingSpot>, CatalogError> {
    let geo_json = geo_json_str.parse::<GeoJson>()?;

    let feature_collection = if let GeoJson::FeatureCollection(ctn) = geo_json {
        ctn
    } else {
        return Err(CatalogError::FeatureCollectionNotFound);
    };

    feature_collection
        .features
        .into_iter()
        .enumerate()
        .map(|(i, f)| spot_from_feature(i + 1, f, seeder))
        .collect()
}

pub fn load_geojson<P: AsRef<path::Path>>(
    geo_json_path: P,
    seed: u64,
) -> Result<Vec<ParkingSpot>, CatalogError> {
    info!("Loading spots from geo-json {:?} ...", geo_json_path.as_ref());
    let mut file = File::open(&geo_json_path)?;
    let mut file_contents = String::new();
    file.read_to_string(&mut file_contents)?;

    spots_from_geojson(&file_contents, &mut StatusSeeder::new(seed))
}

#[derive(Debug, Deserialize)]
struct StatusRow {
    name: String,
    status: String,
}

/// Reads an occupancy feed: CSV with `name,status` columns.
pub fn read_status_feed<R: io::Read>(input: R) -> Result<Vec<(String, SpotStatus)>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut updates = Vec::new();
    for record in csv_reader.deserialize::<StatusRow>() {
        let row = record?;
        let status = row.status.parse::<SpotStatus>()?;
        updates.push((row.name, status));
    }

    debug!("Read {} status updates", updates.len());
    Ok(updates)
}
