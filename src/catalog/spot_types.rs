use failure::Fail;
use geojson::Error as GeoJsonError;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::io;
use std::str::FromStr;

use log::info;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[inline]
    pub fn new(lat: f64, lng: f64) -> Coordinate {
        Coordinate { lat, lng }
    }

    pub fn is_in_range(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    #[inline]
    pub fn is_null_island(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }
}

// geo works in (x, y) = (longitude, latitude).
impl From<Coordinate> for geo::Point<f64> {
    fn from(coordinate: Coordinate) -> geo::Point<f64> {
        geo::Point::from((coordinate.lng, coordinate.lat))
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(point: geo::Point<f64>) -> Coordinate {
        Coordinate::new(point.y(), point.x())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    Available,
    Occupied,
    Booked,
}

impl SpotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpotStatus::Available => "available",
            SpotStatus::Occupied => "occupied",
            SpotStatus::Booked => "booked",
        }
    }
}

impl fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpotStatus {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<SpotStatus, CatalogError> {
        match value.trim().to_lowercase().as_str() {
            "available" => Ok(SpotStatus::Available),
            "occupied" => Ok(SpotStatus::Occupied),
            "booked" => Ok(SpotStatus::Booked),
            _ => Err(CatalogError::UnknownStatus(value.to_owned())),
        }
    }
}

/// Two valued fee indicator. Source data writes "no" for free spots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fee {
    Free,
    Paid,
}

impl Fee {
    pub fn from_tag(tag: &str) -> Fee {
        match tag.trim().to_lowercase().as_str() {
            "no" | "free" => Fee::Free,
            _ => Fee::Paid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Fee::Free => "free",
            Fee::Paid => "paid",
        }
    }

    /// The "no"/"yes" tag of the source data.
    pub fn source_tag(&self) -> &'static str {
        match self {
            Fee::Free => "no",
            Fee::Paid => "yes",
        }
    }
}

impl fmt::Display for Fee {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpot {
    pub name: String,
    pub location: Coordinate,
    pub spot_type: String,
    pub fee: Fee,
    pub access: String,
    pub status: SpotStatus,
}

impl ParkingSpot {
    /**
     * Builds a spot, checking the catalog invariants: a real location and
     * non-empty tags.
     */
    pub fn new(
        name: &str,
        location: Coordinate,
        spot_type: &str,
        fee: Fee,
        access: &str,
        status: SpotStatus,
    ) -> Result<ParkingSpot, InvalidSpot> {
        if name.trim().is_empty() {
            return Err(InvalidSpot::EmptyField("name"));
        }
        if spot_type.trim().is_empty() {
            return Err(InvalidSpot::EmptyField("type"));
        }
        if access.trim().is_empty() {
            return Err(InvalidSpot::EmptyField("access"));
        }
        if !location.is_in_range() {
            return Err(InvalidSpot::OutOfRange(location));
        }
        if location.is_null_island() {
            return Err(InvalidSpot::NullLocation);
        }

        Ok(ParkingSpot {
            name: name.trim().to_owned(),
            location,
            spot_type: spot_type.trim().to_owned(),
            fee,
            access: access.trim().to_owned(),
            status,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Fail)]
pub enum InvalidSpot {
    #[fail(display = "empty {}", _0)]
    EmptyField(&'static str),
    #[fail(display = "coordinates out of range: {:?}", _0)]
    OutOfRange(Coordinate),
    #[fail(display = "location is (0, 0)")]
    NullLocation,
}

#[derive(Debug, Fail)]
pub enum CatalogError {
    #[fail(display = "Invalid spot at row {}: {}", row, reason)]
    InvalidSpot { row: usize, reason: InvalidSpot },
    #[fail(display = "Unknown status: {}", _0)]
    UnknownStatus(String),
    #[fail(display = "Unknown spot: {}", _0)]
    UnknownSpot(String),
    #[fail(display = "GeoJSON error: {}", _0)]
    GeoJson(GeoJsonError),
    #[fail(display = "Feature collection not found")]
    FeatureCollectionNotFound,
    #[fail(display = "Feature {} is not a point", _0)]
    NotAPoint(usize),
    #[fail(display = "Invalid property: {}", _0)]
    InvalidProperty(serde_json::Value),
    #[fail(display = "Missing property '{}' in feature {}", property, row)]
    MissingProperty { row: usize, property: &'static str },
    #[fail(display = "Csv error: {}", _0)]
    Csv(csv::Error),
    #[fail(display = "Snapshot error: {}", _0)]
    Snapshot(bincode::Error),
    #[fail(display = "I/O error: {}", _0)]
    Io(io::Error),
}

impl From<GeoJsonError> for CatalogError {
    fn from(err: GeoJsonError) -> CatalogError {
        info!("Error parsing geo-json: {}", err);
        CatalogError::GeoJson(err)
    }
}

impl From<csv::Error> for CatalogError {
    fn from(err: csv::Error) -> CatalogError {
        CatalogError::Csv(err)
    }
}

impl From<bincode::Error> for CatalogError {
    fn from(err: bincode::Error) -> CatalogError {
        CatalogError::Snapshot(err)
    }
}

impl From<io::Error> for CatalogError {
    fn from(err: io::Error) -> CatalogError {
        CatalogError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn it_should_read_the_fee_tag() {
        assert_eq!(Fee::from_tag("no"), Fee::Free);
        assert_eq!(Fee::from_tag("Free"), Fee::Free);
        assert_eq!(Fee::from_tag("yes"), Fee::Paid);
        assert_eq!(Fee::from_tag("customers"), Fee::Paid);
        assert_eq!(Fee::from_tag(Fee::Free.source_tag()), Fee::Free);
        assert_eq!(Fee::Paid.source_tag(), "yes");
    }

    #[test]
    fn it_should_parse_statuses() {
        assert_eq!("available".parse::<SpotStatus>().unwrap(), SpotStatus::Available);
        assert_eq!(" Booked ".parse::<SpotStatus>().unwrap(), SpotStatus::Booked);
        assert_matches!("parked".parse::<SpotStatus>(), Err(CatalogError::UnknownStatus(_)));
    }

    #[test]
    fn it_should_reject_a_spot_at_null_island() {
        let result = ParkingSpot::new(
            "Nowhere",
            Coordinate::new(0.0, 0.0),
            "surface",
            Fee::Free,
            "permissive",
            SpotStatus::Available,
        );
        assert_matches!(result, Err(InvalidSpot::NullLocation));
    }

    #[test]
    fn it_should_reject_empty_tags() {
        let result = ParkingSpot::new(
            "Cubbon Park Parking",
            Coordinate::new(12.976231, 77.590674),
            " ",
            Fee::Free,
            "permissive",
            SpotStatus::Available,
        );
        assert_matches!(result, Err(InvalidSpot::EmptyField("type")));
    }

    #[test]
    fn it_should_reject_out_of_range_coordinates() {
        let result = ParkingSpot::new(
            "Somewhere",
            Coordinate::new(91.0, 77.0),
            "surface",
            Fee::Free,
            "permissive",
            SpotStatus::Available,
        );
        assert_matches!(result, Err(InvalidSpot::OutOfRange(_)));
    }

    #[test]
    fn it_should_convert_to_geo_points_as_lng_lat() {
        let point: geo::Point<f64> = Coordinate::new(12.97, 77.59).into();
        assert_eq!(point.x(), 77.59);
        assert_eq!(point.y(), 12.97);
        assert_eq!(Coordinate::from(point), Coordinate::new(12.97, 77.59));
    }
}
