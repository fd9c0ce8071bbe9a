use serde::Serialize;

use std::fmt::Write;

use super::catalog::{Coordinate, Fee, ParkingSpot};
use super::distance::distance_label;
use super::recommender::RankedSpot;

#[derive(Debug, Serialize)]
pub struct SpotRecord<'a> {
    pub name: &'a str,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "type")]
    pub spot_type: &'a str,
    pub fee: &'static str,
    pub access: &'a str,
    pub status: &'static str,
}

impl<'a> From<&'a ParkingSpot> for SpotRecord<'a> {
    fn from(spot: &'a ParkingSpot) -> SpotRecord<'a> {
        SpotRecord {
            name: &spot.name,
            lat: spot.location.lat,
            lng: spot.location.lng,
            spot_type: &spot.spot_type,
            fee: spot.fee.source_tag(),
            access: &spot.access,
            status: spot.status.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationRecord<'a> {
    #[serde(flatten)]
    pub spot: SpotRecord<'a>,
    pub distance_km: f64,
    pub distance_text: String,
}

impl<'a> From<&'a RankedSpot> for RecommendationRecord<'a> {
    fn from(ranked: &'a RankedSpot) -> RecommendationRecord<'a> {
        RecommendationRecord {
            spot: SpotRecord::from(&ranked.spot),
            distance_km: (ranked.distance_km * 100.0).round() / 100.0,
            distance_text: distance_label(ranked.distance_km),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse<'a> {
    pub success: bool,
    pub user_location: Coordinate,
    pub recommendations: Vec<RecommendationRecord<'a>>,
    pub count: usize,
}

impl<'a> RecommendationsResponse<'a> {
    pub fn new(user_location: Coordinate, ranked: &'a [RankedSpot]) -> RecommendationsResponse<'a> {
        let recommendations: Vec<RecommendationRecord> = ranked.iter().map(RecommendationRecord::from).collect();
        RecommendationsResponse {
            success: true,
            user_location,
            count: recommendations.len(),
            recommendations,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SpotsResponse<'a> {
    pub success: bool,
    pub spots: Vec<SpotRecord<'a>>,
    pub count: usize,
}

impl<'a> SpotsResponse<'a> {
    pub fn new(spots: &'a [ParkingSpot]) -> SpotsResponse<'a> {
        SpotsResponse {
            success: true,
            spots: spots.iter().map(SpotRecord::from).collect(),
            count: spots.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new<E: std::fmt::Display>(error: E) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: error.to_string(),
        }
    }
}

/// "street_side" -> "Street Side"
fn title_case(tag: &str) -> String {
    tag.split(|c| c == '_' || c == ' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn fee_label(fee: Fee) -> &'static str {
    match fee {
        Fee::Free => "Free",
        Fee::Paid => "Paid",
    }
}

pub fn format_recommendations(origin: &Coordinate, ranked: &[RankedSpot]) -> String {
    let mut out = String::new();
    writeln!(out, "User Location: {}, {}", origin.lat, origin.lng).ok();

    if ranked.is_empty() {
        writeln!(out, "No parking spot matches.").ok();
        return out;
    }

    for (i, r) in ranked.iter().enumerate() {
        let spot = &r.spot;
        writeln!(out).ok();
        writeln!(out, "{}. {}", i + 1, spot.name).ok();
        writeln!(out, "   Location: {:.4}, {:.4}", spot.location.lat, spot.location.lng).ok();
        writeln!(out, "   Type: {}", title_case(&spot.spot_type)).ok();
        writeln!(out, "   Fee: {}", fee_label(spot.fee)).ok();
        writeln!(out, "   Access: {}", title_case(&spot.access)).ok();
        writeln!(out, "   Status: {}", title_case(spot.status.as_str())).ok();
        writeln!(out, "   Distance: {:.2} km", r.distance_km).ok();
    }
    out
}

pub fn format_spots(spots: &[ParkingSpot]) -> String {
    let mut out = String::new();
    for spot in spots {
        writeln!(
            out,
            "{}\t{:.6}\t{:.6}\t{}\t{}\t{}\t{}",
            spot.name, spot.location.lat, spot.location.lng, spot.spot_type, spot.fee, spot.access, spot.status
        )
        .ok();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SpotStatus;

    fn ranked() -> Vec<RankedSpot> {
        let spot = ParkingSpot::new(
            "Koramangala 5th Block",
            Coordinate::new(12.934533, 77.615829),
            "street_side",
            Fee::Free,
            "permissive",
            SpotStatus::Available,
        )
        .unwrap();
        vec![RankedSpot {
            spot,
            distance_km: 4.2371,
        }]
    }

    #[test]
    fn it_should_title_case_tags() {
        assert_eq!(title_case("street_side"), "Street Side");
        assert_eq!(title_case("multi-storey"), "Multi-storey");
        assert_eq!(title_case("available"), "Available");
    }

    #[test]
    fn it_should_serialize_the_recommendations_payload() {
        let ranked = ranked();
        let response = RecommendationsResponse::new(Coordinate::new(12.9716, 77.5946), &ranked);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 1);
        assert_eq!(json["user_location"]["lat"], 12.9716);
        let first = &json["recommendations"][0];
        assert_eq!(first["name"], "Koramangala 5th Block");
        assert_eq!(first["type"], "street_side");
        assert_eq!(first["fee"], "no");
        assert_eq!(first["status"], "available");
        assert_eq!(first["distance_km"], 4.24);
        assert_eq!(first["distance_text"], "4.2 km away");
    }

    #[test]
    fn it_should_serialize_errors() {
        let json = serde_json::to_value(&ErrorResponse::new("Invalid count '-1'")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid count '-1'");
    }

    #[test]
    fn it_should_format_recommendations_as_text() {
        let text = format_recommendations(&Coordinate::new(12.9716, 77.5946), &ranked());
        assert!(text.contains("1. Koramangala 5th Block"));
        assert!(text.contains("Type: Street Side"));
        assert!(text.contains("Fee: Free"));
        assert!(text.contains("Distance: 4.24 km"));
    }

    #[test]
    fn it_should_say_when_nothing_matches() {
        let text = format_recommendations(&Coordinate::new(12.9716, 77.5946), &[]);
        assert!(text.contains("No parking spot matches."));
    }
}
