use failure::Fail;

use log::debug;

use super::catalog::Coordinate;
use super::recommender::{FilterField, FilterSet, Query, DEFAULT_LIMIT};

/// Origin used when the caller gives none (Bengaluru city center).
pub const DEFAULT_ORIGIN: Coordinate = Coordinate {
    lat: 12.9716,
    lng: 77.5946,
};

/// Status filter applied when the caller does not ask for one.
pub const DEFAULT_STATUS_FILTER: &str = "available";

/// Status value lifting the default status filter.
pub const ANY_STATUS: &str = "any";

#[derive(Debug, PartialEq, Fail)]
pub enum QueryError {
    #[fail(display = "Invalid count '{}': expected a non negative integer", _0)]
    InvalidLimit(String),
    #[fail(display = "Malformed {} '{}'", field, value)]
    MalformedCoordinate { field: &'static str, value: String },
}

/**
 * Raw, untyped request parameters (`lat`, `lng`, `count` and filters), as
 * they come from the command line.
 *
 * Filter values can repeat or be comma separated; all of them are accepted.
 */
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> QueryParams {
        QueryParams::default()
    }

    pub fn push(&mut self, key: &str, value: &str) {
        self.pairs.push((key.trim().to_owned(), value.trim().to_owned()));
    }

    pub fn with(mut self, key: &str, value: &str) -> QueryParams {
        self.push(key, value);
        self
    }

    fn last(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn coordinate(&self, field: &'static str, default: f64, min: f64, max: f64) -> Result<f64, QueryError> {
        let raw = match self.last(field) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(default),
        };

        let malformed = || QueryError::MalformedCoordinate {
            field,
            value: raw.to_owned(),
        };
        let value: f64 = raw.parse().map_err(|_| malformed())?;
        if !value.is_finite() || value < min || value > max {
            return Err(malformed());
        }
        Ok(value)
    }

    fn limit(&self) -> Result<u32, QueryError> {
        match self.last("count") {
            Some(raw) if !raw.is_empty() => raw
                .parse::<u32>()
                .map_err(|_| QueryError::InvalidLimit(raw.to_owned())),
            _ => Ok(DEFAULT_LIMIT),
        }
    }

    /**
     * Filters from every parameter that names a filter field. The status
     * filter defaults to available spots, and `status=any` lifts it.
     */
    pub fn filters(&self) -> FilterSet {
        let mut raw: Vec<(&str, Vec<&str>)> = Vec::new();
        for (key, value) in &self.pairs {
            match key.as_str() {
                "lat" | "lng" | "count" => continue,
                _ => {}
            }
            let values: Vec<&str> = value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .collect();
            raw.push((key.as_str(), values));
        }

        let status_given = raw
            .iter()
            .any(|(key, _)| FilterField::from_key(key) == Some(FilterField::Status));
        let any_status = raw.iter().any(|(key, values)| {
            FilterField::from_key(key) == Some(FilterField::Status)
                && values.iter().any(|v| v.eq_ignore_ascii_case(ANY_STATUS))
        });

        if any_status {
            debug!("Status filter lifted");
            raw.retain(|(key, _)| FilterField::from_key(key) != Some(FilterField::Status));
        } else if !status_given {
            raw.push(("status", vec![DEFAULT_STATUS_FILTER]));
        }

        FilterSet::from_raw(raw)
    }

    /// Validates the parameters and builds the engine query.
    pub fn to_query(&self) -> Result<Query, QueryError> {
        let lat = self.coordinate("lat", DEFAULT_ORIGIN.lat, -90.0, 90.0)?;
        let lng = self.coordinate("lng", DEFAULT_ORIGIN.lng, -180.0, 180.0)?;

        Ok(Query::new(Coordinate::new(lat, lng))
            .with_limit(self.limit()?)
            .with_filters(self.filters()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn statuses(query: &Query) -> Option<Vec<String>> {
        query
            .filters
            .accepted(FilterField::Status)
            .map(|values| values.iter().cloned().collect())
    }

    #[test]
    fn it_should_use_the_defaults() {
        let query = QueryParams::new().to_query().unwrap();
        assert_eq!(query.origin, DEFAULT_ORIGIN);
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(statuses(&query), Some(vec!["available".to_owned()]));
        assert_eq!(query.filters.accepted(FilterField::Type), None);
    }

    #[test]
    fn it_should_read_every_parameter() {
        let query = QueryParams::new()
            .with("lat", "12.93")
            .with("lng", "77.61")
            .with("count", "3")
            .with("type", "surface,underground")
            .with("fee", "no")
            .to_query()
            .unwrap();

        assert_eq!(query.origin, Coordinate::new(12.93, 77.61));
        assert_eq!(query.limit, 3);
        assert_eq!(query.filters.accepted(FilterField::Type).map(|v| v.len()), Some(2));
        assert!(query.filters.accepted(FilterField::Fee).unwrap().contains("free"));
        assert_eq!(statuses(&query), Some(vec!["available".to_owned()]));
    }

    #[test]
    fn it_should_accept_repeated_values() {
        let query = QueryParams::new()
            .with("status", "booked")
            .with("status", "occupied")
            .to_query()
            .unwrap();
        assert_eq!(statuses(&query), Some(vec!["booked".to_owned(), "occupied".to_owned()]));
    }

    #[test]
    fn it_should_lift_the_status_filter() {
        let query = QueryParams::new().with("status", "any").to_query().unwrap();
        assert_eq!(statuses(&query), None);
        assert!(query.filters.is_unconstrained());
    }

    #[test]
    fn it_should_ignore_unknown_keys() {
        let query = QueryParams::new()
            .with("colour", "red")
            .with("status", "any")
            .to_query()
            .unwrap();
        assert!(query.filters.is_unconstrained());
    }

    #[test]
    fn it_should_accept_a_zero_count() {
        let query = QueryParams::new().with("count", "0").to_query().unwrap();
        assert_eq!(query.limit, 0);
    }

    #[test]
    fn it_should_reject_a_negative_count() {
        let result = QueryParams::new().with("count", "-1").to_query();
        assert_eq!(result, Err(QueryError::InvalidLimit("-1".to_owned())));
    }

    #[test]
    fn it_should_reject_out_of_range_coordinates() {
        let result = QueryParams::new().with("lat", "91").to_query();
        assert_matches!(result, Err(QueryError::MalformedCoordinate { field: "lat", .. }));

        let result = QueryParams::new().with("lng", "-180.5").to_query();
        assert_matches!(result, Err(QueryError::MalformedCoordinate { field: "lng", .. }));
    }

    #[test]
    fn it_should_reject_garbage_coordinates() {
        let result = QueryParams::new().with("lat", "north").to_query();
        assert_matches!(result, Err(QueryError::MalformedCoordinate { field: "lat", .. }));

        let result = QueryParams::new().with("lng", "NaN").to_query();
        assert_matches!(result, Err(QueryError::MalformedCoordinate { field: "lng", .. }));
    }
}
