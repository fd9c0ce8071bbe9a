use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::catalog::ParkingSpot;

/// Spot attributes a query may constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    Type,
    Fee,
    Status,
}

impl FilterField {
    pub fn from_key(key: &str) -> Option<FilterField> {
        match key.trim().to_lowercase().as_str() {
            "type" | "parking_type" => Some(FilterField::Type),
            "fee" => Some(FilterField::Fee),
            "status" => Some(FilterField::Status),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Type => "type",
            FilterField::Fee => "fee",
            FilterField::Status => "status",
        }
    }

    #[inline]
    pub fn value_of<'a>(&self, spot: &'a ParkingSpot) -> &'a str {
        match self {
            FilterField::Type => &spot.spot_type,
            FilterField::Fee => spot.fee.as_str(),
            FilterField::Status => spot.status.as_str(),
        }
    }

    /**
     * Puts a caller supplied value in the form the spot field uses. Fee
     * accepts the source "yes"/"no" tags. Anything unrecognised is kept as is
     * and simply matches nothing.
     */
    fn normalize(&self, value: &str) -> String {
        let value = value.trim();
        match self {
            FilterField::Type => value.to_owned(),
            FilterField::Status => value.to_lowercase(),
            FilterField::Fee => match value.to_lowercase().as_str() {
                "no" | "free" => "free".to_owned(),
                "yes" | "paid" => "paid".to_owned(),
                other => other.to_owned(),
            },
        }
    }
}

/**
 * Accepted values per field. A spot passes if, for every constrained field,
 * its value is one of the accepted ones. A field with an empty set of
 * accepted values rejects every spot.
 */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    constraints: BTreeMap<FilterField, BTreeSet<String>>,
}

impl FilterSet {
    pub fn new() -> FilterSet {
        FilterSet::default()
    }

    /**
     * Builds a filter set from untyped key/values pairs, as they come from a
     * query string. Unknown keys are ignored.
     */
    pub fn from_raw<'a, I, V>(pairs: I) -> FilterSet
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let mut filters = FilterSet::new();
        for (key, values) in pairs {
            match FilterField::from_key(key) {
                Some(field) => filters.accept(field, values),
                None => debug!("Ignoring unknown filter key '{}'", key),
            }
        }
        filters
    }

    /// Adds accepted values for `field`. Constrains the field even when
    /// `values` is empty.
    pub fn accept<V>(&mut self, field: FilterField, values: V)
    where
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let accepted = self.constraints.entry(field).or_insert_with(BTreeSet::new);
        for value in values {
            accepted.insert(field.normalize(value.as_ref()));
        }
    }

    pub fn with<V>(mut self, field: FilterField, values: V) -> FilterSet
    where
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        self.accept(field, values);
        self
    }

    pub fn accepted(&self, field: FilterField) -> Option<&BTreeSet<String>> {
        self.constraints.get(&field)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
    }

    #[inline]
    pub fn matches(&self, spot: &ParkingSpot) -> bool {
        self.constraints
            .iter()
            .all(|(field, accepted)| accepted.contains(field.value_of(spot)))
    }

    /// Conjunction of two filter sets: fields constrained by both keep the
    /// values accepted by both.
    pub fn and(&self, other: &FilterSet) -> FilterSet {
        let mut constraints = self.constraints.clone();
        for (field, accepted) in &other.constraints {
            let merged = match constraints.get(field) {
                Some(mine) => mine.intersection(accepted).cloned().collect(),
                None => accepted.clone(),
            };
            constraints.insert(*field, merged);
        }
        FilterSet { constraints }
    }
}

/// Spots passing `filters`, with their catalog position, in catalog order.
pub fn filter_spots<'a>(
    spots: &'a [ParkingSpot],
    filters: &'a FilterSet,
) -> impl Iterator<Item = (usize, &'a ParkingSpot)> + 'a {
    spots
        .iter()
        .enumerate()
        .filter(move |(_, spot)| filters.matches(spot))
}
