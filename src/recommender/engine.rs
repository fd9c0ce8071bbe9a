use serde::Serialize;

use log::debug;

use super::filters::{filter_spots, FilterSet};
use crate::catalog::{Coordinate, ParkingSpot, SpotProvider};
use crate::distance::haversine_km;

pub const DEFAULT_LIMIT: u32 = 5;

/// Distances closer than this, in km, are ties.
pub const TIE_TOLERANCE_KM: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub origin: Coordinate,
    pub limit: u32,
    pub filters: FilterSet,
}

impl Query {
    pub fn new(origin: Coordinate) -> Query {
        Query {
            origin,
            limit: DEFAULT_LIMIT,
            filters: FilterSet::new(),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Query {
        self.limit = limit;
        self
    }

    pub fn with_filters(mut self, filters: FilterSet) -> Query {
        self.filters = filters;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSpot {
    pub spot: ParkingSpot,
    pub distance_km: f64,
}

/// Spots ordered nearest first.
pub type RankedResult = Vec<RankedSpot>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingStrategy {
    /// Distance to every spot passing the filters.
    Scan,
    /// R-tree narrowing before ranking. Same results as `Scan`.
    Indexed,
}

impl Default for RankingStrategy {
    fn default() -> RankingStrategy {
        RankingStrategy::Scan
    }
}

/**
 * Nearest-first recommendations over the spots of a provider.
 *
 * Every call takes one snapshot of the provider, so the statuses it filters on
 * are the current ones and are consistent for the whole call. Nothing is
 * cached between calls.
 */
pub struct Recommender<P> {
    provider: P,
    strategy: RankingStrategy,
}

impl<P: SpotProvider> Recommender<P> {
    pub fn new(provider: P) -> Recommender<P> {
        Recommender {
            provider,
            strategy: RankingStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: RankingStrategy) -> Recommender<P> {
        self.strategy = strategy;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn strategy(&self) -> RankingStrategy {
        self.strategy
    }

    pub fn recommend(&self, query: &Query) -> RankedResult {
        if query.limit == 0 {
            return Vec::new();
        }

        let snapshot = self.provider.snapshot();
        let spots = snapshot.spots();
        let limit = query.limit as usize;

        let positions: Vec<usize> = match self.strategy {
            RankingStrategy::Scan => filter_spots(spots, &query.filters).map(|(i, _)| i).collect(),
            RankingStrategy::Indexed => snapshot
                .index()
                .candidates(&query.origin, limit, |i| query.filters.matches(&spots[i])),
        };

        debug!(
            "{} of {} spots are candidates for {:?}",
            positions.len(),
            spots.len(),
            query.origin
        );

        rank(spots, positions, &query.origin, limit)
    }

    /// The single nearest spot passing `filters`.
    pub fn nearest(&self, origin: Coordinate, filters: &FilterSet) -> Option<RankedSpot> {
        let query = Query {
            origin,
            limit: 1,
            filters: filters.clone(),
        };
        self.recommend(&query).into_iter().next()
    }
}

/**
 * Sorts `positions` (ascending catalog positions) by distance to `origin` and
 * keeps the first `limit`. Spots whose distances are within
 * `TIE_TOLERANCE_KM` of each other stay in catalog order.
 */
fn rank(spots: &[ParkingSpot], positions: Vec<usize>, origin: &Coordinate, limit: usize) -> RankedResult {
    let mut distances: Vec<(usize, f64)> = positions
        .into_iter()
        .map(|i| (i, haversine_km(origin, &spots[i].location)))
        .collect();

    distances.sort_by(|a, b| a.1.total_cmp(&b.1));
    order_ties_by_position(&mut distances);
    distances.truncate(limit);

    distances
        .into_iter()
        .map(|(i, distance_km)| RankedSpot {
            spot: spots[i].clone(),
            distance_km,
        })
        .collect()
}

/// Each run of entries within `TIE_TOLERANCE_KM` of the run's first entry is
/// put back in catalog order. Expects `distances` sorted by distance.
fn order_ties_by_position(distances: &mut [(usize, f64)]) {
    let mut start = 0;
    while start < distances.len() {
        let run_distance = distances[start].1;
        let end = distances[start..]
            .iter()
            .position(|(_, d)| d - run_distance > TIE_TOLERANCE_KM)
            .map_or(distances.len(), |offset| start + offset);
        distances[start..end].sort_by_key(|(position, _)| *position);
        start = end;
    }
}
