use cgmath::Point3;
use spade::rtree::RTree;

use super::spot_types::{Coordinate, ParkingSpot};

// Margin on the unit sphere (about 6 m) added around the search radius. Spots
// ranked as ties of the last accepted candidate are always inside it.
const CHORD_SLACK: f64 = 1e-9;

#[derive(Clone)]
struct IndexedSpot {
    point: Point3<f64>,
    position: usize,
}

impl spade::SpatialObject for IndexedSpot {
    type Point = Point3<f64>;

    #[inline]
    fn mbr(&self) -> spade::BoundingRect<Self::Point> {
        spade::BoundingRect::from_corners(&self.point, &self.point)
    }

    #[inline]
    fn distance2(&self, point: &Self::Point) -> f64 {
        chord2(&self.point, point)
    }

    #[inline]
    fn contains(&self, point: &Self::Point) -> bool {
        self.point == *point
    }
}

#[inline]
fn chord2(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    dx * dx + dy * dy + dz * dz
}

/**
 * Position on the unit sphere. The straight (chord) distance between two of
 * these grows monotonically with the great-circle distance, so the R-tree
 * neighbour order is the haversine order.
 */
fn to_unit_sphere(coordinate: &Coordinate) -> Point3<f64> {
    let lat = coordinate.lat.to_radians();
    let lng = coordinate.lng.to_radians();
    Point3::new(lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin())
}

/// R-tree over the spots of one catalog load. Stores catalog positions only.
#[derive(Clone)]
pub struct SpotIndex {
    tree: RTree<IndexedSpot>,
    size: usize,
}

impl SpotIndex {
    pub fn new(spots: &[ParkingSpot]) -> SpotIndex {
        let indexed: Vec<IndexedSpot> = spots
            .iter()
            .enumerate()
            .map(|(position, spot)| IndexedSpot {
                point: to_unit_sphere(&spot.location),
                position,
            })
            .collect();

        let size = indexed.len();
        let tree = if indexed.is_empty() {
            RTree::new()
        } else {
            RTree::bulk_load(indexed)
        };

        SpotIndex { tree, size }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    /**
     * Catalog positions, in ascending order, of a candidate set guaranteed to
     * contain the `limit` nearest accepted spots and every spot tied with
     * them. Ranking the candidates gives the same answer as ranking the whole
     * catalog.
     */
    pub fn candidates<F>(&self, origin: &Coordinate, limit: usize, accept: F) -> Vec<usize>
    where
        F: Fn(usize) -> bool,
    {
        if limit == 0 || self.size == 0 {
            return Vec::new();
        }

        let query = to_unit_sphere(origin);
        let mut neighbors_tests = limit.min(self.size);

        loop {
            let nearest = self.tree.nearest_n_neighbors(&query, neighbors_tests);

            let mut accepted: Vec<f64> = nearest
                .iter()
                .filter(|s| accept(s.position))
                .map(|s| chord2(&s.point, &query))
                .collect();

            if accepted.len() >= limit {
                accepted.sort_by(|a, b| a.total_cmp(b));
                let radius = accepted[limit - 1].sqrt() + CHORD_SLACK;

                let mut positions: Vec<usize> = self
                    .tree
                    .lookup_in_circle(&query, &(radius * radius))
                    .into_iter()
                    .map(|s| s.position)
                    .filter(|position| accept(*position))
                    .collect();
                positions.sort_unstable();
                return positions;
            }

            if neighbors_tests >= self.size {
                // Every spot was visited and fewer than `limit` are accepted.
                let mut positions: Vec<usize> = nearest
                    .iter()
                    .map(|s| s.position)
                    .filter(|position| accept(*position))
                    .collect();
                positions.sort_unstable();
                return positions;
            }

            neighbors_tests = (neighbors_tests * 2).min(self.size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Fee, SpotStatus};

    fn spot(name: &str, lat: f64, lng: f64) -> ParkingSpot {
        ParkingSpot::new(
            name,
            Coordinate::new(lat, lng),
            "surface",
            Fee::Free,
            "permissive",
            SpotStatus::Available,
        )
        .unwrap()
    }

    fn grid() -> Vec<ParkingSpot> {
        let mut spots = Vec::new();
        for i in 0..10 {
            for j in 0..10 {
                spots.push(spot(
                    &format!("spot-{}-{}", i, j),
                    12.9 + 0.01 * i as f64,
                    77.5 + 0.01 * j as f64,
                ));
            }
        }
        spots
    }

    #[test]
    fn it_should_map_coordinates_on_the_unit_sphere() {
        let point = to_unit_sphere(&Coordinate::new(90.0, 0.0));
        assert!((point.z - 1.0).abs() < 1e-12);

        let point = to_unit_sphere(&Coordinate::new(0.0, 90.0));
        assert!((point.y - 1.0).abs() < 1e-12);
        assert!(point.x.abs() < 1e-12);
    }

    #[test]
    fn it_should_return_nothing_for_a_zero_limit() {
        let index = SpotIndex::new(&grid());
        assert!(index.candidates(&Coordinate::new(12.95, 77.55), 0, |_| true).is_empty());
    }

    #[test]
    fn it_should_return_nothing_for_an_empty_catalog() {
        let index = SpotIndex::new(&[]);
        assert_eq!(index.len(), 0);
        assert!(index.candidates(&Coordinate::new(12.95, 77.55), 3, |_| true).is_empty());
    }

    #[test]
    fn it_should_include_the_nearest_spot() {
        let spots = grid();
        let index = SpotIndex::new(&spots);

        // Exactly on spot-3-4.
        let candidates = index.candidates(&Coordinate::new(12.93, 77.54), 1, |_| true);
        assert!(candidates.contains(&34));
    }

    #[test]
    fn it_should_only_return_accepted_positions_in_order() {
        let spots = grid();
        let index = SpotIndex::new(&spots);

        let candidates = index.candidates(&Coordinate::new(12.95, 77.55), 5, |p| p % 7 == 0);
        assert!(candidates.len() >= 5);
        assert!(candidates.iter().all(|p| p % 7 == 0));
        assert!(candidates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn it_should_return_every_accepted_spot_when_few_match() {
        let spots = grid();
        let index = SpotIndex::new(&spots);

        let candidates = index.candidates(&Coordinate::new(12.95, 77.55), 10, |p| p == 3 || p == 97);
        assert_eq!(candidates, vec![3, 97]);
    }
}
