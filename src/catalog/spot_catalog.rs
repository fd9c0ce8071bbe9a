use parking_lot::RwLock;
use std::sync::Arc;

use log::{debug, info};

use super::spot_index::SpotIndex;
use super::spot_types::{CatalogError, ParkingSpot, SpotStatus};

/// Read-only view of the spots at one point in time.
pub struct CatalogSnapshot {
    spots: Vec<ParkingSpot>,
    index: Arc<SpotIndex>,
}

impl CatalogSnapshot {
    fn new(spots: Vec<ParkingSpot>) -> CatalogSnapshot {
        let index = Arc::new(SpotIndex::new(&spots));
        CatalogSnapshot { spots, index }
    }

    #[inline]
    pub fn spots(&self) -> &[ParkingSpot] {
        &self.spots
    }

    #[inline]
    pub fn index(&self) -> &SpotIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }
}

/// Source of the spots a recommendation is computed over.
pub trait SpotProvider {
    fn snapshot(&self) -> Arc<CatalogSnapshot>;
}

/**
 * The set of known parking spots.
 *
 * Readers take an `Arc` to the current snapshot and never block writers for
 * longer than the pointer copy. Status changes build a new snapshot sharing
 * the spatial index of the previous one (locations don't move).
 */
pub struct Catalog {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl Catalog {
    pub fn new(spots: Vec<ParkingSpot>) -> Catalog {
        info!("Catalog loaded with {} spots", spots.len());
        Catalog {
            current: RwLock::new(Arc::new(CatalogSnapshot::new(spots))),
        }
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    /// Replaces every spot. The spatial index is rebuilt.
    pub fn reload(&self, spots: Vec<ParkingSpot>) {
        info!("Reloading catalog with {} spots", spots.len());
        let snapshot = Arc::new(CatalogSnapshot::new(spots));
        *self.current.write() = snapshot;
    }

    /**
     * Updates the status of every spot named `name`.
     * Returns the number of spots changed.
     */
    pub fn set_status(&self, name: &str, status: SpotStatus) -> Result<usize, CatalogError> {
        let mut current = self.current.write();

        let matching = current.spots.iter().filter(|s| s.name == name).count();
        if matching == 0 {
            return Err(CatalogError::UnknownSpot(name.to_owned()));
        }

        let spots: Vec<ParkingSpot> = current
            .spots
            .iter()
            .map(|spot| {
                let mut spot = spot.clone();
                if spot.name == name {
                    spot.status = status;
                }
                spot
            })
            .collect();

        debug!("Status of '{}' set to {} ({} spots)", name, status, matching);

        let index = current.index.clone();
        *current = Arc::new(CatalogSnapshot { spots, index });

        Ok(matching)
    }

    /// Applies a batch of status updates as a single snapshot swap.
    /// Names not in the catalog are returned, the rest is applied.
    pub fn apply_statuses<'a, I>(&self, updates: I) -> Vec<String>
    where
        I: IntoIterator<Item = (&'a str, SpotStatus)>,
    {
        let mut current = self.current.write();
        let mut spots = current.spots.clone();
        let mut unknown = Vec::new();

        for (name, status) in updates {
            let mut found = false;
            for spot in spots.iter_mut().filter(|s| s.name == name) {
                spot.status = status;
                found = true;
            }
            if !found {
                unknown.push(name.to_owned());
            }
        }

        let index = current.index.clone();
        *current = Arc::new(CatalogSnapshot { spots, index });

        unknown
    }
}

impl SpotProvider for Catalog {
    fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.read().clone()
    }
}

impl<P: SpotProvider + ?Sized> SpotProvider for Arc<P> {
    fn snapshot(&self) -> Arc<CatalogSnapshot> {
        (**self).snapshot()
    }
}

impl<'a, P: SpotProvider + ?Sized> SpotProvider for &'a P {
    fn snapshot(&self) -> Arc<CatalogSnapshot> {
        (**self).snapshot()
    }
}
