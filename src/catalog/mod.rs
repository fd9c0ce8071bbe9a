mod loaders;
mod spot_catalog;
mod spot_index;
mod spot_types;

pub use self::loaders::{
    builtin_spots, load_csv, load_geojson, read_status_feed, spots_from_csv, spots_from_geojson,
    StatusSeeder, DEFAULT_SEED,
};
pub use self::spot_catalog::{Catalog, CatalogSnapshot, SpotProvider};
pub use self::spot_index::SpotIndex;
pub use self::spot_types::{CatalogError, Coordinate, Fee, InvalidSpot, ParkingSpot, SpotStatus};
