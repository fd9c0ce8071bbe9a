mod engine;
mod filters;

pub use self::engine::{
    Query, RankedResult, RankedSpot, RankingStrategy, Recommender, DEFAULT_LIMIT, TIE_TOLERANCE_KM,
};
pub use self::filters::{filter_spots, FilterField, FilterSet};
