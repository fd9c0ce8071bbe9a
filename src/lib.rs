//! Nearest parking spots for a location.
//!
//! A [`catalog::Catalog`] holds the known spots; a
//! [`recommender::Recommender`] filters them and ranks them by great-circle
//! distance to the user.

pub mod catalog;
pub mod catalog_utils;
pub mod cli_utils;
pub mod distance;
pub mod query_params;
pub mod recommender;
pub mod report;
