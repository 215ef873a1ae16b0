pub mod competitors;
pub mod engine;
pub mod error;
pub mod geo;
pub mod ratio;
pub mod run;

pub use competitors::{distance_bands, select_competitors, CompetitorBands, DistanceBand};
pub use engine::{adjusted_price, PriceEngine};
pub use error::PricingError;
pub use geo::{check_coordinates, distance_between, DistanceMatrix, EARTH_RADIUS_M};
pub use ratio::RatioTable;
pub use run::PricingRun;
