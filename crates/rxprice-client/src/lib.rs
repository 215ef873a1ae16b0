//! Client for the pharmacy catalog API: outlets, price snapshots,
//! competitor prices and the repricing task queue.

pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::CatalogClient;
pub use error::ClientError;
pub use normalize::{parse_timestamp, COORDINATE_SCALE};
