use rxprice_core::ConfigError;
use thiserror::Error;

/// Failures that abort a pricing run for one outlet.
///
/// Sentinel catalog rows are not errors; they surface as
/// [`rxprice_core::PriceOrigin::Sentinel`] on the priced row instead.
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("invalid pricing configuration: {0}")]
    Configuration(String),

    #[error("invalid coordinates for outlet {outlet_id}: lat={latitude}, lng={longitude}")]
    Geometry {
        outlet_id: String,
        latitude: f64,
        longitude: f64,
    },

    #[error("data unavailable for outlet {outlet_id}: {reason}")]
    DataUnavailable { outlet_id: String, reason: String },
}

impl From<ConfigError> for PricingError {
    fn from(err: ConfigError) -> Self {
        PricingError::Configuration(err.to_string())
    }
}
