//! Price/distance adjustment factors.
//!
//! Rows are price segments, columns are distance bands, both addressed by
//! index rather than by their boundary value.

use std::fmt;

use rxprice_core::PricingSettings;

use crate::error::PricingError;

#[derive(Debug, Clone, PartialEq)]
pub struct RatioTable {
    price_bounds: Vec<f64>,
    distance_bounds: Vec<f64>,
    ratios: Vec<f64>,
}

impl RatioTable {
    /// Derives the table from validated settings.
    ///
    /// The nearest band always discounts by the fixed deviation. Farther
    /// bands scale with the summed distance bounds and inversely with the
    /// summed price bounds:
    /// `1 + (d[j] + d[j-1]) * unit_price / ((p[i] + p[i-1]) * unit)`,
    /// with `p[-1] = d[-1] = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Configuration`] if the settings are invalid,
    /// including empty bound lists.
    pub fn new(settings: &PricingSettings) -> Result<Self, PricingError> {
        settings.validate()?;

        let bands = settings.distances.len();
        let mut ratios = Vec::with_capacity(settings.prices.len() * bands);

        let mut prev_price = 0.0;
        for &price in &settings.prices {
            let price_sum = price + prev_price;
            let mut prev_distance = 0.0;
            for (band, &distance) in settings.distances.iter().enumerate() {
                let ratio = if band == 0 {
                    1.0 - settings.deviation
                } else {
                    let distance_sum = distance + prev_distance;
                    1.0 + (distance_sum * settings.default_unit_price)
                        / (price_sum * settings.default_unit)
                };
                ratios.push(ratio);
                prev_distance = distance;
            }
            prev_price = price;
        }

        Ok(Self {
            price_bounds: settings.prices.clone(),
            distance_bounds: settings.distances.clone(),
            ratios,
        })
    }

    /// Number of price segments (rows).
    #[must_use]
    pub fn segments(&self) -> usize {
        self.price_bounds.len()
    }

    /// Number of distance bands (columns).
    #[must_use]
    pub fn bands(&self) -> usize {
        self.distance_bounds.len()
    }

    #[must_use]
    pub fn price_bounds(&self) -> &[f64] {
        &self.price_bounds
    }

    #[must_use]
    pub fn distance_bounds(&self) -> &[f64] {
        &self.distance_bounds
    }

    /// Adjustment factor for a price segment and distance band.
    #[must_use]
    pub fn ratio(&self, segment: usize, band: usize) -> Option<f64> {
        if segment >= self.segments() || band >= self.bands() {
            return None;
        }
        self.ratios.get(segment * self.bands() + band).copied()
    }

    /// Index of the smallest price bound strictly greater than `price`.
    /// Prices at or above the top bound fall into the last segment.
    #[must_use]
    pub fn price_segment(&self, price: f64) -> usize {
        self.price_bounds
            .iter()
            .position(|bound| *bound > price)
            .unwrap_or(self.price_bounds.len().saturating_sub(1))
    }
}

impl fmt::Display for RatioTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", "price\\m")?;
        for distance in &self.distance_bounds {
            write!(f, "{distance:>10}")?;
        }
        writeln!(f)?;
        for (segment, price) in self.price_bounds.iter().enumerate() {
            write!(f, "{price:>10}")?;
            for band in 0..self.bands() {
                let ratio = self.ratio(segment, band).unwrap_or(f64::NAN);
                write!(f, "{ratio:>10.4}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
