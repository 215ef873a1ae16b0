//! One outlet's pricing run as an explicit, immutable context.
//!
//! [`PricingRun::prepare`] builds everything derived from settings and the
//! outlet set (ratio table, distance matrix, per-band competitor sets).
//! The caller then fetches competitor prices for [`PricingRun::competitor_outlets`]
//! and hands them with the subject's snapshot to [`PricingRun::price`].
//! A failure at either stage yields no output at all.

use rxprice_core::{CompetitorPrice, NewPrice, Outlet, PriceSnapshot, PricingSettings};

use crate::competitors::{distance_bands, CompetitorBands};
use crate::engine::PriceEngine;
use crate::error::PricingError;
use crate::geo::{check_coordinates, DistanceMatrix};
use crate::ratio::RatioTable;

#[derive(Debug, Clone)]
pub struct PricingRun {
    subject: Outlet,
    ratios: RatioTable,
    matrix: DistanceMatrix,
    competitors: CompetitorBands,
}

impl PricingRun {
    /// Builds the run's read-only tables for `subject_id`.
    ///
    /// # Errors
    ///
    /// - [`PricingError::Configuration`] if `settings` are invalid.
    /// - [`PricingError::DataUnavailable`] if the subject is not in `outlets`.
    /// - [`PricingError::Geometry`] if the subject has invalid coordinates.
    ///   Other outlets with invalid coordinates are never competitors.
    pub fn prepare(
        settings: &PricingSettings,
        outlets: &[Outlet],
        subject_id: &str,
    ) -> Result<Self, PricingError> {
        let ratios = RatioTable::new(settings)?;

        let subject = outlets
            .iter()
            .find(|o| o.id == subject_id)
            .cloned()
            .ok_or_else(|| PricingError::DataUnavailable {
                outlet_id: subject_id.to_string(),
                reason: "outlet is missing from the outlet set".to_string(),
            })?;
        check_coordinates(&subject)?;

        let matrix = DistanceMatrix::build(outlets);
        let competitors = CompetitorBands::build(
            subject_id,
            outlets,
            &matrix,
            distance_bands(&settings.distances),
        );

        tracing::debug!(
            outlet_id = %subject.id,
            outlets = matrix.len(),
            excluded = matrix.excluded().len(),
            competitors = competitors.len(),
            "pricing run prepared"
        );

        Ok(Self {
            subject,
            ratios,
            matrix,
            competitors,
        })
    }

    #[must_use]
    pub fn subject(&self) -> &Outlet {
        &self.subject
    }

    #[must_use]
    pub fn ratios(&self) -> &RatioTable {
        &self.ratios
    }

    #[must_use]
    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    #[must_use]
    pub fn competitors(&self) -> &CompetitorBands {
        &self.competitors
    }

    /// Outlets whose prices must be fetched before [`Self::price`].
    #[must_use]
    pub fn competitor_outlets<'o>(&self, outlets: &'o [Outlet]) -> Vec<&'o Outlet> {
        outlets
            .iter()
            .filter(|o| self.competitors.band_of(&o.id).is_some())
            .collect()
    }

    /// Prices the subject's snapshot against the fetched competitor prices.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::DataUnavailable`] if `snapshots` is empty.
    pub fn price(
        &self,
        snapshots: &[PriceSnapshot],
        competitor_prices: &[CompetitorPrice],
    ) -> Result<Vec<NewPrice>, PricingError> {
        if snapshots.is_empty() {
            return Err(PricingError::DataUnavailable {
                outlet_id: self.subject.id.clone(),
                reason: "price snapshot is empty".to_string(),
            });
        }

        let priced =
            PriceEngine::new(&self.ratios, &self.competitors).price_all(snapshots, competitor_prices);

        tracing::debug!(
            outlet_id = %self.subject.id,
            items = priced.len(),
            offers = competitor_prices.len(),
            "pricing run complete"
        );

        Ok(priced)
    }
}
