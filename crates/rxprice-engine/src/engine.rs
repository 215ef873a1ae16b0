//! Per-item price adjustment.
//!
//! For each catalog row of the subject outlet the engine looks up the
//! cheapest competitor price in every distance band, scales it by the ratio
//! for the item's price segment and that band, and bounds the cheapest
//! candidate between the reserve price and the base price. Rows are
//! independent of one another and are priced in parallel.

use std::collections::HashMap;

use rayon::prelude::*;
use rxprice_core::{CompetitorPrice, NewPrice, PriceOrigin, PriceSnapshot};
use uuid::Uuid;

use crate::competitors::CompetitorBands;
use crate::ratio::RatioTable;

/// Cheapest competitor price per band, per item.
type BandMinimums = HashMap<Uuid, Vec<Option<f64>>>;

pub struct PriceEngine<'a> {
    ratios: &'a RatioTable,
    competitors: &'a CompetitorBands,
}

impl<'a> PriceEngine<'a> {
    #[must_use]
    pub fn new(ratios: &'a RatioTable, competitors: &'a CompetitorBands) -> Self {
        Self {
            ratios,
            competitors,
        }
    }

    /// Prices every snapshot row, preserving input order.
    #[must_use]
    pub fn price_all(
        &self,
        snapshots: &[PriceSnapshot],
        competitor_prices: &[CompetitorPrice],
    ) -> Vec<NewPrice> {
        let current = current_prices(snapshots);
        let minimums = self.band_minimums(competitor_prices);

        snapshots
            .par_iter()
            .map(|row| self.price_row(row, &current, &minimums))
            .collect()
    }

    fn price_row(
        &self,
        row: &PriceSnapshot,
        current: &HashMap<Uuid, (f64, f64)>,
        minimums: &BandMinimums,
    ) -> NewPrice {
        let (reserve_price, origin) = match row.linked_item() {
            None => (row.reserve_price, PriceOrigin::Sentinel),
            Some(item) => {
                let (base, reserve) = current
                    .get(&item)
                    .copied()
                    .unwrap_or((row.base_price, row.reserve_price));
                let bands = minimums.get(&item).map_or(&[][..], Vec::as_slice);
                adjusted_price(self.ratios, bands, base, reserve)
            }
        };

        NewPrice {
            code: row.outer_code.clone(),
            name: row.name.clone(),
            producer: row.producer.clone(),
            price: row.base_price,
            reserve_price,
            quantity: row.quantity,
            origin,
        }
    }

    fn band_minimums(&self, competitor_prices: &[CompetitorPrice]) -> BandMinimums {
        let bands = self.competitors.bands().len();
        let mut minimums = BandMinimums::new();

        for offer in competitor_prices {
            if !offer.price.is_finite() {
                continue;
            }
            let Some(band) = self.competitors.band_of(&offer.outlet_id) else {
                continue;
            };
            let slot = &mut minimums
                .entry(offer.item_id)
                .or_insert_with(|| vec![None; bands])[band];
            *slot = Some(slot.map_or(offer.price, |best| best.min(offer.price)));
        }

        minimums
    }
}

/// Bounded new price for one item.
///
/// `band_minimums[j]` is the cheapest competitor price seen in band `j`, or
/// `None` when no competitor in that band prices the item. Absent bands and
/// bands whose candidate rounds to zero or below contribute nothing. Returns the new reserve price and how it was
/// derived. The result never exceeds `base` and, without candidates, never
/// drops below `reserve`.
#[must_use]
pub fn adjusted_price(
    ratios: &RatioTable,
    band_minimums: &[Option<f64>],
    base: f64,
    reserve: f64,
) -> (f64, PriceOrigin) {
    let base = if base > 0.0 { base } else { reserve };
    let segment = ratios.price_segment(reserve);

    let floor = band_minimums
        .iter()
        .enumerate()
        .filter_map(|(band, best)| {
            let candidate = round_cents((*best)? * ratios.ratio(segment, band)?);
            (candidate > 0.0).then_some(candidate)
        })
        .reduce(f64::min);

    match floor {
        Some(floor) => (base.min(reserve.max(floor)), PriceOrigin::Market),
        None => (base.min(reserve.max(base)), PriceOrigin::NoCompetitors),
    }
}

/// Highest base and reserve price observed for each linked item.
fn current_prices(snapshots: &[PriceSnapshot]) -> HashMap<Uuid, (f64, f64)> {
    let mut current: HashMap<Uuid, (f64, f64)> = HashMap::new();
    for row in snapshots {
        let Some(item) = row.linked_item() else {
            continue;
        };
        current
            .entry(item)
            .and_modify(|(base, reserve)| {
                *base = base.max(row.base_price);
                *reserve = reserve.max(row.reserve_price);
            })
            .or_insert((row.base_price, row.reserve_price));
    }
    current
}

/// Rounds to cents, exact halves to even.
fn round_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
