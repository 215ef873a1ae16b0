//! Great-circle distances between outlets.
//!
//! The matrix is computed as one all-pairs batch: each unordered pair is
//! evaluated exactly once and mirrored, so the result is symmetric by
//! construction and the diagonal is zero. Distances are truncated to whole
//! meters. Swapping the arguments of [`distance_between`] may change the
//! haversine result in its last bits; that is accepted and does not show at
//! meter resolution in practice.

use std::collections::HashMap;

use rayon::prelude::*;
use rxprice_core::Outlet;

use crate::error::PricingError;

/// Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_M: f64 = 6_373_000.0;

/// Square, symmetric table of integer meter distances keyed by outlet id.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    cells: Vec<u32>,
    excluded: Vec<String>,
}

impl DistanceMatrix {
    /// Computes all pairwise distances for `outlets`.
    ///
    /// Rows are evaluated in parallel; only the upper triangle is computed.
    /// Outlets whose latitude or longitude is non-finite or outside the valid
    /// degree range are left out of the matrix and listed in
    /// [`Self::excluded`]; no distance is ever reported for them.
    #[must_use]
    pub fn build(outlets: &[Outlet]) -> Self {
        let (outlets, excluded): (Vec<&Outlet>, Vec<&Outlet>) = outlets
            .iter()
            .partition(|o| valid_coordinates(o.latitude, o.longitude));
        for bad in &excluded {
            tracing::warn!(
                outlet_id = %bad.id,
                latitude = bad.latitude,
                longitude = bad.longitude,
                "outlet has invalid coordinates; excluded from distance matrix"
            );
        }
        let excluded = excluded.into_iter().map(|o| o.id.clone()).collect();

        let n = outlets.len();
        let radians: Vec<(f64, f64)> = outlets
            .iter()
            .map(|o| (o.latitude.to_radians(), o.longitude.to_radians()))
            .collect();

        let upper: Vec<Vec<u32>> = (0..n)
            .into_par_iter()
            .map(|i| {
                ((i + 1)..n)
                    .map(|j| haversine_m(radians[i], radians[j]))
                    .collect()
            })
            .collect();

        let mut cells = vec![0u32; n * n];
        for (i, row) in upper.into_iter().enumerate() {
            for (offset, meters) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                cells[i * n + j] = meters;
                cells[j * n + i] = meters;
            }
        }

        let ids: Vec<String> = outlets.iter().map(|o| o.id.clone()).collect();
        let index = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        Self {
            ids,
            index,
            cells,
            excluded,
        }
    }

    /// Ids of outlets left out because of invalid coordinates.
    #[must_use]
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Outlet ids in row order.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Distance in meters between two outlets, if both are in the matrix.
    #[must_use]
    pub fn distance(&self, from: &str, to: &str) -> Option<u32> {
        let i = *self.index.get(from)?;
        let j = *self.index.get(to)?;
        Some(self.cells[i * self.ids.len() + j])
    }

    /// All distances from `id`, aligned with [`Self::ids`].
    #[must_use]
    pub fn row(&self, id: &str) -> Option<&[u32]> {
        let n = self.ids.len();
        let i = *self.index.get(id)?;
        Some(&self.cells[i * n..(i + 1) * n])
    }
}

/// Distance in whole meters between two points given in degrees.
#[must_use]
pub fn distance_between(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> u32 {
    haversine_m(
        (lat1.to_radians(), lng1.to_radians()),
        (lat2.to_radians(), lng2.to_radians()),
    )
}

/// Rejects an outlet whose coordinates cannot be placed on the globe.
///
/// # Errors
///
/// Returns [`PricingError::Geometry`] if the latitude or longitude is
/// non-finite or outside the valid degree range.
pub fn check_coordinates(outlet: &Outlet) -> Result<(), PricingError> {
    if valid_coordinates(outlet.latitude, outlet.longitude) {
        return Ok(());
    }
    Err(PricingError::Geometry {
        outlet_id: outlet.id.clone(),
        latitude: outlet.latitude,
        longitude: outlet.longitude,
    })
}

fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// Haversine distance between two `(lat, lng)` points in radians, truncated
/// to whole meters.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn haversine_m(a: (f64, f64), b: (f64, f64)) -> u32 {
    let dlat = b.0 - a.0;
    let dlng = b.1 - a.1;
    let h = (dlat / 2.0).sin().powi(2) + a.0.cos() * b.0.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    (EARTH_RADIUS_M * c) as u32
}
