//! Distance-banded competitor selection.
//!
//! Competitors are outlets of a different enterprise than the subject whose
//! matrix distance from the subject falls in a half-open band `[min, max)`.
//! Nothing here computes geometry; membership is read from the
//! [`DistanceMatrix`] built for the run.

use std::collections::{BTreeSet, HashMap};

use rayon::prelude::*;
use rxprice_core::Outlet;

use crate::geo::DistanceMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceBand {
    /// Inclusive lower bound in meters.
    pub min: u32,
    /// Exclusive upper bound in meters.
    pub max: u32,
}

impl DistanceBand {
    #[must_use]
    pub fn contains(&self, meters: u32) -> bool {
        meters >= self.min && meters < self.max
    }
}

/// Consecutive bands `[0, d1), [d1, d2), …` from ascending distance bounds.
///
/// Bounds are truncated to whole meters to line up with the integer matrix.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn distance_bands(bounds: &[f64]) -> Vec<DistanceBand> {
    let mut min = 0u32;
    bounds
        .iter()
        .map(|bound| {
            let max = *bound as u32;
            let band = DistanceBand { min, max };
            min = max;
            band
        })
        .collect()
}

/// Ids of the outlets competing with `subject_id` inside `band`.
///
/// Returns an empty set when the subject is missing from either the outlet
/// set or the matrix.
#[must_use]
pub fn select_competitors(
    subject_id: &str,
    outlets: &[Outlet],
    matrix: &DistanceMatrix,
    band: DistanceBand,
) -> BTreeSet<String> {
    let Some(subject) = outlets.iter().find(|o| o.id == subject_id) else {
        return BTreeSet::new();
    };
    if !matrix.contains(subject_id) {
        return BTreeSet::new();
    }

    outlets
        .iter()
        .filter(|o| o.id != subject.id && o.enterprise_id != subject.enterprise_id)
        .filter(|o| {
            matrix
                .distance(subject_id, &o.id)
                .is_some_and(|meters| band.contains(meters))
        })
        .map(|o| o.id.clone())
        .collect()
}

/// Competitor sets for every configured band, computed once per run.
#[derive(Debug, Clone)]
pub struct CompetitorBands {
    bands: Vec<DistanceBand>,
    members: Vec<BTreeSet<String>>,
    band_of: HashMap<String, usize>,
}

impl CompetitorBands {
    /// Evaluates [`select_competitors`] for each band.
    ///
    /// Bands never overlap, so every competitor belongs to exactly one band.
    #[must_use]
    pub fn build(
        subject_id: &str,
        outlets: &[Outlet],
        matrix: &DistanceMatrix,
        bands: Vec<DistanceBand>,
    ) -> Self {
        let members: Vec<BTreeSet<String>> = bands
            .par_iter()
            .map(|band| select_competitors(subject_id, outlets, matrix, *band))
            .collect();

        let band_of = members
            .iter()
            .enumerate()
            .flat_map(|(band, ids)| ids.iter().map(move |id| (id.clone(), band)))
            .collect();

        Self {
            bands,
            members,
            band_of,
        }
    }

    #[must_use]
    pub fn bands(&self) -> &[DistanceBand] {
        &self.bands
    }

    /// Competitor ids inside band `index`.
    #[must_use]
    pub fn members(&self, index: usize) -> Option<&BTreeSet<String>> {
        self.members.get(index)
    }

    /// The band a competitor outlet falls into, if it competes at all.
    #[must_use]
    pub fn band_of(&self, outlet_id: &str) -> Option<usize> {
        self.band_of.get(outlet_id).copied()
    }

    /// Every competitor within the farthest band.
    #[must_use]
    pub fn all(&self) -> BTreeSet<&str> {
        self.band_of.keys().map(String::as_str).collect()
    }

    /// Total number of competitors across all bands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.band_of.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.band_of.is_empty()
    }
}
