use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Item identifier marking a catalog row with no link to a catalog item.
pub const NO_CATALOG_LINK: Uuid = Uuid::nil();

/// Item identifier marking a catalog row that deliberately needs no link.
pub const LINK_NOT_REQUIRED: Uuid = Uuid::from_u128(0x5000_0000_0000_0000_0000_0000_0000_0000);

/// A retail outlet (pharmacy branch) with its location and owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlet {
    /// Upper-cased branch identifier.
    pub id: String,
    pub enterprise_id: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    pub enterprise_code: i64,
    pub serial_number: i64,
}

/// One catalog row of the outlet being repriced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// `None` when the catalog row carries no item identifier at all.
    pub item_id: Option<Uuid>,
    /// The outlet's own code for the item, echoed back on export.
    pub outer_code: String,
    pub name: String,
    pub producer: String,
    pub base_price: f64,
    pub reserve_price: f64,
    pub quantity: f64,
    pub effective_at: Option<NaiveDateTime>,
}

impl PriceSnapshot {
    /// Returns the catalog item this row is linked to, or `None` for rows
    /// without an identifier or carrying one of the sentinel identifiers.
    #[must_use]
    pub fn linked_item(&self) -> Option<Uuid> {
        self.item_id
            .filter(|id| *id != NO_CATALOG_LINK && *id != LINK_NOT_REQUIRED)
    }
}

/// A competitor outlet's published price for one catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorPrice {
    pub item_id: Uuid,
    pub outlet_id: String,
    pub price: f64,
    pub reserve_price: f64,
}

/// How a [`NewPrice`] was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceOrigin {
    /// Sentinel or missing item id; the reserve price passed through untouched.
    Sentinel,
    /// No competitor in any band priced the item; bounded by the base price.
    NoCompetitors,
    /// At least one band produced a market-driven candidate.
    Market,
}

/// The repriced row handed to the exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrice {
    pub code: String,
    pub name: String,
    pub producer: String,
    /// Listed base price, unchanged.
    pub price: f64,
    /// Newly computed reserve price.
    pub reserve_price: f64,
    pub quantity: f64,
    pub origin: PriceOrigin,
}

/// An outlet waiting in the remote repricing queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTask {
    pub outlet_id: String,
    pub enterprise_code: Option<i64>,
    pub serial_number: Option<i64>,
    pub queued_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(item_id: Option<Uuid>) -> PriceSnapshot {
        PriceSnapshot {
            item_id,
            outer_code: "A-1".to_string(),
            name: "Aspirin 500mg".to_string(),
            producer: "Bayer".to_string(),
            base_price: 80.0,
            reserve_price: 60.0,
            quantity: 3.0,
            effective_at: None,
        }
    }

    #[test]
    fn sentinel_ids_are_not_linked() {
        assert_eq!(snapshot(Some(NO_CATALOG_LINK)).linked_item(), None);
        assert_eq!(snapshot(Some(LINK_NOT_REQUIRED)).linked_item(), None);
        assert_eq!(snapshot(None).linked_item(), None);
    }

    #[test]
    fn link_not_required_matches_wire_form() {
        let parsed = Uuid::parse_str("50000000-0000-0000-0000-000000000000").unwrap();
        assert_eq!(parsed, LINK_NOT_REQUIRED);
    }

    #[test]
    fn real_item_is_linked() {
        let id = Uuid::parse_str("8d3c5a0e-3f7b-4f43-9d0a-2b1f4c7e9a11").unwrap();
        assert_eq!(snapshot(Some(id)).linked_item(), Some(id));
    }

    #[test]
    fn price_origin_serializes_snake_case() {
        let json = serde_json::to_string(&PriceOrigin::NoCompetitors).unwrap();
        assert_eq!(json, "\"no_competitors\"");
    }
}
