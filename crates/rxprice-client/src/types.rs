//! Catalog API wire types.
//!
//! Field names follow the JSON exactly. Numeric fields arrive either as
//! JSON numbers or as strings (sometimes with a comma decimal separator),
//! so they are captured as [`WireValue`] and parsed in [`crate::normalize`].

use serde::{Deserialize, Serialize};

/// A scalar that may be sent as a number or as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    Number(f64),
    Text(String),
}

// ---------------------------------------------------------------------------
// branches
// ---------------------------------------------------------------------------

/// One row of the branches endpoint.
///
/// `Lat` and `Lng` are degrees scaled by 1e8.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchRecord {
    #[serde(rename = "ID_Branch")]
    pub id_branch: String,
    #[serde(rename = "ID_Enterprise")]
    pub id_enterprise: String,
    #[serde(rename = "Lat")]
    pub lat: WireValue,
    #[serde(rename = "Lng")]
    pub lng: WireValue,
    #[serde(rename = "Code")]
    pub code: WireValue,
    #[serde(rename = "SerialNumber")]
    pub serial_number: WireValue,
}

// ---------------------------------------------------------------------------
// prices (subject outlet)
// ---------------------------------------------------------------------------

/// One catalog row of the outlet being repriced.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceRecord {
    #[serde(rename = "ID_Goods", default)]
    pub id_goods: Option<String>,
    #[serde(rename = "OuterCode", default)]
    pub outer_code: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Producer", default)]
    pub producer: String,
    #[serde(rename = "Price")]
    pub price: WireValue,
    #[serde(rename = "PriceReserve")]
    pub price_reserve: WireValue,
    #[serde(rename = "Quantity")]
    pub quantity: WireValue,
    #[serde(rename = "DateTime", default)]
    pub date_time: Option<String>,
}

// ---------------------------------------------------------------------------
// competitor prices (by serial number)
// ---------------------------------------------------------------------------

/// One published price of a competitor outlet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorRecord {
    #[serde(default)]
    pub govcode: Option<WireValue>,
    /// Catalog item id.
    #[serde(default)]
    pub govid: Option<String>,
    #[serde(default)]
    pub innercode: Option<WireValue>,
    pub price: WireValue,
    #[serde(default)]
    pub price_reserve: Option<WireValue>,
}

// ---------------------------------------------------------------------------
// task queue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "ID_Branch")]
    pub id_branch: String,
    #[serde(rename = "Code", default)]
    pub code: Option<WireValue>,
    #[serde(rename = "SerialNumber", default)]
    pub serial_number: Option<WireValue>,
    #[serde(rename = "DateTime", default)]
    pub date_time: Option<String>,
}

/// Body of the task deletion request: `{"Items": [{"ID_Branch": ...}]}`.
#[derive(Debug, Serialize)]
pub struct DeleteTasksRequest<'a> {
    #[serde(rename = "Items")]
    pub items: Vec<DeleteTaskItem<'a>>,
}

#[derive(Debug, Serialize)]
pub struct DeleteTaskItem<'a> {
    #[serde(rename = "ID_Branch")]
    pub id_branch: &'a str,
}

/// Status envelope returned by the task deletion endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}
