//! Conversion from catalog wire records to [`rxprice_core`] domain types.

use chrono::{DateTime, NaiveDateTime};
use rxprice_core::{CompetitorPrice, Outlet, PriceSnapshot, PricingTask};
use uuid::Uuid;

use crate::error::ClientError;
use crate::types::{BranchRecord, CompetitorRecord, PriceRecord, TaskRecord, WireValue};

/// Branch coordinates are stored as degrees multiplied by this factor.
pub const COORDINATE_SCALE: f64 = 100_000_000.0;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S",
];

/// Normalizes a branch row into an [`Outlet`].
///
/// # Errors
///
/// Returns [`ClientError::Normalization`] if a coordinate, the enterprise
/// code or the serial number is not numeric.
pub fn normalize_outlet(record: BranchRecord) -> Result<Outlet, ClientError> {
    let id = record.id_branch.trim().to_uppercase();
    let field = |name: &str, reason: String| ClientError::Normalization {
        record: format!("branch {id} {name}"),
        reason,
    };

    let latitude = parse_decimal(&record.lat).map_err(|r| field("Lat", r))? / COORDINATE_SCALE;
    let longitude = parse_decimal(&record.lng).map_err(|r| field("Lng", r))? / COORDINATE_SCALE;
    let enterprise_code = parse_integer(&record.code).map_err(|r| field("Code", r))?;
    let serial_number =
        parse_integer(&record.serial_number).map_err(|r| field("SerialNumber", r))?;

    Ok(Outlet {
        enterprise_id: record.id_enterprise.trim().to_string(),
        id,
        latitude,
        longitude,
        enterprise_code,
        serial_number,
    })
}

/// Normalizes one catalog row of the subject outlet.
///
/// An item id that is not a UUID leaves the row unlinked, so it passes
/// through pricing with its reserve price untouched.
///
/// # Errors
///
/// Returns [`ClientError::Normalization`] if a price or the quantity is not
/// numeric.
pub fn normalize_price_row(record: PriceRecord) -> Result<PriceSnapshot, ClientError> {
    let field = |name: &str, reason: String| ClientError::Normalization {
        record: format!("price row {} {name}", record.outer_code),
        reason,
    };

    let base_price = parse_decimal(&record.price).map_err(|r| field("Price", r))?;
    let reserve_price = parse_decimal(&record.price_reserve).map_err(|r| field("PriceReserve", r))?;
    let quantity = parse_decimal(&record.quantity).map_err(|r| field("Quantity", r))?;

    let item_id = record.id_goods.as_deref().and_then(|raw| {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let parsed = Uuid::parse_str(raw).ok();
        if parsed.is_none() {
            tracing::warn!(
                outer_code = %record.outer_code,
                item_id = %raw,
                "unparseable item id; row left unlinked"
            );
        }
        parsed
    });

    let effective_at = record.date_time.as_deref().and_then(parse_timestamp);

    Ok(PriceSnapshot {
        item_id,
        outer_code: record.outer_code,
        name: record.name,
        producer: record.producer,
        base_price,
        reserve_price,
        quantity,
        effective_at,
    })
}

/// Normalizes one competitor price, tagging it with `outlet_id`.
///
/// Returns `Ok(None)` for rows without a usable item id; such rows can never
/// match a catalog item. A missing reserve price defaults to the price.
///
/// # Errors
///
/// Returns [`ClientError::Normalization`] if a price is not numeric.
pub fn normalize_competitor_price(
    record: CompetitorRecord,
    outlet_id: &str,
) -> Result<Option<CompetitorPrice>, ClientError> {
    let Some(item_id) = record
        .govid
        .as_deref()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
    else {
        return Ok(None);
    };

    let field = |name: &str, reason: String| ClientError::Normalization {
        record: format!("competitor {outlet_id} item {item_id} {name}"),
        reason,
    };

    let price = parse_decimal(&record.price).map_err(|r| field("price", r))?;
    let reserve_price = match record.price_reserve.as_ref() {
        Some(value) => parse_decimal(value).map_err(|r| field("priceReserve", r))?,
        None => price,
    };

    Ok(Some(CompetitorPrice {
        item_id,
        outlet_id: outlet_id.to_string(),
        price,
        reserve_price,
    }))
}

/// Normalizes a queue entry. Unparseable codes become `None` so the runner
/// can skip the task instead of failing the whole queue.
#[must_use]
pub fn normalize_task(record: TaskRecord) -> PricingTask {
    PricingTask {
        outlet_id: record.id_branch.trim().to_uppercase(),
        enterprise_code: record.code.as_ref().and_then(|v| parse_integer(v).ok()),
        serial_number: record
            .serial_number
            .as_ref()
            .and_then(|v| parse_integer(v).ok()),
        queued_at: record.date_time.as_deref().and_then(parse_timestamp),
    }
}

/// Parses a decimal that may use a comma as the decimal separator.
pub(crate) fn parse_decimal(value: &WireValue) -> Result<f64, String> {
    let parsed = match value {
        WireValue::Number(n) => *n,
        WireValue::Text(text) => {
            let cleaned = text.trim().replace(',', ".");
            cleaned
                .parse::<f64>()
                .map_err(|e| format!("\"{text}\" is not a number: {e}"))?
        }
    };
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(format!("{parsed} is not finite"))
    }
}

/// Parses a whole number sent as a JSON number or a numeric string.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn parse_integer(value: &WireValue) -> Result<i64, String> {
    match value {
        WireValue::Number(n) if n.is_finite() && n.fract().abs() < f64::EPSILON => Ok(*n as i64),
        WireValue::Number(n) => Err(format!("{n} is not a whole number")),
        WireValue::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("\"{text}\" is not an integer: {e}")),
    }
}

/// Parses the API's timestamp formats. Offsets are dropped after converting
/// to UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
