//! `<Offers>` document rendering.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use rxprice_core::NewPrice;

use crate::error::ExportError;

const ROOT: &str = "Offers";
const OFFER: &str = "Offer";

/// Writes `rows` as an `<Offers>` document, one empty `<Offer>` element per
/// row, and returns the underlying writer.
///
/// Prices are written with two decimals; quantity as-is.
///
/// # Errors
///
/// Returns [`ExportError::Xml`] if the underlying writer fails.
pub fn write_offers<W: Write>(inner: W, rows: &[NewPrice]) -> Result<W, ExportError> {
    let mut writer = Writer::new_with_indent(inner, b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new(ROOT)))
        .map_err(xml_err)?;

    for row in rows {
        let price = format!("{:.2}", row.price);
        let reserve = format!("{:.2}", row.reserve_price);
        let quantity = row.quantity.to_string();
        let offer = BytesStart::new(OFFER).with_attributes([
            ("Code", row.code.as_str()),
            ("Name", row.name.as_str()),
            ("Producer", row.producer.as_str()),
            ("Price", price.as_str()),
            ("PriceReserve", reserve.as_str()),
            ("Quantity", quantity.as_str()),
        ]);
        writer.write_event(Event::Empty(offer)).map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(ROOT)))
        .map_err(xml_err)?;
    Ok(writer.into_inner())
}

fn xml_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::Xml(e.to_string())
}

#[cfg(test)]
mod tests {
    use rxprice_core::PriceOrigin;

    use super::*;

    fn row(code: &str, name: &str) -> NewPrice {
        NewPrice {
            code: code.to_string(),
            name: name.to_string(),
            producer: "Farmak".to_string(),
            price: 80.5,
            reserve_price: 69.65,
            quantity: 12.0,
            origin: PriceOrigin::Market,
        }
    }

    fn render(rows: &[NewPrice]) -> String {
        let bytes = write_offers(Vec::new(), rows).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn renders_declaration_and_root() {
        let xml = render(&[]);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<Offers>"));
        assert!(xml.trim_end().ends_with("</Offers>"));
    }

    #[test]
    fn renders_one_offer_per_row() {
        let xml = render(&[row("C-1", "Aspirin"), row("C-2", "Ibuprofen")]);
        assert_eq!(xml.matches("<Offer ").count(), 2);
        assert!(xml.contains(r#"Code="C-1""#));
        assert!(xml.contains(r#"Price="80.50""#));
        assert!(xml.contains(r#"PriceReserve="69.65""#));
        assert!(xml.contains(r#"Quantity="12""#));
    }

    #[test]
    fn escapes_attribute_values() {
        let xml = render(&[row("C-1", r#"Drops "Kids" & Co <10ml>"#)]);
        assert!(xml.contains("&quot;Kids&quot;"));
        assert!(xml.contains("&amp; Co"));
        assert!(xml.contains("&lt;10ml&gt;"));
    }
}
