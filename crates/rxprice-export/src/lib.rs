//! Export of repriced catalog rows as gzip-compressed XML offers.

pub mod archive;
pub mod error;
pub mod xml;

pub use archive::{export_prices, run_stamp, ExportTarget};
pub use error::ExportError;
pub use xml::write_offers;
