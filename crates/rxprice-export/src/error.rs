use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML write error: {0}")]
    Xml(String),

    /// The original price list was empty; nothing is written.
    #[error("refusing to export an empty price list")]
    Empty,
}
