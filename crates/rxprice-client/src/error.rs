use thiserror::Error;

/// Errors returned by the catalog API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid endpoint URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    /// The API answered 2xx but reported `"Status": "Error"` in the body.
    #[error("catalog API error: {0}")]
    Api(String),

    #[error("normalization error for {record}: {reason}")]
    Normalization { record: String, reason: String },
}
