use thiserror::Error;

/// A quote could not be obtained.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("price request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The source answered with a non-success status.
    #[error("price source returned status {status} for {asset}")]
    Status { asset: String, status: u16 },

    /// The response has no entry for the asset.
    #[error("price source has no quote for {0}")]
    MissingAsset(String),

    /// The response body is not the expected shape.
    #[error("malformed price response: {0}")]
    Malformed(String),

    /// The quote cannot be represented as a fixed-point price.
    #[error("unusable quote {quote} for {asset}")]
    InvalidQuote { asset: String, quote: f64 },

    /// The configured base URL cannot be used.
    #[error("invalid price source url: {0}")]
    InvalidUrl(String),
}
