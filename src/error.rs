use thiserror::Error;

/// Errors the aggregation core can surface to a caller.
///
/// Malformed or missing stored records are deliberately *not* represented
/// here; sparse historical data is the common case and decodes to zero
/// (see `record`). Storage I/O failures travel through `anyhow` unchanged.
#[derive(Error, Debug)]
pub enum FaretabError {
    /// Width value outside the recognized size-class vocabulary.
    /// Fatal to the request; no partial result is produced.
    #[error("unrecognized display width: {0:?}")]
    InvalidWindowWidth(String),

    /// Currency code outside the recognized set. Blocks only symbol
    /// lookup, never the numeric aggregation. There is no silent
    /// fallback here; callers may print the raw code instead.
    #[error("unknown currency code: {0:?}")]
    UnknownCurrency(String),
}

pub type Result<T> = std::result::Result<T, FaretabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offending_value() {
        let err = FaretabError::InvalidWindowWidth("wide".into());
        assert!(err.to_string().contains("wide"));

        let err = FaretabError::UnknownCurrency("XXX".into());
        assert!(err.to_string().contains("XXX"));
    }
}
