use thiserror::Error;

/// Invalid connection configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URL is empty or does not start with `http://` / `https://`.
    #[error("invalid base url: {0:?}")]
    BaseUrl(String),

    /// A numeric option could not be parsed.
    #[error("invalid value for {flag}: {value:?}")]
    Number { flag: &'static str, value: String },
}
