//! Structured upstream URL construction.

use url::Url;

/// Error type for building upstream URLs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Builds an upstream URL from a configured base and named parameters.
///
/// All percent-encoding happens here. Query parameters already present on
/// the base URL are kept, and new ones are appended in call order.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    url: Url,
}

impl QueryBuilder {
    /// Start from a base endpoint such as `https://apihub.kma.go.kr/.../getVilageFcst`.
    ///
    /// The base is trimmed, must be `http` or `https`, and loses any fragment.
    pub fn new(base: &str) -> Result<Self, QueryError> {
        let trimmed = base.trim();

        if trimmed.is_empty() {
            return Err(QueryError::Empty);
        }

        let mut url = Url::parse(trimmed).map_err(|e| QueryError::InvalidUrl(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(QueryError::UnsupportedScheme(scheme.to_string())),
        }

        url.set_fragment(None);

        Ok(Self { url })
    }

    /// Append `name=value`.
    pub fn param(mut self, name: &str, value: impl AsRef<str>) -> Self {
        self.url.query_pairs_mut().append_pair(name, value.as_ref());
        self
    }

    /// Append every pair in order.
    pub fn params<'a, I>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs.into_iter().fold(self, |builder, (name, value)| builder.param(name, value))
    }

    pub fn build(self) -> Url {
        self.url
    }
}

/// Undo one level of percent-encoding on a credential.
///
/// Portal service keys are usually distributed already encoded; appending
/// them through [`QueryBuilder`] as-is would encode them twice. Keys without
/// escapes, or with malformed ones, are returned unchanged.
pub fn decode_credential(key: &str) -> String {
    if !key.contains('%') {
        return key.to_string();
    }

    match urlencoding::decode(key) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => key.to_string(),
    }
}
