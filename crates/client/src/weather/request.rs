//! Forecast request types and parameter normalization.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use wxgate_core::{CacheKey, Error};

/// Default row count for short-range forecasts; enough for a full 3-day grid.
pub const DEFAULT_NUM_OF_ROWS: &str = "1500";

/// Upper bound accepted for `numOfRows`.
const MAX_NUM_OF_ROWS: u32 = 10_000;

/// Forecast product, doubling as the cache namespace tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastKind {
    #[serde(rename = "short")]
    Short,
    #[serde(rename = "mid-ta")]
    MidTa,
    #[serde(rename = "mid-land")]
    MidLand,
}

impl ForecastKind {
    pub fn tag(self) -> &'static str {
        match self {
            ForecastKind::Short => "short",
            ForecastKind::MidTa => "mid-ta",
            ForecastKind::MidLand => "mid-land",
        }
    }

    /// Human label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            ForecastKind::Short => "short-range forecast",
            ForecastKind::MidTa => "mid-range temperature forecast",
            ForecastKind::MidLand => "mid-range land forecast",
        }
    }

    fn required(self) -> &'static [&'static str] {
        match self {
            ForecastKind::Short => &["baseDate", "baseTime", "nx", "ny"],
            ForecastKind::MidTa | ForecastKind::MidLand => &["regId", "tmFc"],
        }
    }
}

impl fmt::Display for ForecastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ForecastKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(ForecastKind::Short),
            "mid-ta" => Ok(ForecastKind::MidTa),
            "mid-land" => Ok(ForecastKind::MidLand),
            other => Err(Error::InvalidInput(format!("unknown forecast type: {other}"))),
        }
    }
}

/// A validated forecast query with only the parameters its kind uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    kind: ForecastKind,
    params: BTreeMap<String, String>,
}

impl ForecastRequest {
    /// Pick and check the parameters `kind` needs from inbound pairs.
    ///
    /// Unknown names are dropped so they cannot split the cache. Short-range
    /// requests default `numOfRows` to 1500.
    pub fn from_params<I, K, V>(kind: ForecastKind, params: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let inbound: BTreeMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().trim().to_string()))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        let mut selected = BTreeMap::new();
        let mut missing = Vec::new();

        for name in kind.required() {
            match inbound.get(*name) {
                Some(value) => {
                    selected.insert((*name).to_string(), value.clone());
                }
                None => missing.push(*name),
            }
        }

        if !missing.is_empty() {
            return Err(Error::InvalidInput(format!("missing required parameters: {}", missing.join(", "))));
        }

        if kind == ForecastKind::Short {
            let rows = inbound.get("numOfRows").map(String::as_str).unwrap_or(DEFAULT_NUM_OF_ROWS);
            match rows.parse::<u32>() {
                Ok(n) if (1..=MAX_NUM_OF_ROWS).contains(&n) => {
                    selected.insert("numOfRows".to_string(), n.to_string());
                }
                _ => {
                    return Err(Error::InvalidInput(format!(
                        "numOfRows must be an integer between 1 and {MAX_NUM_OF_ROWS}"
                    )));
                }
            }
        }

        Ok(Self { kind, params: selected })
    }

    /// Like [`ForecastRequest::from_params`] but from a JSON object.
    ///
    /// Strings, numbers and booleans are accepted as values; anything else is
    /// ignored.
    pub fn from_json(kind: ForecastKind, params: &serde_json::Map<String, Value>) -> Result<Self, Error> {
        let pairs = params.iter().filter_map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((k.clone(), value))
        });
        Self::from_params(kind, pairs)
    }

    pub fn kind(&self) -> ForecastKind {
        self.kind
    }

    /// Look up a normalized parameter.
    pub fn get(&self, name: &str) -> &str {
        self.params.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.kind.tag(), self.params.clone())
    }
}
