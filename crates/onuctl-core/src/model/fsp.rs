// ── Frame/slot/port path ──

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::CoreError;

/// A validated `frame/slot/port` path such as `0/1/2`.
///
/// Holds at least three non-empty `/`-delimited segments. The first two form
/// the registration `interface`, the third is the `port`. Extra trailing
/// segments are carried in the raw form but do not affect either.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fsp {
    segments: Vec<String>,
}

impl Fsp {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let segments: Vec<String> = raw.trim().split('/').map(str::to_owned).collect();

        if segments.len() < 3 {
            return Err(CoreError::validation(format!(
                "FSP '{raw}' must have the form frame/slot/port"
            )));
        }
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(CoreError::validation(format!(
                "FSP '{raw}' has an empty segment"
            )));
        }

        Ok(Self { segments })
    }

    /// `frame/slot`, e.g. `0/1` for `0/1/2`.
    pub fn interface(&self) -> String {
        self.segments[..2].join("/")
    }

    /// Port segment, e.g. `2` for `0/1/2`.
    pub fn port(&self) -> &str {
        &self.segments[2]
    }
}

impl fmt::Display for Fsp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for Fsp {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Fsp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
