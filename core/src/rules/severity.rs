use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Issue severity. Declaration order is the rank order, so `Ord` gives
/// `INFO < WARN < ERROR < CRITICAL`.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    INFO,
    WARN,
    ERROR,
    CRITICAL,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::INFO,
        Severity::WARN,
        Severity::ERROR,
        Severity::CRITICAL,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::INFO => "INFO",
            Severity::WARN => "WARN",
            Severity::ERROR => "ERROR",
            Severity::CRITICAL => "CRITICAL",
        }
    }

    pub fn is_at_least(self, threshold: Severity) -> bool {
        self >= threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(Severity::INFO),
            "WARN" => Ok(Severity::WARN),
            "ERROR" => Ok(Severity::ERROR),
            "CRITICAL" => Ok(Severity::CRITICAL),
            other => Err(CoreError::InvalidInput(format!(
                "unknown severity: {}",
                other
            ))),
        }
    }
}
