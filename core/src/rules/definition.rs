use crate::rules::severity::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Generic,
    Ios,
    Android,
}

/// One catalog rule. `baseline_severity` never changes after construction;
/// `severity` is the current value and differs from the baseline only in
/// catalogs produced by promotion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleDefinition {
    pub id: String,
    pub description: String,
    pub baseline_severity: Severity,
    pub severity: Severity,
    pub platform: Platform,
    pub locked: bool,
    pub code: String,
    pub message: String,
}

impl RuleDefinition {
    pub fn new(id: impl Into<String>, baseline_severity: Severity) -> Self {
        let id = id.into();
        Self {
            code: id.clone(),
            message: String::new(),
            description: String::new(),
            id,
            baseline_severity,
            severity: baseline_severity,
            platform: Platform::Generic,
            locked: false,
        }
    }

    pub fn is_promoted(&self) -> bool {
        self.severity != self.baseline_severity
    }

    /// Copy of this rule with its current severity raised to at least `floor`.
    pub(crate) fn raised_to(&self, floor: Severity) -> Self {
        let mut out = self.clone();
        out.severity = out.severity.max(floor);
        out
    }
}
