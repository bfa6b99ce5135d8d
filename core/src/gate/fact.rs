use crate::rules::severity::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FactKind {
    #[default]
    Heuristic,
}

/// A raw scanner detection. Only `ruleId` and `severity` are required on the
/// wire; the rest is carried through to findings untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    #[serde(default)]
    pub kind: FactKind,
    pub rule_id: String,
    pub severity: Severity,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub file_path: String,
}

impl Fact {
    pub fn heuristic(rule_id: impl Into<String>, severity: Severity) -> Self {
        let rule_id = rule_id.into();
        Self {
            kind: FactKind::Heuristic,
            code: rule_id.clone(),
            rule_id,
            severity,
            message: String::new(),
            file_path: String::new(),
        }
    }

    pub fn in_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = file_path.into();
        self
    }
}
