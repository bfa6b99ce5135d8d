use crate::gate::fact::{Fact, FactKind};
use crate::rules::catalog::RuleCatalog;
use crate::rules::definition::Platform;
use crate::rules::severity::Severity;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A fact re-annotated with the severity the stage catalog assigns to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    #[serde(default)]
    pub kind: FactKind,
    pub rule_id: String,
    pub severity: Severity, // as reported by the scanner
    pub effective_severity: Severity,
    pub code: String,
    pub message: String,
    pub file_path: String,
    // None when the rule is unknown to the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

fn first_non_empty(candidates: &[&str]) -> String {
    candidates
        .iter()
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// One finding per fact, in input order. Rules missing from `stage_catalog`
/// keep the fact's own severity. Empty `code`/`message` on a fact are filled
/// from the matched rule; `code` finally falls back to the rule id.
pub fn evaluate_rules(stage_catalog: &RuleCatalog, facts: &[Fact]) -> Vec<Finding> {
    facts
        .iter()
        .map(|fact| match stage_catalog.get(&fact.rule_id) {
            Some(rule) => Finding {
                kind: fact.kind,
                rule_id: fact.rule_id.clone(),
                severity: fact.severity,
                effective_severity: rule.severity,
                code: first_non_empty(&[&fact.code, &rule.code, &fact.rule_id]),
                message: first_non_empty(&[&fact.message, &rule.message]),
                file_path: fact.file_path.clone(),
                platform: Some(rule.platform),
            },
            None => {
                warn!(
                    rule_id = %fact.rule_id,
                    file_path = %fact.file_path,
                    catalog = stage_catalog.version(),
                    "fact references a rule absent from the catalog"
                );
                Finding {
                    kind: fact.kind,
                    rule_id: fact.rule_id.clone(),
                    severity: fact.severity,
                    effective_severity: fact.severity,
                    code: first_non_empty(&[&fact.code, &fact.rule_id]),
                    message: fact.message.clone(),
                    file_path: fact.file_path.clone(),
                    platform: None,
                }
            }
        })
        .collect()
}
