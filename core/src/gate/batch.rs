use crate::gate::decision::{evaluate_gate, GateDecision};
use crate::gate::evaluate_rules::evaluate_rules;
use crate::gate::fact::Fact;
use crate::policy::types::StagePolicy;
use crate::rules::catalog::RuleCatalog;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBatch {
    pub file_path: String,
    pub facts: Vec<Fact>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileDecision {
    pub file_path: String,
    pub decision: GateDecision,
}

/// Splits facts by `file_path`, ordering batches by first appearance.
pub fn group_by_file(facts: &[Fact]) -> Vec<FileBatch> {
    let mut batches: Vec<FileBatch> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();
    for fact in facts {
        let pos = *slot.entry(fact.file_path.as_str()).or_insert_with(|| {
            batches.push(FileBatch {
                file_path: fact.file_path.clone(),
                facts: Vec::new(),
            });
            batches.len() - 1
        });
        batches[pos].facts.push(fact.clone());
    }
    batches
}

/// Evaluates every batch on the rayon pool. Output order matches `batches`.
pub fn evaluate_batches(
    stage_catalog: &RuleCatalog,
    policy: &StagePolicy,
    batches: &[FileBatch],
) -> Vec<FileDecision> {
    batches
        .par_iter()
        .map(|batch| FileDecision {
            file_path: batch.file_path.clone(),
            decision: evaluate_gate(&evaluate_rules(stage_catalog, &batch.facts), policy),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::severity::Severity;

    #[test]
    fn grouping_keeps_first_appearance_order() {
        let facts = vec![
            Fact::heuristic("a.x", Severity::WARN).in_file("b.ts"),
            Fact::heuristic("a.y", Severity::WARN).in_file("a.ts"),
            Fact::heuristic("a.z", Severity::INFO).in_file("b.ts"),
        ];
        let batches = group_by_file(&facts);
        let paths: Vec<&str> = batches.iter().map(|b| b.file_path.as_str()).collect();
        assert_eq!(paths, vec!["b.ts", "a.ts"]);
        assert_eq!(batches[0].facts.len(), 2);
        assert_eq!(batches[0].facts[1].rule_id, "a.z");
    }
}
