use crate::gate::evaluate_rules::Finding;
use crate::policy::types::StagePolicy;
use crate::rules::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered `PASS < WARN < BLOCK`.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GateOutcome {
    PASS,
    WARN,
    BLOCK,
}

impl GateOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            GateOutcome::PASS => "PASS",
            GateOutcome::WARN => "WARN",
            GateOutcome::BLOCK => "BLOCK",
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            GateOutcome::BLOCK => 1,
            GateOutcome::PASS | GateOutcome::WARN => 0,
        }
    }
}

impl fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateDecision {
    pub outcome: GateOutcome,
    pub blocking: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl GateDecision {
    /// Effective-severity counts over blocking and warning findings.
    pub fn severity_counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for f in self.blocking.iter().chain(self.warnings.iter()) {
            *counts.entry(f.effective_severity).or_insert(0) += 1;
        }
        counts
    }
}

pub fn evaluate_gate(findings: &[Finding], policy: &StagePolicy) -> GateDecision {
    let mut blocking = Vec::new();
    let mut warnings = Vec::new();
    for f in findings {
        if f.effective_severity.is_at_least(policy.block_on_or_above()) {
            blocking.push(f.clone());
        } else if f.effective_severity.is_at_least(policy.warn_on_or_above()) {
            warnings.push(f.clone());
        }
    }
    let outcome = if !blocking.is_empty() {
        GateOutcome::BLOCK
    } else if !warnings.is_empty() {
        GateOutcome::WARN
    } else {
        GateOutcome::PASS
    };
    GateDecision {
        outcome,
        blocking,
        warnings,
    }
}
