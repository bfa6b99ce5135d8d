use crate::error::{CoreError, CoreResult};
use crate::rules::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    PRE_COMMIT,
    PRE_PUSH,
    CI,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::PRE_COMMIT, Stage::PRE_PUSH, Stage::CI];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::PRE_COMMIT => "PRE_COMMIT",
            Stage::PRE_PUSH => "PRE_PUSH",
            Stage::CI => "CI",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRE_COMMIT" => Ok(Stage::PRE_COMMIT),
            "PRE_PUSH" => Ok(Stage::PRE_PUSH),
            "CI" => Ok(Stage::CI),
            other => Err(CoreError::InvalidInput(format!("unknown stage: {}", other))),
        }
    }
}

/// Block/warn cut lines for one stage. `block_on_or_above >= warn_on_or_above`
/// holds for every value of this type.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct StagePolicy {
    stage: Stage,
    block_on_or_above: Severity,
    warn_on_or_above: Severity,
}

impl StagePolicy {
    pub fn new(
        stage: Stage,
        block_on_or_above: Severity,
        warn_on_or_above: Severity,
    ) -> CoreResult<Self> {
        if block_on_or_above < warn_on_or_above {
            return Err(CoreError::InvalidPolicyInvariant {
                stage,
                block_on_or_above,
                warn_on_or_above,
            });
        }
        Ok(Self {
            stage,
            block_on_or_above,
            warn_on_or_above,
        })
    }

    /// Compile-time checked constructor for built-in tables.
    pub(crate) const fn new_const(
        stage: Stage,
        block_on_or_above: Severity,
        warn_on_or_above: Severity,
    ) -> Self {
        assert!(block_on_or_above as u8 >= warn_on_or_above as u8);
        Self {
            stage,
            block_on_or_above,
            warn_on_or_above,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn block_on_or_above(&self) -> Severity {
        self.block_on_or_above
    }

    pub fn warn_on_or_above(&self) -> Severity {
        self.warn_on_or_above
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PolicySource {
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "skills.policy")]
    SkillsPolicy,
}

impl PolicySource {
    pub fn as_str(self) -> &'static str {
        match self {
            PolicySource::Default => "default",
            PolicySource::SkillsPolicy => "skills.policy",
        }
    }
}

impl fmt::Display for PolicySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which policy bytes produced a decision.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceTrace {
    pub source: PolicySource,
    pub bundle_id: String,
    pub content_hash: String, // hex 64
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub struct ResolvedPolicy {
    pub policy: StagePolicy,
    pub trace: ProvenanceTrace,
}
