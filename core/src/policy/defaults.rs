use crate::determinism::json_canonical::to_canonical_bytes;
use crate::error::CoreResult;
use crate::policy::types::{Stage, StagePolicy};
use crate::rules::severity::Severity;

// PRE_COMMIT only surfaces promoted rules as warnings; CRITICAL still blocks.
const PRE_COMMIT_DEFAULT: StagePolicy =
    StagePolicy::new_const(Stage::PRE_COMMIT, Severity::CRITICAL, Severity::ERROR);
const PRE_PUSH_DEFAULT: StagePolicy =
    StagePolicy::new_const(Stage::PRE_PUSH, Severity::ERROR, Severity::WARN);
const CI_DEFAULT: StagePolicy = StagePolicy::new_const(Stage::CI, Severity::ERROR, Severity::WARN);

pub fn default_policy_for(stage: Stage) -> StagePolicy {
    match stage {
        Stage::PRE_COMMIT => PRE_COMMIT_DEFAULT,
        Stage::PRE_PUSH => PRE_PUSH_DEFAULT,
        Stage::CI => CI_DEFAULT,
    }
}

pub fn default_policy_bytes(stage: Stage) -> CoreResult<Vec<u8>> {
    to_canonical_bytes(&default_policy_for(stage))
}

pub fn default_bundle_id(stage: Stage) -> String {
    format!("gate-policy.default.{}", stage)
}
