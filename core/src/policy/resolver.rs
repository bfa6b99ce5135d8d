use crate::determinism::digest::canonical_sha256_hex;
use crate::error::{CoreError, CoreResult};
use crate::policy::defaults::{default_bundle_id, default_policy_for};
use crate::policy::skills_policy::SkillsPolicy;
use crate::policy::types::{PolicySource, ProvenanceTrace, ResolvedPolicy, Stage, StagePolicy};
use std::path::Path;
use tracing::{debug, info};

/// One link of the resolution chain. `Ok(None)` hands the stage to the next
/// provider; an error stops the chain.
pub trait PolicyProvider {
    fn name(&self) -> &'static str;
    fn resolve(&self, stage: Stage) -> CoreResult<Option<ResolvedPolicy>>;
}

/// Serves stage entries from an already-loaded `skills.policy.json`.
pub struct OverrideFileProvider<'a> {
    policy: Option<&'a SkillsPolicy>,
}

impl<'a> OverrideFileProvider<'a> {
    pub fn new(policy: Option<&'a SkillsPolicy>) -> Self {
        Self { policy }
    }
}

impl PolicyProvider for OverrideFileProvider<'_> {
    fn name(&self) -> &'static str {
        "override_file"
    }

    fn resolve(&self, stage: Stage) -> CoreResult<Option<ResolvedPolicy>> {
        let Some(entry) = self.policy.and_then(|p| p.stage_policy(stage)) else {
            return Ok(None);
        };
        let resolved = traced(
            *entry,
            PolicySource::SkillsPolicy,
            format!("gate-policy.skills.policy.{}", stage),
        )?;
        Ok(Some(resolved))
    }
}

pub struct DefaultProvider;

impl PolicyProvider for DefaultProvider {
    fn name(&self) -> &'static str {
        "default"
    }

    fn resolve(&self, stage: Stage) -> CoreResult<Option<ResolvedPolicy>> {
        let resolved = traced(
            default_policy_for(stage),
            PolicySource::Default,
            default_bundle_id(stage),
        )?;
        Ok(Some(resolved))
    }
}

fn traced(
    policy: StagePolicy,
    source: PolicySource,
    bundle_id: String,
) -> CoreResult<ResolvedPolicy> {
    let content_hash = canonical_sha256_hex(&policy)?;
    Ok(ResolvedPolicy {
        policy,
        trace: ProvenanceTrace {
            source,
            bundle_id,
            content_hash,
        },
    })
}

/// Walks `providers` in order and returns the first policy produced.
pub fn resolve_with_providers(
    stage: Stage,
    providers: &[&dyn PolicyProvider],
) -> CoreResult<ResolvedPolicy> {
    for provider in providers {
        if let Some(resolved) = provider.resolve(stage)? {
            debug!(stage = %stage, provider = provider.name(), "policy provider selected");
            info!(
                stage = %stage,
                source = %resolved.trace.source,
                bundle_id = %resolved.trace.bundle_id,
                content_hash = %resolved.trace.content_hash,
                "resolved stage policy"
            );
            return Ok(resolved);
        }
    }
    Err(CoreError::InvalidInput(format!(
        "no policy provider resolved stage {}",
        stage
    )))
}

/// Resolves `stage` against an override that was already loaded (or is absent).
pub fn resolve_policy_for_stage_with(
    stage: Stage,
    skills_policy: Option<&SkillsPolicy>,
) -> CoreResult<ResolvedPolicy> {
    let override_file = OverrideFileProvider::new(skills_policy);
    resolve_with_providers(stage, &[&override_file, &DefaultProvider])
}

/// Reads `<repo_root>/skills.policy.json` at most once and resolves `stage`.
/// A malformed override fails the call instead of falling back to defaults.
pub fn resolve_policy_for_stage(stage: Stage, repo_root: &Path) -> CoreResult<ResolvedPolicy> {
    let skills_policy = SkillsPolicy::load(repo_root)?;
    resolve_policy_for_stage_with(stage, skills_policy.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl PolicyProvider for Silent {
        fn name(&self) -> &'static str {
            "silent"
        }
        fn resolve(&self, _stage: Stage) -> CoreResult<Option<ResolvedPolicy>> {
            Ok(None)
        }
    }

    #[test]
    fn empty_chain_is_an_error() {
        assert!(resolve_with_providers(Stage::CI, &[&Silent]).is_err());
    }

    #[test]
    fn first_producing_provider_wins() {
        let r = resolve_with_providers(Stage::CI, &[&Silent, &DefaultProvider]).unwrap();
        assert_eq!(r.trace.source, PolicySource::Default);
        assert_eq!(r.trace.bundle_id, "gate-policy.default.CI");
    }
}
