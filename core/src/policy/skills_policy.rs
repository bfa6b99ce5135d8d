use crate::determinism::digest::canonical_sha256_hex;
use crate::error::{CoreError, CoreResult};
use crate::policy::types::{Stage, StagePolicy};
use crate::rules::severity::Severity;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

pub const SKILLS_POLICY_FILE: &str = "skills.policy.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SkillsBundle {
    pub enabled: bool,
    #[serde(default)]
    pub promote_to_error_rule_ids: Vec<String>,
}

/// Validated contents of `skills.policy.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillsPolicy {
    pub version: String,
    pub default_bundle_enabled: bool,
    pub stages: BTreeMap<Stage, StagePolicy>,
    pub bundles: BTreeMap<String, SkillsBundle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSkillsPolicy {
    version: String,
    default_bundle_enabled: bool,
    stages: BTreeMap<String, RawStageEntry>,
    bundles: BTreeMap<String, SkillsBundle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStageEntry {
    block_on_or_above: String,
    warn_on_or_above: String,
}

impl SkillsPolicy {
    /// Parses and validates override bytes. `origin` only labels errors.
    pub fn parse(bytes: &[u8], origin: &str) -> CoreResult<Self> {
        let bad = |reason: String| CoreError::ConfigParse {
            path: origin.to_string(),
            reason,
        };

        let raw: RawSkillsPolicy =
            serde_json::from_slice(bytes).map_err(|e| bad(e.to_string()))?;

        if raw.version.trim().is_empty() {
            return Err(bad("version must be a non-empty string".to_string()));
        }

        let mut stages = BTreeMap::new();
        for (key, entry) in raw.stages {
            let stage: Stage = key
                .parse()
                .map_err(|_| bad(format!("unknown stage key: {}", key)))?;
            let block: Severity = entry.block_on_or_above.parse().map_err(|_| {
                bad(format!(
                    "stages.{}.blockOnOrAbove is not a severity: {}",
                    key, entry.block_on_or_above
                ))
            })?;
            let warn: Severity = entry.warn_on_or_above.parse().map_err(|_| {
                bad(format!(
                    "stages.{}.warnOnOrAbove is not a severity: {}",
                    key, entry.warn_on_or_above
                ))
            })?;
            stages.insert(stage, StagePolicy::new(stage, block, warn)?);
        }

        for (name, bundle) in &raw.bundles {
            if name.trim().is_empty() {
                return Err(bad("bundle names must be non-empty".to_string()));
            }
            if bundle
                .promote_to_error_rule_ids
                .iter()
                .any(|id| id.trim().is_empty())
            {
                return Err(bad(format!(
                    "bundles.{}.promoteToErrorRuleIds contains an empty id",
                    name
                )));
            }
        }

        Ok(Self {
            version: raw.version,
            default_bundle_enabled: raw.default_bundle_enabled,
            stages,
            bundles: raw.bundles,
        })
    }

    /// Reads `skills.policy.json` under `repo_root`. A missing file is `Ok(None)`;
    /// an unreadable or malformed one is an error.
    pub fn load(repo_root: &Path) -> CoreResult<Option<Self>> {
        let path = repo_root.join(SKILLS_POLICY_FILE);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no skills policy override");
                return Ok(None);
            }
            Err(e) => return Err(CoreError::Io(e)),
        };
        Self::parse(&bytes, &path.display().to_string()).map(Some)
    }

    pub fn stage_policy(&self, stage: Stage) -> Option<&StagePolicy> {
        self.stages.get(&stage)
    }

    pub fn enabled_bundles(&self) -> impl Iterator<Item = (&String, &SkillsBundle)> {
        self.bundles.iter().filter(|(_, b)| b.enabled)
    }

    /// Hash of the whole normalized file: stages keyed by id, bundles sorted by
    /// name, promoted ids sorted.
    pub fn deterministic_hash(&self) -> CoreResult<String> {
        let bundles: Vec<serde_json::Value> = self
            .bundles
            .iter()
            .map(|(name, b)| {
                let mut ids = b.promote_to_error_rule_ids.clone();
                ids.sort();
                json!({
                    "name": name,
                    "enabled": b.enabled,
                    "promoteToErrorRuleIds": ids,
                })
            })
            .collect();
        let stages: BTreeMap<&str, &StagePolicy> =
            self.stages.iter().map(|(s, p)| (s.as_str(), p)).collect();
        canonical_sha256_hex(&json!({
            "version": self.version,
            "defaultBundleEnabled": self.default_bundle_enabled,
            "stages": stages,
            "bundles": bundles,
        }))
    }
}
