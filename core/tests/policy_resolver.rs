use gate_core::determinism::digest::{canonical_sha256_hex, is_sha256_hex};
use gate_core::error::CoreError;
use gate_core::policy::defaults::default_policy_for;
use gate_core::policy::resolver::resolve_policy_for_stage;
use gate_core::policy::skills_policy::{SkillsPolicy, SKILLS_POLICY_FILE};
use gate_core::policy::types::{PolicySource, Stage};
use gate_core::rules::severity::Severity;
use std::fs;
use std::path::Path;

fn write_policy(root: &Path, body: &str) {
    fs::write(root.join(SKILLS_POLICY_FILE), body).unwrap();
}

const PRE_COMMIT_OVERRIDE: &str = r#"{
  "version": "1.0",
  "defaultBundleEnabled": true,
  "stages": {
    "PRE_COMMIT": { "blockOnOrAbove": "ERROR", "warnOnOrAbove": "WARN" }
  },
  "bundles": {}
}"#;

#[test]
fn override_entry_is_returned_with_skills_policy_trace() {
    let tmp = tempfile::tempdir().unwrap();
    write_policy(tmp.path(), PRE_COMMIT_OVERRIDE);

    let r = resolve_policy_for_stage(Stage::PRE_COMMIT, tmp.path()).unwrap();
    assert_eq!(r.policy.stage(), Stage::PRE_COMMIT);
    assert_eq!(r.policy.block_on_or_above(), Severity::ERROR);
    assert_eq!(r.policy.warn_on_or_above(), Severity::WARN);
    assert_eq!(r.trace.source, PolicySource::SkillsPolicy);
    assert_eq!(r.trace.bundle_id, "gate-policy.skills.policy.PRE_COMMIT");
    assert!(r.trace.bundle_id.contains("PRE_COMMIT"));
    assert!(is_sha256_hex(&r.trace.content_hash));
    assert_eq!(r.trace.content_hash, canonical_sha256_hex(&r.policy).unwrap());
}

#[test]
fn missing_file_yields_default() {
    let tmp = tempfile::tempdir().unwrap();
    for stage in Stage::ALL {
        let r = resolve_policy_for_stage(stage, tmp.path()).unwrap();
        assert_eq!(r.policy, default_policy_for(stage));
        assert_eq!(r.trace.source, PolicySource::Default);
        assert_eq!(r.trace.bundle_id, format!("gate-policy.default.{}", stage));
        assert!(is_sha256_hex(&r.trace.content_hash));
    }
}

#[test]
fn missing_stage_entry_falls_back_to_default() {
    let tmp = tempfile::tempdir().unwrap();
    write_policy(tmp.path(), PRE_COMMIT_OVERRIDE);
    let r = resolve_policy_for_stage(Stage::CI, tmp.path()).unwrap();
    assert_eq!(r.policy, default_policy_for(Stage::CI));
    assert_eq!(r.trace.source, PolicySource::Default);
}

#[test]
fn resolution_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    write_policy(tmp.path(), PRE_COMMIT_OVERRIDE);
    let a = resolve_policy_for_stage(Stage::PRE_COMMIT, tmp.path()).unwrap();
    let b = resolve_policy_for_stage(Stage::PRE_COMMIT, tmp.path()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn hash_tracks_thresholds() {
    let tmp = tempfile::tempdir().unwrap();
    write_policy(tmp.path(), PRE_COMMIT_OVERRIDE);
    let a = resolve_policy_for_stage(Stage::PRE_COMMIT, tmp.path()).unwrap();
    write_policy(tmp.path(), &PRE_COMMIT_OVERRIDE.replace("\"WARN\"", "\"INFO\""));
    let b = resolve_policy_for_stage(Stage::PRE_COMMIT, tmp.path()).unwrap();
    assert_ne!(a.trace.content_hash, b.trace.content_hash);
    assert_eq!(b.policy.warn_on_or_above(), Severity::INFO);
}

#[test]
fn malformed_json_is_a_config_error() {
    let tmp = tempfile::tempdir().unwrap();
    write_policy(tmp.path(), "{ not json");
    let err = resolve_policy_for_stage(Stage::PRE_PUSH, tmp.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigParse { .. }), "{:?}", err);
}

#[test]
fn wrong_shape_is_a_config_error() {
    let tmp = tempfile::tempdir().unwrap();
    write_policy(tmp.path(), r#"{"version":"1.0","stages":[]}"#);
    let err = resolve_policy_for_stage(Stage::PRE_PUSH, tmp.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigParse { .. }), "{:?}", err);
}

#[test]
fn unknown_severity_or_stage_is_a_config_error() {
    let bad_sev = PRE_COMMIT_OVERRIDE.replace("\"ERROR\"", "\"error\"");
    let bad_stage = PRE_COMMIT_OVERRIDE.replace("PRE_COMMIT", "PRE_MERGE");
    for body in [bad_sev, bad_stage] {
        let tmp = tempfile::tempdir().unwrap();
        write_policy(tmp.path(), &body);
        // the bad entry fails every stage, not only its own
        let err = resolve_policy_for_stage(Stage::CI, tmp.path()).unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse { .. }), "{:?}", err);
    }
}

#[test]
fn inverted_thresholds_violate_the_invariant() {
    let tmp = tempfile::tempdir().unwrap();
    write_policy(
        tmp.path(),
        r#"{"version":"1.0","defaultBundleEnabled":true,"bundles":{},
            "stages":{"CI":{"blockOnOrAbove":"WARN","warnOnOrAbove":"ERROR"}}}"#,
    );
    let err = resolve_policy_for_stage(Stage::CI, tmp.path()).unwrap_err();
    match err {
        CoreError::InvalidPolicyInvariant {
            stage,
            block_on_or_above,
            warn_on_or_above,
        } => {
            assert_eq!(stage, Stage::CI);
            assert_eq!(block_on_or_above, Severity::WARN);
            assert_eq!(warn_on_or_above, Severity::ERROR);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn whole_file_hash_ignores_bundle_id_order() {
    let a = SkillsPolicy::parse(
        br#"{"version":"1.0","defaultBundleEnabled":true,"stages":{},
             "bundles":{"core":{"enabled":true,"promoteToErrorRuleIds":["b.x","a.x"]}}}"#,
        "a",
    )
    .unwrap();
    let b = SkillsPolicy::parse(
        br#"{"version":"1.0","defaultBundleEnabled":true,"stages":{},
             "bundles":{"core":{"enabled":true,"promoteToErrorRuleIds":["a.x","b.x"]}}}"#,
        "b",
    )
    .unwrap();
    let c = SkillsPolicy::parse(
        br#"{"version":"1.0","defaultBundleEnabled":false,"stages":{},
             "bundles":{"core":{"enabled":true,"promoteToErrorRuleIds":["a.x","b.x"]}}}"#,
        "c",
    )
    .unwrap();
    assert_eq!(a.deterministic_hash().unwrap(), b.deterministic_hash().unwrap());
    assert_ne!(b.deterministic_hash().unwrap(), c.deterministic_hash().unwrap());
}
