use gate_core::policy::types::Stage;
use gate_core::rules::catalog::RuleCatalog;
use gate_core::rules::definition::RuleDefinition;
use gate_core::rules::promotion::{
    apply_promotion_for_stage, promotion_for, PromotionTag, PROMOTED_SEVERITY, STAGE_PROMOTIONS,
};
use gate_core::rules::severity::Severity;

const CONSOLE_LOG: &str = "heuristics.ts.console-log.ast";
const FS_READ_SYNC: &str = "heuristics.ts.fs-read-file-sync.ast";
const EMPTY_CATCH: &str = "heuristics.ts.empty-catch.ast";

fn sev(catalog: &RuleCatalog, id: &str) -> Severity {
    catalog.get(id).unwrap().severity
}

#[test]
fn severity_rank_order() {
    assert!(Severity::INFO < Severity::WARN);
    assert!(Severity::WARN < Severity::ERROR);
    assert!(Severity::ERROR < Severity::CRITICAL);
    assert!(Severity::ERROR.is_at_least(Severity::WARN));
    assert!(!Severity::WARN.is_at_least(Severity::ERROR));
}

#[test]
fn from_pre_push_keeps_baseline_at_pre_commit() {
    let base = RuleCatalog::heuristics().unwrap();
    assert_eq!(promotion_for(CONSOLE_LOG), PromotionTag::FROM_PRE_PUSH);
    assert_eq!(sev(&apply_promotion_for_stage(&base, Stage::PRE_COMMIT), CONSOLE_LOG), Severity::WARN);
    assert_eq!(sev(&apply_promotion_for_stage(&base, Stage::PRE_PUSH), CONSOLE_LOG), Severity::ERROR);
    assert_eq!(sev(&apply_promotion_for_stage(&base, Stage::CI), CONSOLE_LOG), Severity::ERROR);
}

#[test]
fn from_pre_commit_promotes_everywhere() {
    let base = RuleCatalog::heuristics().unwrap();
    assert_eq!(promotion_for(FS_READ_SYNC), PromotionTag::FROM_PRE_COMMIT);
    for stage in Stage::ALL {
        assert_eq!(sev(&apply_promotion_for_stage(&base, stage), FS_READ_SYNC), PROMOTED_SEVERITY);
    }
}

#[test]
fn none_tag_and_untabled_rules_never_move() {
    let base = RuleCatalog::heuristics().unwrap();
    let untabled = "heuristics.ios.dispatchqueue.ast";
    assert_eq!(promotion_for(untabled), PromotionTag::NONE);
    for stage in Stage::ALL {
        let c = apply_promotion_for_stage(&base, stage);
        assert_eq!(sev(&c, EMPTY_CATCH), Severity::WARN);
        assert_eq!(sev(&c, untabled), Severity::WARN);
    }
}

#[test]
fn every_tagged_rule_follows_its_tag() {
    let base = RuleCatalog::heuristics().unwrap();
    for stage in Stage::ALL {
        let c = apply_promotion_for_stage(&base, stage);
        for (id, tag) in STAGE_PROMOTIONS {
            let rule = c.get(id).unwrap();
            if tag.applies_at(stage) {
                assert!(rule.severity >= PROMOTED_SEVERITY, "{} at {}", id, stage);
            } else {
                assert_eq!(rule.severity, rule.baseline_severity, "{} at {}", id, stage);
            }
        }
    }
}

#[test]
fn promotion_never_lowers_a_severity() {
    let c = RuleCatalog::new(
        "test@1",
        vec![
            RuleDefinition::new(CONSOLE_LOG, Severity::CRITICAL),
            RuleDefinition::new(FS_READ_SYNC, Severity::INFO),
        ],
    )
    .unwrap();
    let promoted = apply_promotion_for_stage(&c, Stage::CI);
    assert_eq!(sev(&promoted, CONSOLE_LOG), Severity::CRITICAL);
    assert!(!promoted.get(CONSOLE_LOG).unwrap().is_promoted());
    assert_eq!(sev(&promoted, FS_READ_SYNC), Severity::ERROR);
}

#[test]
fn source_catalog_is_untouched_and_calls_are_value_equal() {
    let base = RuleCatalog::heuristics().unwrap();
    let snapshot = base.clone();
    let first = apply_promotion_for_stage(&base, Stage::PRE_PUSH);
    for stage in Stage::ALL {
        let _ = apply_promotion_for_stage(&base, stage);
    }
    let second = apply_promotion_for_stage(&base, Stage::PRE_PUSH);
    assert_eq!(base, snapshot);
    assert_eq!(first, second);
    assert_eq!(first.len(), base.len());
    let ids: Vec<&str> = first.iter().map(|r| r.id.as_str()).collect();
    let base_ids: Vec<&str> = base.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, base_ids);
}
