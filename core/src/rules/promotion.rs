use crate::policy::skills_policy::SkillsPolicy;
use crate::policy::types::Stage;
use crate::rules::catalog::RuleCatalog;
use crate::rules::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Severity a promoted rule is raised to. Rules already at or above it keep
/// their own severity.
pub const PROMOTED_SEVERITY: Severity = Severity::ERROR;

/// The stage from which a rule's severity is escalated.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PromotionTag {
    NONE,
    FROM_PRE_PUSH,
    FROM_PRE_COMMIT,
}

impl PromotionTag {
    pub fn applies_at(self, stage: Stage) -> bool {
        match self {
            PromotionTag::NONE => false,
            PromotionTag::FROM_PRE_PUSH => matches!(stage, Stage::PRE_PUSH | Stage::CI),
            PromotionTag::FROM_PRE_COMMIT => true,
        }
    }
}

// Ids missing from this table are never escalated.
pub static STAGE_PROMOTIONS: &[(&str, PromotionTag)] = &[
    // never escalated
    ("heuristics.ts.empty-catch.ast", PromotionTag::NONE),
    // blocking synchronous filesystem calls and process control
    ("heuristics.ts.process-exit.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.child-process-import.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.child-process-exec-file-untrusted-args.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.child-process-exec-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.child-process-exec.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.child-process-spawn-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.child-process-spawn.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.child-process-fork.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.child-process-exec-file-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.child-process-exec-file.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-write-file-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-rm-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-mkdir-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-readdir-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-read-file-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-stat-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-statfs-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-realpath-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-lstat-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-exists-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-access-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-utimes-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-rename-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-copy-file-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-unlink-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-truncate-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-rmdir-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-chmod-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-chown-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-fchown-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-fchmod-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-fstat-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-ftruncate-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-futimes-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-lutimes-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-readv-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-writev-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-write-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-fsync-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-fdatasync-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-close-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-read-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-readlink-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-symlink-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-link-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-cp-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-open-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-opendir-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-mkdtemp-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    ("heuristics.ts.fs-append-file-sync.ast", PromotionTag::FROM_PRE_COMMIT),
    // escalated once code leaves the workstation
    ("heuristics.ts.explicit-any.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.console-log.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.console-error.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.eval.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.function-constructor.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.set-timeout-string.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.set-interval-string.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.new-promise-async.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.with-statement.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.delete-operator.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.debugger.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.solid.srp.class-command-query-mix.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.solid.isp.interface-command-query-mix.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.solid.ocp.discriminator-switch.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.solid.lsp.override-not-implemented.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.solid.dip.framework-import.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.solid.dip.concrete-instantiation.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.process-env-mutation.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.dynamic-shell-invocation.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.child-process-shell-true.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.hardcoded-secret-token.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.weak-crypto-hash.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.insecure-token-math-random.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.insecure-token-date-now.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.buffer-alloc-unsafe.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.weak-token-randomuuid.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.jwt-decode-without-verify.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.jwt-verify-ignore-expiration.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.jwt-sign-no-expiration.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.tls-reject-unauthorized-false.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.tls-env-override.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.buffer-alloc-unsafe-slow.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-write-file.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-append-file.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-rm.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-unlink.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-read-file.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-readdir.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-mkdir.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-stat.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-copy-file.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-rename.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-access.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-chmod.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-chown.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-utimes.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-lstat.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-realpath.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-symlink.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-link.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-readlink.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-open.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-opendir.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-cp.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-promises-mkdtemp.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-utimes-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-watch-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-watch-file-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-unwatch-file-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-read-file-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-exists-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-write-file-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-append-file-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-readdir-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-mkdir-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-rmdir-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-rm-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-rename-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-copy-file-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-stat-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-statfs-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-lstat-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-realpath-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-access-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-chmod-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-chown-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-lchown-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-lchmod-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-unlink-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-readlink-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-symlink-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-link-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-mkdtemp-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-opendir-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-open-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-cp-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-close-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-read-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-readv-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-writev-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-write-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-fsync-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-fdatasync-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-fchown-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-fchmod-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-fstat-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-ftruncate-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-truncate-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-futimes-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.fs-lutimes-callback.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ios.force-unwrap.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ios.anyview.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ios.force-try.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ios.force-cast.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ios.callback-style.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.inner-html.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.document-write.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.insert-adjacent-html.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.ts.vm-dynamic-code-execution.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.android.thread-sleep.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.android.globalscope.ast", PromotionTag::FROM_PRE_PUSH),
    ("heuristics.android.run-blocking.ast", PromotionTag::FROM_PRE_PUSH),
];

fn promotion_index() -> &'static HashMap<&'static str, PromotionTag> {
    static INDEX: OnceLock<HashMap<&'static str, PromotionTag>> = OnceLock::new();
    INDEX.get_or_init(|| STAGE_PROMOTIONS.iter().copied().collect())
}

pub fn promotion_for(rule_id: &str) -> PromotionTag {
    promotion_index()
        .get(rule_id)
        .copied()
        .unwrap_or(PromotionTag::NONE)
}

/// Returns a new catalog whose rules carry the severity effective at `stage`.
/// The input catalog is left untouched.
pub fn apply_promotion_for_stage(catalog: &RuleCatalog, stage: Stage) -> RuleCatalog {
    let promoted = catalog.map_rules(|rule| {
        if promotion_for(&rule.id).applies_at(stage) {
            rule.raised_to(PROMOTED_SEVERITY)
        } else {
            rule.clone()
        }
    });
    debug!(
        stage = %stage,
        rules = promoted.len(),
        promoted = promoted.iter().filter(|r| r.is_promoted()).count(),
        "applied stage promotions"
    );
    promoted
}

/// Raises every rule listed by an enabled bundle of `policy` to at least
/// [`PROMOTED_SEVERITY`]. Bundles only bite from PRE_PUSH on; ids unknown to
/// the catalog are skipped.
pub fn apply_bundle_promotions(
    catalog: &RuleCatalog,
    policy: &SkillsPolicy,
    stage: Stage,
) -> RuleCatalog {
    if !PromotionTag::FROM_PRE_PUSH.applies_at(stage) {
        return catalog.clone();
    }
    let mut targets: BTreeSet<&str> = BTreeSet::new();
    for (name, bundle) in policy.enabled_bundles() {
        for rule_id in &bundle.promote_to_error_rule_ids {
            if catalog.contains(rule_id) {
                targets.insert(rule_id.as_str());
            } else {
                warn!(bundle = %name, rule_id = %rule_id, "bundle promotes a rule absent from the catalog");
            }
        }
    }
    if targets.is_empty() {
        return catalog.clone();
    }
    debug!(rules = targets.len(), "applied bundle promotions");
    catalog.map_rules(|rule| {
        if targets.contains(rule.id.as_str()) {
            rule.raised_to(PROMOTED_SEVERITY)
        } else {
            rule.clone()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_has_no_duplicate_ids() {
        let mut seen = HashSet::new();
        for (id, _) in STAGE_PROMOTIONS {
            assert!(seen.insert(*id), "duplicate promotion entry {}", id);
        }
    }

    #[test]
    fn every_table_id_is_in_the_catalog() {
        let catalog = RuleCatalog::heuristics().unwrap();
        for (id, _) in STAGE_PROMOTIONS {
            assert!(catalog.contains(id), "{} missing from catalog", id);
        }
    }

    #[test]
    fn tag_stage_matrix() {
        assert!(!PromotionTag::NONE.applies_at(Stage::CI));
        assert!(!PromotionTag::FROM_PRE_PUSH.applies_at(Stage::PRE_COMMIT));
        assert!(PromotionTag::FROM_PRE_PUSH.applies_at(Stage::PRE_PUSH));
        assert!(PromotionTag::FROM_PRE_COMMIT.applies_at(Stage::PRE_COMMIT));
    }
}
