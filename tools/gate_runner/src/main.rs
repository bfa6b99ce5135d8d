use gate_core::error::{CoreError, CoreResult};
use gate_core::gate::batch::{evaluate_batches, group_by_file, FileDecision};
use gate_core::gate::decision::{evaluate_gate, GateDecision};
use gate_core::gate::evaluate_rules::evaluate_rules;
use gate_core::gate::fact::Fact;
use gate_core::policy::resolver::resolve_policy_for_stage_with;
use gate_core::policy::skills_policy::SkillsPolicy;
use gate_core::policy::types::{ProvenanceTrace, Stage, StagePolicy};
use gate_core::rules::catalog::RuleCatalog;
use gate_core::rules::promotion::{apply_bundle_promotions, apply_promotion_for_stage};
use gate_core::rules::severity::Severity;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GateReport {
    stage: Stage,
    catalog_version: String,
    policy: StagePolicy,
    trace: ProvenanceTrace,
    #[serde(skip_serializing_if = "Option::is_none")]
    skills_policy_hash: Option<String>,
    counts: BTreeMap<Severity, usize>,
    #[serde(flatten)]
    decision: GateDecision,
    files: Vec<FileDecision>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("usage: gate_runner <PRE_COMMIT|PRE_PUSH|CI> <repo_root> <facts.json>");
        std::process::exit(2);
    }
    let stage: Stage = match args[1].parse() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    match run(stage, Path::new(&args[2]), Path::new(&args[3])) {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(s) => println!("{}", s),
                Err(e) => {
                    eprintln!("report serialization error: {}", e);
                    std::process::exit(2);
                }
            }
            std::process::exit(report.decision.outcome.exit_code());
        }
        Err(e) => {
            eprintln!("gate error: {}", e);
            std::process::exit(2);
        }
    }
}

fn run(stage: Stage, repo_root: &Path, facts_path: &Path) -> CoreResult<GateReport> {
    let facts: Vec<Fact> = serde_json::from_slice(&std::fs::read(facts_path)?).map_err(|e| {
        CoreError::InvalidInput(format!("{}: {}", facts_path.display(), e))
    })?;
    debug!(facts = facts.len(), "loaded facts");

    // Single read of the override; reused for thresholds and bundles.
    let skills_policy = SkillsPolicy::load(repo_root)?;
    let resolved = resolve_policy_for_stage_with(stage, skills_policy.as_ref())?;

    let base = RuleCatalog::heuristics()?;
    let mut stage_catalog = apply_promotion_for_stage(&base, stage);
    let mut skills_policy_hash = None;
    if let Some(sp) = &skills_policy {
        stage_catalog = apply_bundle_promotions(&stage_catalog, sp, stage);
        skills_policy_hash = Some(sp.deterministic_hash()?);
    }

    let findings = evaluate_rules(&stage_catalog, &facts);
    let decision = evaluate_gate(&findings, &resolved.policy);
    let files = evaluate_batches(&stage_catalog, &resolved.policy, &group_by_file(&facts));

    Ok(GateReport {
        stage,
        catalog_version: stage_catalog.version().to_string(),
        policy: resolved.policy,
        trace: resolved.trace,
        skills_policy_hash,
        counts: decision.severity_counts(),
        decision,
        files,
    })
}
