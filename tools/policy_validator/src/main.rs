use gate_core::policy::resolver::resolve_policy_for_stage_with;
use gate_core::policy::skills_policy::SkillsPolicy;
use gate_core::policy::types::Stage;
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: policy_validator <repo_root>");
        std::process::exit(2);
    }
    let root = std::path::Path::new(&args[1]);

    let skills_policy = match SkillsPolicy::load(root) {
        Ok(sp) => sp,
        Err(e) => {
            eprintln!("policy error: {}", e);
            std::process::exit(1);
        }
    };

    let mut stages = Vec::new();
    for stage in Stage::ALL {
        match resolve_policy_for_stage_with(stage, skills_policy.as_ref()) {
            Ok(resolved) => stages.push(resolved),
            Err(e) => {
                eprintln!("policy error: {}", e);
                std::process::exit(1);
            }
        }
    }

    let file_hash = match skills_policy.as_ref().map(|sp| sp.deterministic_hash()).transpose() {
        Ok(h) => h,
        Err(e) => {
            eprintln!("policy error: {}", e);
            std::process::exit(1);
        }
    };

    let out = json!({
        "skillsPolicyHash": file_hash,
        "stages": stages,
    });
    match serde_json::to_string_pretty(&out) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("output error: {}", e);
            std::process::exit(1);
        }
    }
}
