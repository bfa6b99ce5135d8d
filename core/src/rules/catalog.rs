use crate::error::{CoreError, CoreResult};
use crate::rules::definition::{Platform, RuleDefinition};
use crate::rules::severity::Severity;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

pub const HEURISTICS_CATALOG_VERSION: &str = "ast-heuristics@1";

/// Immutable table of rule definitions keyed by id.
///
/// Promotion never edits a catalog in place; it builds a new one through
/// [`RuleCatalog::map_rules`], which keeps ids and order intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCatalog {
    version: String,
    rules: Vec<RuleDefinition>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    catalog_version: String,
    rules: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: String,
    description: String,
    severity: Severity,
    platform: Platform,
    locked: bool,
    code: String,
    message: String,
}

fn rule_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9_-]*(\.[a-z0-9][a-z0-9_-]*)+$").expect("static rule id regex")
    })
}

pub fn is_valid_rule_id(id: &str) -> bool {
    rule_id_pattern().is_match(id)
}

impl RuleCatalog {
    pub fn new(version: impl Into<String>, rules: Vec<RuleDefinition>) -> CoreResult<Self> {
        let mut index = HashMap::with_capacity(rules.len());
        for (pos, rule) in rules.iter().enumerate() {
            if !is_valid_rule_id(&rule.id) {
                return Err(CoreError::InvalidInput(format!(
                    "rule id is not dot-hierarchical: {}",
                    rule.id
                )));
            }
            if index.insert(rule.id.clone(), pos).is_some() {
                return Err(CoreError::InvalidInput(format!(
                    "duplicate rule id: {}",
                    rule.id
                )));
            }
        }
        Ok(Self {
            version: version.into(),
            rules,
            index,
        })
    }

    /// The built-in AST heuristics catalog.
    pub fn heuristics() -> CoreResult<Self> {
        let json = include_str!("heuristics_catalog.json");
        let file: CatalogFile = serde_json::from_str(json)?;
        if file.catalog_version != HEURISTICS_CATALOG_VERSION {
            return Err(CoreError::InvalidInput(format!(
                "embedded catalog is not {}",
                HEURISTICS_CATALOG_VERSION
            )));
        }
        let rules = file
            .rules
            .into_iter()
            .map(|e| RuleDefinition {
                id: e.id,
                description: e.description,
                baseline_severity: e.severity,
                severity: e.severity,
                platform: e.platform,
                locked: e.locked,
                code: e.code,
                message: e.message,
            })
            .collect();
        Self::new(file.catalog_version, rules)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn get(&self, rule_id: &str) -> Option<&RuleDefinition> {
        self.index.get(rule_id).map(|&pos| &self.rules[pos])
    }

    pub fn contains(&self, rule_id: &str) -> bool {
        self.index.contains_key(rule_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn map_rules<F>(&self, f: F) -> Self
    where
        F: Fn(&RuleDefinition) -> RuleDefinition,
    {
        let rules = self
            .rules
            .iter()
            .map(|r| {
                let out = f(r);
                debug_assert_eq!(out.id, r.id);
                out
            })
            .collect();
        Self {
            version: self.version.clone(),
            rules,
            index: self.index.clone(),
        }
    }
}
