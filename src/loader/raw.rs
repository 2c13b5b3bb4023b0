//! Lenient JSON wire types for `data.json`.
//!
//! The generator that produces the dataset is loose about types: ids may be
//! numbers, ranks may be numeric strings, optional text may be blank or `null`.
//! These types accept all of that and are converted into the strict [`model`]
//! types, which stay safe for binary snapshots.
//!
//! [`model`]: crate::model

use crate::model::*;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDataset {
    #[serde(default)]
    meta: RawMeta,
    #[serde(default)]
    domains: Vec<RawDomain>,
    #[serde(default)]
    usecases: Vec<RawUseCase>,
    #[serde(default)]
    workflows: Vec<RawWorkflow>,
    #[serde(default)]
    foundations: Vec<RawFoundation>,
    #[serde(default)]
    indexes: RawIndexes,
}

#[derive(Debug, Default, Deserialize)]
struct RawMeta {
    #[serde(default)]
    counts: RawCounts,
    #[serde(default, deserialize_with = "lenient_text")]
    generated_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCounts {
    #[serde(default, deserialize_with = "lenient_count")]
    domains: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    usecases: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    workflows: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    metrics: u64,
}

#[derive(Debug, Default, Deserialize)]
struct RawIndexes {
    #[serde(default)]
    top_opportunity_ids: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawDomain {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSource {
    #[serde(default, deserialize_with = "lenient_text")]
    doc: Option<String>,
    #[serde(default, rename = "ref", deserialize_with = "lenient_text")]
    reference: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDerived {
    #[serde(default)]
    patterns: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_count")]
    quant_claim_count: u64,
    #[serde(default, deserialize_with = "lenient_text")]
    deployment_hint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawClaim {
    #[serde(default, deserialize_with = "lenient_text")]
    value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    context: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUseCase {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    domain: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    domain_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    item_level: Option<String>,
    #[serde(default)]
    rank: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text")]
    summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    primary_outcome: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    metric_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    complexity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    time_to_value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    dependencies: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    vendors_tools: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    risks_compliance: Option<String>,
    #[serde(default)]
    derived: Option<RawDerived>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    claimed_impact: Vec<RawClaim>,
    #[serde(default, deserialize_with = "lenient_text")]
    raw_current_state_pain: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    raw_automatable_units: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    raw_approach: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawWorkflow {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    domain: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    intervention: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    stakeholders_roles: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    before_steps: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    after_steps: Option<String>,
    #[serde(default)]
    source: Option<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawFoundation {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    area: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    full_excerpt: Option<String>,
    #[serde(default)]
    source: Option<RawSource>,
}

// ────────────────────────────────────────────────────────────────────────────
// Field helpers
// ────────────────────────────────────────────────────────────────────────────

fn scalar_text(v: Value) -> Option<String> {
    let s = match v {
        Value::Null => return None,
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    };
    if s.trim().is_empty() { None } else { Some(s) }
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(Value::deserialize(d)?))
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("invalid id {}", other))),
    }
}

/// Ranks are numbers or numeric strings; anything else means "no rank".
fn parse_rank(v: Option<Value>) -> Option<f64> {
    let f = match v? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

fn evidence(src: Option<RawSource>) -> Evidence {
    let src = src.unwrap_or_default();
    Evidence {
        doc: src.doc,
        reference: src.reference,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Conversion
// ────────────────────────────────────────────────────────────────────────────

impl From<RawDataset> for Dataset {
    fn from(raw: RawDataset) -> Self {
        let top_opportunity_ids: BTreeSet<String> = raw
            .indexes
            .top_opportunity_ids
            .into_iter()
            .filter_map(scalar_text)
            .collect();
        Dataset {
            meta: Meta {
                counts: MetaCounts {
                    domains: raw.meta.counts.domains,
                    usecases: raw.meta.counts.usecases,
                    workflows: raw.meta.counts.workflows,
                    metrics: raw.meta.counts.metrics,
                },
                generated_at: raw.meta.generated_at,
            },
            domains: raw.domains.into_iter().map(Category::from).collect(),
            usecases: raw.usecases.into_iter().map(CatalogItem::from).collect(),
            workflows: raw.workflows.into_iter().map(Workflow::from).collect(),
            foundations: raw.foundations.into_iter().map(Foundation::from).collect(),
            indexes: Indexes { top_opportunity_ids },
        }
    }
}

impl From<RawDomain> for Category {
    fn from(raw: RawDomain) -> Self {
        Category {
            name: raw.name.unwrap_or_else(|| raw.id.clone()),
            id: raw.id,
            description: raw.description,
        }
    }
}

impl From<RawUseCase> for CatalogItem {
    fn from(raw: RawUseCase) -> Self {
        let derived = raw.derived.unwrap_or_default();
        CatalogItem {
            id: raw.id,
            name: raw.name.unwrap_or_default(),
            category_id: raw.domain_id,
            category_name: raw.domain,
            item_level: raw.item_level.map(ItemLevel::from),
            rank: parse_rank(raw.rank),
            summary: raw.summary,
            primary_outcome: raw.primary_outcome,
            metric_type: raw.metric_type.as_deref().and_then(MetricType::new),
            complexity: raw.complexity.as_deref().and_then(Complexity::new),
            time_to_value: raw.time_to_value,
            dependencies: raw.dependencies,
            vendors_tools: raw.vendors_tools,
            risks_compliance: raw.risks_compliance,
            patterns: derived
                .patterns
                .into_iter()
                .filter_map(scalar_text)
                .filter_map(|p| PatternTag::new(&p))
                .collect(),
            quant_claim_count: u32::try_from(derived.quant_claim_count).unwrap_or(u32::MAX),
            deployment_hint: derived.deployment_hint.as_deref().and_then(DeploymentHint::new),
            claims: raw
                .claimed_impact
                .into_iter()
                .map(|c| Claim {
                    value: c.value,
                    context: c.context,
                })
                .collect(),
            evidence: evidence(raw.source),
            raw_current_state_pain: raw.raw_current_state_pain,
            raw_automatable_units: raw.raw_automatable_units,
            raw_approach: raw.raw_approach,
        }
    }
}

impl From<RawWorkflow> for Workflow {
    fn from(raw: RawWorkflow) -> Self {
        Workflow {
            name: raw.name.unwrap_or_else(|| raw.id.clone()),
            id: raw.id,
            domain: raw.domain,
            intervention: raw.intervention,
            stakeholders_roles: raw.stakeholders_roles,
            before_steps: raw.before_steps,
            after_steps: raw.after_steps,
            evidence: evidence(raw.source),
        }
    }
}

impl From<RawFoundation> for Foundation {
    fn from(raw: RawFoundation) -> Self {
        Foundation {
            area: raw.area.unwrap_or_default(),
            id: raw.id,
            summary: raw.summary,
            full_excerpt: raw.full_excerpt,
            evidence: evidence(raw.source),
        }
    }
}
