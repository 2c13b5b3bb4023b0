#![allow(dead_code)]

use oppmap::loader::parse_dataset_json;
use oppmap::model::Dataset;

/// Three domains, seven items, one workflow, three foundations.
///
/// - `fin`: opportunities `u1`, `u3`; use case `u2` (top listed)
/// - `ops`: use cases only, `u6` (rank 1), `u4` (rank 3), `u5` (unranked)
/// - `empty`: no items
/// - `u7`: opportunity without a domain
pub const SAMPLE_JSON: &str = r#"{
  "meta": {
    "counts": { "domains": 3, "usecases": 7, "workflows": 1, "metrics": 12 },
    "generated_at": "2025-01-31T10:00:00Z"
  },
  "domains": [
    { "id": "fin", "name": "Finance" },
    { "id": "ops", "name": "Operations", "description": "Plant and logistics" },
    { "id": "empty", "name": "Empty" }
  ],
  "usecases": [
    {
      "id": "u1", "name": "Invoice matching", "domain": "Finance", "domain_id": "fin",
      "item_level": "Opportunity", "rank": 2, "metric_type": "Cost", "complexity": "Low",
      "time_to_value": "2 weeks", "vendors_tools": "SAP Ariba",
      "derived": { "patterns": ["RAG", "Automation"], "quant_claim_count": 3, "deployment_hint": "Self-hosted" },
      "source": { "doc": "report.pdf", "ref": "p. 4" },
      "claimed_impact": [{ "value": "30%", "context": "fewer exceptions" }, { "value": "2 FTE" }]
    },
    {
      "id": "u2", "name": "Forecast & plan <beta>", "domain": "Finance", "domain_id": "fin",
      "item_level": "UseCase", "rank": 1, "metric_type": "Time", "complexity": "High",
      "derived": { "patterns": ["Forecasting"], "quant_claim_count": 1, "deployment_hint": "Vendor" }
    },
    {
      "id": "u3", "name": "Spend analytics", "domain": "Finance", "domain_id": "fin",
      "item_level": "Opportunity", "rank": "5", "metric_type": "Cost", "complexity": "Med",
      "time_to_value": "3 months",
      "derived": { "patterns": ["Automation"], "quant_claim_count": 5 }
    },
    {
      "id": "u4", "name": "Shift planning", "domain": "Operations", "domain_id": "ops",
      "item_level": "UseCase", "rank": 3, "complexity": "Medium",
      "derived": { "patterns": ["RAG"] }
    },
    {
      "id": "u5", "name": "Maintenance copilot", "domain": "Operations", "domain_id": "ops",
      "item_level": "UseCase", "summary": "  ", "vendors_tools": "Azure OpenAI"
    },
    {
      "id": "u6", "name": "Quality inspection", "domain": "Operations", "domain_id": "ops",
      "item_level": "UseCase", "rank": 1, "complexity": "High", "metric_type": "Quality"
    },
    {
      "id": "u7", "name": "Enterprise search", "item_level": "Opportunity", "complexity": "High"
    }
  ],
  "workflows": [
    {
      "id": "w1", "name": "Month-end close", "domain": "Finance",
      "before_steps": "Manual reconciliation", "after_steps": "Auto-matched ledger",
      "source": { "doc": "report.pdf", "ref": "p. 9" }
    }
  ],
  "foundations": [
    { "id": "f1", "area": "governance and risk", "summary": "Model inventory" },
    {
      "id": "f2", "area": "open-source-first reference stack",
      "full_excerpt": "Layer | Local | Vendor\nLLM | Llama | GPT\nnot a row\nVector DB | Qdrant"
    },
    { "id": "f3", "area": "monitoring", "summary": "Drift alerts" }
  ],
  "indexes": { "top_opportunity_ids": ["u2"] }
}"#;

pub fn sample() -> Dataset {
    parse_dataset_json(SAMPLE_JSON).expect("sample dataset parses")
}

pub fn ids(items: &[&oppmap::model::CatalogItem]) -> Vec<String> {
    items.iter().map(|u| u.id.clone()).collect()
}
