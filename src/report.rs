//! Text views over the dataset: detail panels, explore table rows, domain
//! focus, roadmap buckets and the foundations split.
//!
//! Missing values are shown as [`NOT_STATED`]; nothing here fails.

use crate::model::{CatalogItem, Category, Dataset, Foundation, Workflow};
use crate::tree::primary_items;
use indexmap::IndexMap;
use serde::Serialize;

pub const NOT_STATED: &str = "Not stated in source";
/// Placeholder used in dense table cells.
pub const DASH: &str = "—";

pub fn or_not_stated(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_STATED)
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or(DASH)
}

/// A labelled row of a detail panel.
pub type DetailRow = (&'static str, String);

/// Key/value rows for an item's detail panel.
pub fn item_rows(u: &CatalogItem) -> Vec<DetailRow> {
    let patterns = if u.patterns.is_empty() {
        "Not specified".to_string()
    } else {
        u.patterns.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ")
    };
    vec![
        ("Domain", or_not_stated(u.category_name.as_deref()).to_string()),
        (
            "Item level",
            u.item_level.as_ref().map_or("Not stated", |l| l.as_str()).to_string(),
        ),
        ("Summary", or_not_stated(u.summary.as_deref()).to_string()),
        ("Primary outcome", or_not_stated(u.primary_outcome.as_deref()).to_string()),
        (
            "Metric type",
            or_not_stated(u.metric_type.as_ref().map(|m| m.as_str())).to_string(),
        ),
        ("Time-to-value", or_not_stated(u.time_to_value.as_deref()).to_string()),
        (
            "Complexity",
            or_not_stated(u.complexity.as_ref().map(|c| c.as_str())).to_string(),
        ),
        ("Dependencies", or_not_stated(u.dependencies.as_deref()).to_string()),
        ("Vendors/tools (as written)", or_not_stated(u.vendors_tools.as_deref()).to_string()),
        ("Risks & compliance notes", or_not_stated(u.risks_compliance.as_deref()).to_string()),
        ("Approach / patterns", patterns),
        (
            "Local/Vendor hint",
            or_not_stated(u.deployment_hint.as_ref().map(|d| d.as_str())).to_string(),
        ),
        ("Quantified claims", u.quant_claim_count.to_string()),
        ("Evidence", u.evidence.to_string()),
        ("Current-state pain", or_not_stated(u.raw_current_state_pain.as_deref()).to_string()),
        ("Automatable units", or_not_stated(u.raw_automatable_units.as_deref()).to_string()),
        ("Approach", or_not_stated(u.raw_approach.as_deref()).to_string()),
    ]
}

/// Shown instead of the claims table when an item states none.
pub const NO_CLAIMS: &str = "None stated in source.";

/// `[value, context]` rows of the item's quantified claims, as stated.
pub fn claim_rows(u: &CatalogItem) -> Vec<Vec<String>> {
    u.claims
        .iter()
        .map(|c| {
            vec![
                c.value.clone().unwrap_or_default(),
                c.context.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

pub fn workflow_rows(w: &Workflow) -> Vec<DetailRow> {
    vec![
        ("Domain", or_not_stated(w.domain.as_deref()).to_string()),
        ("Intervention (as stated)", or_not_stated(w.intervention.as_deref()).to_string()),
        ("Stakeholders/roles", or_not_stated(w.stakeholders_roles.as_deref()).to_string()),
        ("Before steps", or_not_stated(w.before_steps.as_deref()).to_string()),
        ("After steps", or_not_stated(w.after_steps.as_deref()).to_string()),
        ("Evidence", w.evidence.to_string()),
    ]
}

/// Format rows as aligned `label: value` lines.
pub fn format_rows(rows: &[DetailRow]) -> String {
    let width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    rows.iter()
        .map(|(k, v)| {
            let pad = width - k.chars().count();
            let indent = " ".repeat(width + 2);
            let value = v.lines().collect::<Vec<_>>().join(&format!("\n{}", indent));
            format!("{}:{}{}", k, " ".repeat(pad + 1), value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Explore table
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExploreRow {
    pub id: String,
    pub item: String,
    pub domain: String,
    pub primary_outcome: String,
    pub metric_type: String,
    pub complexity: String,
    pub time_to_value: String,
    /// First three patterns.
    pub patterns: String,
    pub quant_claims: u32,
    pub deployment_hint: String,
}

impl ExploreRow {
    pub const HEADERS: [&'static str; 9] = [
        "Item",
        "Primary outcome",
        "Metric type",
        "Complexity",
        "Time-to-value",
        "Patterns",
        "Quantified claims",
        "Local/Vendor hint",
        "Id",
    ];

    pub fn cells(&self) -> [String; 9] {
        [
            self.item.clone(),
            self.primary_outcome.clone(),
            self.metric_type.clone(),
            self.complexity.clone(),
            self.time_to_value.clone(),
            self.patterns.clone(),
            self.quant_claims.to_string(),
            self.deployment_hint.clone(),
            self.id.clone(),
        ]
    }
}

impl From<&CatalogItem> for ExploreRow {
    fn from(u: &CatalogItem) -> Self {
        let patterns = u
            .patterns
            .iter()
            .take(3)
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        ExploreRow {
            id: u.id.clone(),
            item: u.name.clone(),
            domain: u.category_name.clone().unwrap_or_default(),
            primary_outcome: or_dash(u.primary_outcome.as_deref()).to_string(),
            metric_type: or_dash(u.metric_type.as_ref().map(|m| m.as_str())).to_string(),
            complexity: or_dash(u.complexity.as_ref().map(|c| c.as_str())).to_string(),
            time_to_value: or_dash(u.time_to_value.as_deref()).to_string(),
            patterns: if patterns.is_empty() { DASH.to_string() } else { patterns },
            quant_claims: u.quant_claim_count,
            deployment_hint: or_dash(u.deployment_hint.as_ref().map(|d| d.as_str())).to_string(),
        }
    }
}

/// Render rows as a plain-text table with padded columns.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = vec![
        pad_line(headers.iter().copied(), &widths),
        pad_line(rule.iter().map(String::as_str), &widths),
    ];
    for row in rows {
        out.push(pad_line(row.iter().map(String::as_str), &widths));
    }
    out.join("\n")
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(c, w)| format!("{}{}", c, " ".repeat(w.saturating_sub(c.chars().count()))))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Workflow list
// ────────────────────────────────────────────────────────────────────────────

/// Shown in place of the detail when no workflow is selected.
pub const NO_WORKFLOW_SELECTED: &str = "Select a workflow to see where automation intervenes. \
Before/after steps appear only where the source states them.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowRow {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub selected: bool,
}

impl WorkflowRow {
    pub const HEADERS: [&'static str; 3] = ["Workflow", "Domain", "Id"];

    pub fn cells(&self) -> [String; 3] {
        let marker = if self.selected { "› " } else { "  " };
        [format!("{}{}", marker, self.name), self.domain.clone(), self.id.clone()]
    }
}

/// Every workflow in dataset order, flagging the one whose id is `selected`.
pub fn workflow_list(dataset: &Dataset, selected: Option<&str>) -> Vec<WorkflowRow> {
    dataset
        .workflows
        .iter()
        .map(|w| WorkflowRow {
            id: w.id.clone(),
            name: w.name.clone(),
            domain: or_dash(w.domain.as_deref()).to_string(),
            selected: selected == Some(w.id.as_str()),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Domain focus
// ────────────────────────────────────────────────────────────────────────────

/// What the overview shows for one selected domain.
#[derive(Debug, Clone, Serialize)]
pub struct DomainFocus<'a> {
    pub category: &'a Category,
    pub item_count: usize,
    pub opportunity_count: usize,
    /// Opportunities, or the best-ranked items when there are none.
    pub cards: Vec<&'a CatalogItem>,
}

pub fn domain_focus<'a>(dataset: &'a Dataset, category_id: &str, limit: usize) -> Option<DomainFocus<'a>> {
    let category = dataset.category(category_id)?;
    let items: Vec<&CatalogItem> = dataset.items_in_category(&category.id).collect();
    Some(DomainFocus {
        category,
        item_count: items.len(),
        opportunity_count: items.iter().filter(|u| u.is_opportunity()).count(),
        cards: primary_items(&items, limit),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Roadmap
// ────────────────────────────────────────────────────────────────────────────

/// Sequencing bucket computed from time-to-value and complexity only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RoadmapBucket {
    QuickWins,
    BuildDeploy,
    Strategic,
    NeedsReview,
}

impl RoadmapBucket {
    pub fn label(self) -> &'static str {
        match self {
            RoadmapBucket::QuickWins => "30 days (quick wins)",
            RoadmapBucket::BuildDeploy => "60–90 days (build + deploy)",
            RoadmapBucket::Strategic => "6–12 months (strategic)",
            RoadmapBucket::NeedsReview => "Needs review (not stated)",
        }
    }

    pub fn for_item(u: &CatalogItem) -> Self {
        let tt = u.time_to_value.as_deref().unwrap_or("").to_lowercase();
        let cx = u
            .complexity
            .as_ref()
            .map(|c| c.as_str().to_lowercase())
            .unwrap_or_default();
        if tt.contains("days") || tt.contains("week") || cx == "low" {
            RoadmapBucket::QuickWins
        } else if tt.contains("month") || cx == "med" || cx == "medium" {
            RoadmapBucket::BuildDeploy
        } else if cx == "high" {
            RoadmapBucket::Strategic
        } else {
            RoadmapBucket::NeedsReview
        }
    }
}

/// Opportunities grouped by bucket (bucket order), each group sorted by
/// quantified-claims count, highest first.
pub fn roadmap(dataset: &Dataset) -> IndexMap<RoadmapBucket, Vec<&CatalogItem>> {
    let mut groups: IndexMap<RoadmapBucket, Vec<&CatalogItem>> = IndexMap::new();
    for u in dataset.opportunities() {
        groups.entry(RoadmapBucket::for_item(u)).or_default().push(u);
    }
    groups.sort_keys();
    for items in groups.values_mut() {
        items.sort_by(|a, b| b.quant_claim_count.cmp(&a.quant_claim_count));
    }
    groups
}

// ────────────────────────────────────────────────────────────────────────────
// Foundations
// ────────────────────────────────────────────────────────────────────────────

pub const CORE_FOUNDATION_AREAS: [&str; 5] = [
    "data hub/integration",
    "governance",
    "security/privacy",
    "monitoring",
    "change management",
];

/// Split foundations into the core platform areas and everything else,
/// keeping dataset order.
pub fn split_foundations(dataset: &Dataset) -> (Vec<&Foundation>, Vec<&Foundation>) {
    dataset
        .foundations
        .iter()
        .partition(|f| CORE_FOUNDATION_AREAS.iter().any(|a| f.area.starts_with(a)))
}

/// First foundation whose area mentions `needle`.
pub fn foundation_by_area<'a>(dataset: &'a Dataset, needle: &str) -> Option<&'a Foundation> {
    dataset.foundations.iter().find(|f| f.area.contains(needle))
}

/// Parse `a | b | c` lines into rows; lines without a pipe are skipped.
/// `None` when no line has at least two cells.
pub fn pipe_table(text: &str) -> Option<Vec<Vec<String>>> {
    let rows: Vec<Vec<String>> = text
        .lines()
        .map(str::trim)
        .filter(|l| l.contains('|'))
        .map(|l| l.split('|').map(|c| c.trim().to_string()).collect::<Vec<_>>())
        .filter(|cells| cells.len() >= 2)
        .collect();
    if rows.is_empty() { None } else { Some(rows) }
}
