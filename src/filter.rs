//! Filtering and search over catalog items.
//!
//! [`filter`] keeps the items that pass every active predicate, in input order.
//! Predicate groups combine with AND; the values selected inside one facet
//! combine with OR. An inactive predicate (toggle off, empty set, empty search)
//! always passes.

use crate::model::{CatalogItem, Complexity, DeploymentHint, MetricType, PatternTag};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One independently filterable dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Category,
    MetricType,
    Complexity,
    Pattern,
    DeploymentHint,
}

impl Facet {
    pub const ALL: [Facet; 5] = [
        Facet::Category,
        Facet::MetricType,
        Facet::Complexity,
        Facet::Pattern,
        Facet::DeploymentHint,
    ];

    /// Human readable facet name.
    pub fn label(self) -> &'static str {
        match self {
            Facet::Category => "Domain",
            Facet::MetricType => "Metric type",
            Facet::Complexity => "Complexity",
            Facet::Pattern => "Patterns",
            Facet::DeploymentHint => "Local/Vendor hint",
        }
    }
}

/// Selected values per facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSelection {
    pub category_ids: BTreeSet<String>,
    pub metric_types: BTreeSet<MetricType>,
    pub complexities: BTreeSet<Complexity>,
    pub patterns: BTreeSet<PatternTag>,
    pub deployment_hints: BTreeSet<DeploymentHint>,
}

impl FacetSelection {
    pub fn is_empty(&self) -> bool {
        self.category_ids.is_empty()
            && self.metric_types.is_empty()
            && self.complexities.is_empty()
            && self.patterns.is_empty()
            && self.deployment_hints.is_empty()
    }

    /// Add or remove `value` from the facet's set. Blank values are ignored.
    /// Returns `true` when the selection changed.
    pub fn set(&mut self, facet: Facet, value: &str, selected: bool) -> bool {
        fn apply<T: Ord>(set: &mut BTreeSet<T>, v: Option<T>, selected: bool) -> bool {
            match v {
                Some(v) if selected => set.insert(v),
                Some(v) => set.remove(&v),
                None => false,
            }
        }
        match facet {
            Facet::Category => {
                let v = value.trim();
                apply(&mut self.category_ids, (!v.is_empty()).then(|| v.to_string()), selected)
            }
            Facet::MetricType => apply(&mut self.metric_types, MetricType::new(value), selected),
            Facet::Complexity => apply(&mut self.complexities, Complexity::new(value), selected),
            Facet::Pattern => apply(&mut self.patterns, PatternTag::new(value), selected),
            Facet::DeploymentHint => {
                apply(&mut self.deployment_hints, DeploymentHint::new(value), selected)
            }
        }
    }

    /// Drop every selected value of one facet.
    pub fn clear(&mut self, facet: Facet) {
        match facet {
            Facet::Category => self.category_ids.clear(),
            Facet::MetricType => self.metric_types.clear(),
            Facet::Complexity => self.complexities.clear(),
            Facet::Pattern => self.patterns.clear(),
            Facet::DeploymentHint => self.deployment_hints.clear(),
        }
    }

    /// Flip membership of `value` in the facet's set.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let selected = !self.contains(facet, value);
        self.set(facet, value, selected);
    }

    pub fn contains(&self, facet: Facet, value: &str) -> bool {
        let v = value.trim();
        match facet {
            Facet::Category => self.category_ids.contains(v),
            Facet::MetricType => self.metric_types.contains(v),
            Facet::Complexity => self.complexities.contains(v),
            Facet::Pattern => self.patterns.contains(v),
            Facet::DeploymentHint => self.deployment_hints.contains(v),
        }
    }

    /// The selected values of one facet as plain strings, sorted.
    pub fn values(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::Category => self.category_ids.iter().map(String::as_str).collect(),
            Facet::MetricType => self.metric_types.iter().map(MetricType::as_str).collect(),
            Facet::Complexity => self.complexities.iter().map(Complexity::as_str).collect(),
            Facet::Pattern => self.patterns.iter().map(PatternTag::as_str).collect(),
            Facet::DeploymentHint => self
                .deployment_hints
                .iter()
                .map(DeploymentHint::as_str)
                .collect(),
        }
    }
}

/// Session-local filter state, changed only through user actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Free-text search. Matched case-insensitively, never trimmed.
    pub search: String,
    pub facets: FacetSelection,
    /// Keep only items listed as top opportunities (or Opportunity-level items).
    pub only_top: bool,
    /// Keep only Opportunity-level items.
    pub only_opportunities: bool,
}

impl FilterState {
    /// `true` when no predicate is active, i.e. [`filter`] returns its input.
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.facets.is_empty() && !self.only_top && !self.only_opportunities
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check every predicate against one item.
    pub fn matches(&self, item: &CatalogItem, top_ids: &BTreeSet<String>) -> bool {
        self.matches_with_query(item, top_ids, &self.search.to_lowercase())
    }

    fn matches_with_query(&self, item: &CatalogItem, top_ids: &BTreeSet<String>, query: &str) -> bool {
        let f = &self.facets;
        if self.only_top && !(top_ids.contains(&item.id) || item.is_opportunity()) {
            return false;
        }
        if self.only_opportunities && !item.is_opportunity() {
            return false;
        }
        if !f.category_ids.is_empty() && !member(&f.category_ids, item.category_id.as_ref()) {
            return false;
        }
        if !f.metric_types.is_empty() && !member(&f.metric_types, item.metric_type.as_ref()) {
            return false;
        }
        if !f.complexities.is_empty() && !member(&f.complexities, item.complexity.as_ref()) {
            return false;
        }
        if !f.deployment_hints.is_empty()
            && !member(&f.deployment_hints, item.deployment_hint.as_ref())
        {
            return false;
        }
        if !f.patterns.is_empty() && !item.patterns.iter().any(|p| f.patterns.contains(p)) {
            return false;
        }
        query.is_empty() || item.search_blob().contains(query)
    }
}

fn member<T: Ord>(set: &BTreeSet<T>, value: Option<&T>) -> bool {
    value.is_some_and(|v| set.contains(v))
}

/// Return the items that pass every active predicate of `state`, in input order.
///
/// `top_ids` is the dataset's list of top opportunity ids, used by the
/// "top" toggle.
pub fn filter<'a>(
    items: &'a [CatalogItem],
    state: &FilterState,
    top_ids: &BTreeSet<String>,
) -> Vec<&'a CatalogItem> {
    let query = state.search.to_lowercase();
    let out: Vec<&CatalogItem> = items
        .iter()
        .filter(|item| state.matches_with_query(item, top_ids, &query))
        .collect();
    tracing::debug!(total = items.len(), matched = out.len(), "filtered items");
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Facet options
// ────────────────────────────────────────────────────────────────────────────

/// Selectable values for each facet, derived from the item collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetOptions {
    pub metric_types: Vec<MetricType>,
    pub complexities: Vec<Complexity>,
    pub deployment_hints: Vec<DeploymentHint>,
    pub patterns: Vec<PatternTag>,
}

impl FacetOptions {
    /// Sorted, de-duplicated values present in `items`. Items missing a field
    /// contribute nothing to that facet.
    pub fn derive(items: &[CatalogItem]) -> Self {
        let metric_types: BTreeSet<_> = items.iter().filter_map(|u| u.metric_type.clone()).collect();
        let complexities: BTreeSet<_> = items.iter().filter_map(|u| u.complexity.clone()).collect();
        let deployment_hints: BTreeSet<_> =
            items.iter().filter_map(|u| u.deployment_hint.clone()).collect();
        let patterns: BTreeSet<_> = items.iter().flat_map(|u| u.patterns.iter().cloned()).collect();
        Self {
            metric_types: metric_types.into_iter().collect(),
            complexities: complexities.into_iter().collect(),
            deployment_hints: deployment_hints.into_iter().collect(),
            patterns: patterns.into_iter().collect(),
        }
    }

    /// Option values of one facet as strings. Categories are not derived here.
    pub fn values(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::Category => Vec::new(),
            Facet::MetricType => self.metric_types.iter().map(MetricType::as_str).collect(),
            Facet::Complexity => self.complexities.iter().map(Complexity::as_str).collect(),
            Facet::Pattern => self.patterns.iter().map(PatternTag::as_str).collect(),
            Facet::DeploymentHint => self
                .deployment_hints
                .iter()
                .map(DeploymentHint::as_str)
                .collect(),
        }
    }
}

/// Number of items per category id, in first-seen order. Items without a
/// category are not counted.
pub fn category_counts(items: &[CatalogItem]) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for id in items.iter().filter_map(|u| u.category_id.as_ref()) {
        *counts.entry(id.clone()).or_default() += 1;
    }
    counts
}
