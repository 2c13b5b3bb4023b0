//! Application state and the central reducer.
//!
//! [`Explorer`] owns the loaded dataset and the session state. All state
//! changes go through [`Explorer::dispatch`]; views read the state back
//! through the query methods.

use crate::config::Config;
use crate::filter::{self, Facet, FacetOptions};
use crate::layout::{self, TreeLayout};
use crate::model::{CatalogItem, Dataset, Workflow};
use crate::report::{self, DomainFocus};
use crate::share::{self, Route, ShareState};
use crate::svg;
use crate::tree::{self, TreeNode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Override applied to the mindmap's collapsed flags. Not part of share links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollapseMode {
    /// Tree as built: categories open, leaves collapsed.
    #[default]
    AsBuilt,
    ExpandAll,
    CollapseAll,
}

/// The detail panel currently open, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Item(String),
    Workflow(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub route: Route,
    pub exec_mode: bool,
    pub filters: filter::FilterState,
    /// Category focused in the overview and the mindmap.
    pub selected_category: Option<String>,
    /// Workflow highlighted in the workflows view.
    pub selected_workflow: Option<String>,
    pub panel: Option<Panel>,
    pub collapse: CollapseMode,
}

/// Everything a user can do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Navigate(Route),
    SetExecMode(bool),
    SetSearch(String),
    ToggleFacet { facet: Facet, value: String },
    SetOnlyTop(bool),
    SetOnlyOpportunities(bool),
    /// Focus a category (or clear the focus) and filter to it.
    SelectCategory(Option<String>),
    /// Jump to the explore view filtered to one category.
    ExploreCategory(String),
    OpenItem(String),
    OpenWorkflow(String),
    SelectWorkflow(String),
    ClosePanel,
    ResetFilters,
    ExpandAll,
    CollapseAll,
    /// Replace the shareable part of the state with a decoded link.
    ApplyShare(String),
}

pub struct Explorer {
    dataset: Dataset,
    options: FacetOptions,
    config: Config,
    state: AppState,
}

impl Explorer {
    pub fn new(dataset: Dataset, config: Config) -> Self {
        let options = FacetOptions::derive(&dataset.usecases);
        Self {
            dataset,
            options,
            config,
            state: AppState::default(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn facet_options(&self) -> &FacetOptions {
        &self.options
    }

    /// Apply one action. Returns `true` when the state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        tracing::debug!(?action, "dispatch");
        let before = self.state.clone();
        let s = &mut self.state;
        match action {
            Action::Navigate(route) => {
                s.route = route;
                s.panel = None;
                s.collapse = CollapseMode::AsBuilt;
            }
            Action::SetExecMode(on) => s.exec_mode = on,
            Action::SetSearch(text) => s.filters.search = text,
            Action::ToggleFacet { facet, value } => s.filters.facets.toggle(facet, &value),
            Action::SetOnlyTop(on) => s.filters.only_top = on,
            Action::SetOnlyOpportunities(on) => s.filters.only_opportunities = on,
            Action::SelectCategory(id) => {
                let id = id.filter(|id| self.dataset.category(id).is_some());
                s.filters.facets.clear(Facet::Category);
                if let Some(id) = &id {
                    s.filters.facets.set(Facet::Category, id, true);
                }
                s.selected_category = id;
                s.collapse = CollapseMode::AsBuilt;
            }
            Action::ExploreCategory(id) => {
                s.filters.facets.clear(Facet::Category);
                s.filters.facets.set(Facet::Category, &id, true);
                s.route = Route::Explore;
                s.panel = None;
            }
            Action::OpenItem(id) => {
                if self.dataset.item(&id).is_some() {
                    s.panel = Some(Panel::Item(id));
                } else {
                    tracing::warn!(%id, "no such item");
                }
            }
            Action::OpenWorkflow(id) => {
                if self.dataset.workflow(&id).is_some() {
                    s.selected_workflow = Some(id.clone());
                    s.panel = Some(Panel::Workflow(id));
                } else {
                    tracing::warn!(%id, "no such workflow");
                }
            }
            Action::SelectWorkflow(id) => {
                if self.dataset.workflow(&id).is_some() {
                    s.selected_workflow = Some(id);
                } else {
                    tracing::warn!(%id, "no such workflow");
                }
            }
            Action::ClosePanel => s.panel = None,
            Action::ResetFilters => {
                s.filters.reset();
                s.selected_category = None;
                s.selected_workflow = None;
            }
            Action::ExpandAll => s.collapse = CollapseMode::ExpandAll,
            Action::CollapseAll => s.collapse = CollapseMode::CollapseAll,
            Action::ApplyShare(link) => {
                let shared = share::decode(&link);
                s.route = shared.route;
                s.exec_mode = shared.exec_mode;
                s.filters = shared.filters;
                s.selected_category = shared.selected_category;
                s.panel = None;
                s.collapse = CollapseMode::AsBuilt;
            }
        }
        self.state != before
    }

    /// Apply several actions in order.
    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// Items passing the current filters, in dataset order.
    pub fn visible_items(&self) -> Vec<&CatalogItem> {
        filter::filter(&self.dataset.usecases, &self.state.filters, self.dataset.top_ids())
    }

    /// Items per category id over the whole dataset.
    pub fn category_counts(&self) -> IndexMap<String, usize> {
        filter::category_counts(&self.dataset.usecases)
    }

    pub fn open_item(&self) -> Option<&CatalogItem> {
        match &self.state.panel {
            Some(Panel::Item(id)) => self.dataset.item(id),
            _ => None,
        }
    }

    pub fn open_workflow(&self) -> Option<&Workflow> {
        match &self.state.panel {
            Some(Panel::Workflow(id)) => self.dataset.workflow(id),
            _ => None,
        }
    }

    /// The workflow highlighted in the workflows view.
    pub fn selected_workflow(&self) -> Option<&Workflow> {
        self.dataset.workflow(self.state.selected_workflow.as_deref()?)
    }

    pub fn workflow_list(&self) -> Vec<report::WorkflowRow> {
        report::workflow_list(&self.dataset, self.state.selected_workflow.as_deref())
    }

    /// Rows of the open detail panel, empty when none is open.
    pub fn panel_rows(&self) -> Vec<report::DetailRow> {
        if let Some(item) = self.open_item() {
            report::item_rows(item)
        } else if let Some(wf) = self.open_workflow() {
            report::workflow_rows(wf)
        } else {
            Vec::new()
        }
    }

    pub fn domain_focus(&self) -> Option<DomainFocus<'_>> {
        let id = self.state.selected_category.as_deref()?;
        report::domain_focus(&self.dataset, id, self.config.tree.focus_limit)
    }

    /// The mindmap for the focused category (all categories when none), with
    /// the current collapse override applied.
    pub fn mindmap_tree(&self) -> TreeNode {
        let opts = self
            .config
            .tree
            .tree_options(self.state.selected_category.clone(), self.state.exec_mode);
        let mut root = tree::build_tree(&self.dataset, &opts);
        match self.state.collapse {
            CollapseMode::AsBuilt => {}
            CollapseMode::ExpandAll => root.expand_all(),
            CollapseMode::CollapseAll => root.collapse_all(),
        }
        root
    }

    pub fn mindmap_layout(&self) -> TreeLayout {
        layout::layout_with(&self.mindmap_tree(), self.config.layout)
    }

    pub fn mindmap_svg(&self) -> String {
        svg::render_svg(&self.mindmap_layout(), &self.config.svg)
    }

    // ── Sharing ──────────────────────────────────────────────────────────────

    pub fn share_state(&self) -> ShareState {
        ShareState {
            route: self.state.route,
            exec_mode: self.state.exec_mode,
            filters: self.state.filters.clone(),
            selected_category: self.state.selected_category.clone(),
        }
    }

    pub fn share_hash(&self) -> String {
        share::to_hash(&self.share_state())
    }

    pub fn share_url(&self) -> String {
        share::share_url(&self.config.share.base_url, &self.share_state())
    }
}
