//! Shareable links.
//!
//! The view state is carried in the URL fragment as `#/<route>?<query>`. Query
//! keys:
//!
//! | key    | value                                   |
//! |--------|-----------------------------------------|
//! | `exec` | `1` executive mode, anything else off   |
//! | `q`    | free-text search                        |
//! | `dom`  | selected category ids (comma list)      |
//! | `mt`   | metric types (comma list)               |
//! | `cx`   | complexity levels (comma list)          |
//! | `pt`   | pattern tags (comma list)               |
//! | `dh`   | deployment hints (comma list)           |
//! | `top`  | `1` top opportunities only              |
//! | `opp`  | `1` Opportunity-level items only        |
//! | `sd`   | focused category id                     |
//!
//! List members are percent-encoded one by one and joined with a literal comma,
//! so members containing commas survive. Decoding never fails: unknown keys are
//! ignored and malformed values fall back to empty / false / `None`.

use crate::filter::{Facet, FilterState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The views of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    #[default]
    Overview,
    Explore,
    Mindmaps,
    Workflows,
    Foundations,
    Roadmap,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Overview,
        Route::Explore,
        Route::Mindmaps,
        Route::Workflows,
        Route::Foundations,
        Route::Roadmap,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Route::Overview => "overview",
            Route::Explore => "explore",
            Route::Mindmaps => "mindmaps",
            Route::Workflows => "workflows",
            Route::Foundations => "foundations",
            Route::Roadmap => "roadmap",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown route '{}'", s))
    }
}

/// The part of the application state that a share link carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareState {
    pub route: Route,
    pub exec_mode: bool,
    pub filters: FilterState,
    pub selected_category: Option<String>,
}

const FACET_KEYS: [(Facet, &str); 5] = [
    (Facet::Category, "dom"),
    (Facet::MetricType, "mt"),
    (Facet::Complexity, "cx"),
    (Facet::Pattern, "pt"),
    (Facet::DeploymentHint, "dh"),
];

// ────────────────────────────────────────────────────────────────────────────
// Encoding
// ────────────────────────────────────────────────────────────────────────────

/// Query string for `state`, without the route.
pub fn encode_query(state: &ShareState) -> String {
    let mut params: Vec<(&str, String)> = Vec::new();
    params.push(("exec", flag(state.exec_mode).to_string()));
    if !state.filters.search.is_empty() {
        params.push(("q", urlencoding::encode(&state.filters.search).into_owned()));
    }
    for (facet, key) in FACET_KEYS {
        let values = state.filters.facets.values(facet);
        if !values.is_empty() {
            let joined = values
                .iter()
                .map(|v| urlencoding::encode(v).into_owned())
                .collect::<Vec<_>>()
                .join(",");
            params.push((key, joined));
        }
    }
    if state.filters.only_top {
        params.push(("top", "1".to_string()));
    }
    if state.filters.only_opportunities {
        params.push(("opp", "1".to_string()));
    }
    if let Some(sd) = &state.selected_category {
        params.push(("sd", urlencoding::encode(sd).into_owned()));
    }
    params
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

/// `<route>?<query>`: the fragment body without the leading `#/`.
pub fn encode(state: &ShareState) -> String {
    format!("{}?{}", state.route, encode_query(state))
}

/// `#/<route>?<query>`.
pub fn to_hash(state: &ShareState) -> String {
    format!("#/{}", encode(state))
}

/// Replace the fragment of `base` with the share hash for `state`.
pub fn share_url(base: &str, state: &ShareState) -> String {
    let without_fragment = base.split_once('#').map_or(base, |(b, _)| b);
    format!("{}{}", without_fragment, to_hash(state))
}

// ────────────────────────────────────────────────────────────────────────────
// Decoding
// ────────────────────────────────────────────────────────────────────────────

/// Decode a fragment body, a full `#/route?query` hash, a full URL, a bare
/// route or a bare query. Never fails.
pub fn decode(input: &str) -> ShareState {
    let body = input.split_once('#').map_or(input, |(_, frag)| frag);
    let body = body.strip_prefix('/').unwrap_or(body);
    let (route, query) = match body.split_once('?') {
        Some((route, query)) => (route, query),
        None if body.contains('=') => ("", body),
        None => (body, ""),
    };
    let mut state = decode_query(query);
    state.route = parse_route(route);
    state
}

/// Same as [`decode`]; reads better at call sites holding a location hash.
pub fn parse_hash(hash: &str) -> ShareState {
    decode(hash)
}

fn parse_route(route: &str) -> Route {
    let route = route.trim().trim_end_matches('/');
    if route.is_empty() {
        return Route::default();
    }
    route.parse().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "falling back to default route");
        Route::default()
    })
}

/// Decode a query string (no route). The route is left at its default.
pub fn decode_query(query: &str) -> ShareState {
    let params = QueryParams::parse(query);
    let mut state = ShareState {
        exec_mode: params.get_raw("exec") == Some("1"),
        ..ShareState::default()
    };
    state.filters.search = params.get("q").unwrap_or_default();
    for (facet, key) in FACET_KEYS {
        for value in params.get_list(key) {
            state.filters.facets.set(facet, &value, true);
        }
    }
    state.filters.only_top = params.get_raw("top") == Some("1");
    state.filters.only_opportunities = params.get_raw("opp") == Some("1");
    state.selected_category = params.get("sd").filter(|s| !s.trim().is_empty());
    state
}

/// Raw `key=value` pairs in order of appearance.
struct QueryParams<'a> {
    pairs: Vec<(String, &'a str)>,
}

impl<'a> QueryParams<'a> {
    fn parse(query: &'a str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|p| !p.is_empty())
            .filter_map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                Some((decode_component(k)?, v))
            })
            .collect();
        Self { pairs }
    }

    /// First raw (still encoded) value for `key`.
    fn get_raw(&self, key: &str) -> Option<&'a str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    fn get(&self, key: &str) -> Option<String> {
        let raw = self.get_raw(key)?;
        let decoded = decode_component(raw);
        if decoded.is_none() {
            tracing::debug!(key, raw, "ignoring malformed share parameter");
        }
        decoded
    }

    /// Comma-separated members of `key`, each decoded; blank or malformed
    /// members are dropped.
    fn get_list(&self, key: &str) -> Vec<String> {
        let Some(raw) = self.get_raw(key) else {
            return Vec::new();
        };
        raw.split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .filter_map(|m| {
                let decoded = decode_component(m);
                if decoded.is_none() {
                    tracing::debug!(key, member = m, "ignoring malformed list member");
                }
                decoded
            })
            .collect()
    }
}

fn decode_component(s: &str) -> Option<String> {
    let s = s.replace('+', " ");
    urlencoding::decode(&s).ok().map(|c| c.into_owned())
}
